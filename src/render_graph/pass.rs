//! Compiled pass representation

use crate::backend::types::UniformValue;
use crate::graph::MergeCategory;
use std::collections::BTreeMap;

/// Sentinel output name meaning "render to the screen".
pub const SCREEN_OUTPUT: &str = "screen";

/// One unit of GPU work produced by the compiler.
///
/// Immutable once compilation finishes; the merger replaces passes rather
/// than editing them in place.
#[derive(Debug, Clone)]
pub struct CompiledPass {
    pub id: String,
    /// Graph node ids folded into this pass.
    pub node_ids: Vec<String>,
    /// Combined opaque shader text. Empty when the node carried none.
    pub shader: String,
    pub entry_point: String,
    /// Input names, resolved at execute time against the frame map and
    /// the external source-texture table.
    pub inputs: Vec<String>,
    /// Either [`SCREEN_OUTPUT`] or an intermediate name unique within one
    /// compile.
    pub output: String,
    pub uniforms: BTreeMap<String, UniformValue>,
    pub category: MergeCategory,
}

impl CompiledPass {
    pub fn targets_screen(&self) -> bool {
        self.output == SCREEN_OUTPUT
    }
}
