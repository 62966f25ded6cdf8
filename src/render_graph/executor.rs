//! Render graph executor
//!
//! Walks a compiled pass list in order, wiring pass inputs and outputs
//! through the texture pool and handing each pass to an injected
//! [`PassExecutor`] strategy. The executor itself never issues GPU work
//! beyond pool allocation; the strategy owns the draw.

use crate::backend::traits::{BackendResult, GpuBackend, TextureHandle};
use crate::backend::types::INTERMEDIATE_FORMAT;
use crate::render_graph::pass::CompiledPass;
use crate::render_graph::pool::TexturePool;
use std::collections::HashMap;

/// Externally supplied texture, referenced by the graph but never owned
/// by the pool.
#[derive(Debug, Clone)]
pub struct SourceTextureInfo {
    pub id: String,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Resolution result for one declared pass input.
///
/// `Missing` is a first-class state, not an error: a pass runs with a
/// partial input set rather than failing the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInput {
    /// An earlier pass's intermediate, owned by the pool this frame.
    Intermediate(TextureHandle),
    /// An externally registered source texture.
    Source(TextureHandle),
    /// Unresolvable this frame.
    Missing,
}

impl ResolvedInput {
    pub fn handle(&self) -> Option<TextureHandle> {
        match self {
            ResolvedInput::Intermediate(h) | ResolvedInput::Source(h) => Some(*h),
            ResolvedInput::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ResolvedInput::Missing)
    }
}

/// Everything a strategy needs to run one pass.
pub struct PassContext<'a> {
    pub pass: &'a CompiledPass,
    /// Declared input names with their resolutions, in declaration order.
    pub inputs: &'a [(String, ResolvedInput)],
    /// `None` means render to the screen.
    pub output: Option<TextureHandle>,
    pub width: u32,
    pub height: u32,
}

/// Injected "execute one pass" strategy; the sole seam to the GPU backend.
pub trait PassExecutor {
    fn execute_pass(
        &mut self,
        backend: &mut dyn GpuBackend,
        ctx: &PassContext<'_>,
    ) -> BackendResult<()>;
}

impl<F> PassExecutor for F
where
    F: FnMut(&mut dyn GpuBackend, &PassContext<'_>) -> BackendResult<()>,
{
    fn execute_pass(
        &mut self,
        backend: &mut dyn GpuBackend,
        ctx: &PassContext<'_>,
    ) -> BackendResult<()> {
        self(backend, ctx)
    }
}

/// Executor for running compiled pass lists frame by frame.
pub struct RenderGraphExecutor {
    /// Intermediate name -> texture for the current frame only.
    frame_outputs: HashMap<String, TextureHandle>,
    /// Pre-bound outputs (explicit render targets); consulted before the
    /// pool when a pass writes a non-screen output.
    external_outputs: HashMap<String, TextureHandle>,
    frame_active: bool,
}

impl RenderGraphExecutor {
    pub fn new() -> Self {
        Self {
            frame_outputs: HashMap::new(),
            external_outputs: HashMap::new(),
            frame_active: false,
        }
    }

    /// Bind an externally owned texture as the target for `name`.
    pub fn set_external_output(&mut self, name: &str, handle: TextureHandle) {
        self.external_outputs.insert(name.to_string(), handle);
    }

    pub fn clear_external_outputs(&mut self) {
        self.external_outputs.clear();
    }

    /// Texture registered under an intermediate name. Only valid during
    /// an active frame; intermediate names never resolve across frames.
    pub fn texture_for_output(&self, name: &str) -> Option<TextureHandle> {
        if !self.frame_active {
            return None;
        }
        self.frame_outputs.get(name).copied()
    }

    /// Run `passes` in order for one frame of `width` x `height`.
    ///
    /// `begin_frame`/`end_frame` bracket the call on every exit path, so
    /// a failing pass never strands pool textures in the in-use state.
    /// Returns the number of passes executed.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        passes: &[CompiledPass],
        width: u32,
        height: u32,
        pool: &mut TexturePool,
        backend: &mut dyn GpuBackend,
        sources: &HashMap<String, SourceTextureInfo>,
        pass_executor: &mut dyn PassExecutor,
    ) -> BackendResult<usize> {
        pool.begin_frame();
        self.frame_outputs.clear();
        self.frame_active = true;

        let result = self.run_passes(passes, width, height, pool, backend, sources, pass_executor);

        pool.end_frame();
        self.frame_active = false;
        self.frame_outputs.clear();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn run_passes(
        &mut self,
        passes: &[CompiledPass],
        width: u32,
        height: u32,
        pool: &mut TexturePool,
        backend: &mut dyn GpuBackend,
        sources: &HashMap<String, SourceTextureInfo>,
        pass_executor: &mut dyn PassExecutor,
    ) -> BackendResult<usize> {
        for pass in passes {
            let inputs: Vec<(String, ResolvedInput)> = pass
                .inputs
                .iter()
                .map(|name| (name.clone(), self.resolve_input(name, sources)))
                .collect();

            let output = if pass.targets_screen() {
                None
            } else if let Some(&handle) = self.external_outputs.get(&pass.output) {
                self.frame_outputs.insert(pass.output.clone(), handle);
                Some(handle)
            } else {
                let handle = pool.acquire(backend, width, height, INTERMEDIATE_FORMAT)?;
                self.frame_outputs.insert(pass.output.clone(), handle);
                Some(handle)
            };

            let ctx = PassContext {
                pass,
                inputs: &inputs,
                output,
                width,
                height,
            };
            pass_executor.execute_pass(backend, &ctx)?;
        }
        Ok(passes.len())
    }

    fn resolve_input(
        &self,
        name: &str,
        sources: &HashMap<String, SourceTextureInfo>,
    ) -> ResolvedInput {
        if let Some(&handle) = self.frame_outputs.get(name) {
            return ResolvedInput::Intermediate(handle);
        }
        if let Some(info) = sources.get(name) {
            return ResolvedInput::Source(info.handle);
        }
        log::debug!("input '{}' unresolved, pass runs with it missing", name);
        ResolvedInput::Missing
    }
}

impl Default for RenderGraphExecutor {
    fn default() -> Self {
        Self::new()
    }
}
