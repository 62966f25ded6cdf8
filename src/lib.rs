//! Shader Graph Engine - a node-graph shader compositor
//!
//! Authors build a directed acyclic graph of shading nodes, the compiler
//! lowers a snapshot of it into an ordered render pass list, an optional
//! merger fuses compatible adjacent passes, and the executor runs the
//! passes against a frame-scoped texture pool, driving an external GPU
//! backend through the [`GpuBackend`](backend::GpuBackend) trait.
//!
//! # Pipeline
//! - [`graph`]: registry, node model, and cycle-safe graph authoring
//! - [`render_graph`]: compiler, pass merger, texture pool, and executor
//! - [`renderer`]: the [`GraphRenderer`] facade gluing it all to a backend
//! - [`nodes`]: the standard node library (source, color correction,
//!   blur, blend, transform, output)
//!
//! # Example
//! ```
//! use shader_graph_engine::backend::HeadlessBackend;
//! use shader_graph_engine::graph::{NodeRegistry, ShaderGraph};
//! use shader_graph_engine::nodes::register_standard_nodes;
//! use shader_graph_engine::render_graph::compile;
//! use shader_graph_engine::renderer::GraphRenderer;
//! use shader_graph_engine::RendererConfig;
//! use std::collections::BTreeMap;
//!
//! let mut registry = NodeRegistry::new();
//! register_standard_nodes(&mut registry);
//!
//! let params = BTreeMap::new();
//! let mut graph = ShaderGraph::new("demo");
//! graph.add_node(registry.create("source", "clip", &params).unwrap()).unwrap();
//! graph.add_node(registry.create("brightness", "bright", &params).unwrap()).unwrap();
//! graph.add_node(registry.create("output", "screen_out", &params).unwrap()).unwrap();
//! graph.connect("clip", "out", "bright", "in").unwrap();
//! graph.connect("bright", "out", "screen_out", "in").unwrap();
//!
//! let passes = compile(&graph.snapshot()).unwrap();
//!
//! let mut renderer = GraphRenderer::new(RendererConfig::default());
//! renderer.set_backend(HeadlessBackend::new());
//! let stats = renderer.render(&passes, 1920, 1080).unwrap();
//! assert_eq!(stats.pass_count, 1);
//! ```

pub mod backend;
pub mod graph;
pub mod nodes;
pub mod render_graph;
pub mod renderer;

pub use backend::{BackendError, BackendResult, GpuBackend, TextureHandle};
pub use graph::{GraphError, NodeRegistry, ShaderGraph};
pub use render_graph::{compile, merge, CompileError, CompiledPass, TexturePool, SCREEN_OUTPUT};
pub use renderer::{FrameStats, GraphRenderer, RenderError, RendererStats};

/// Configuration for constructing a [`GraphRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Fuse compatible adjacent passes before execution.
    pub merge_passes: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { merge_passes: true }
    }
}
