//! Render graph pipeline
//!
//! Compile a graph snapshot into ordered passes, optionally merge
//! compatible neighbors, then execute against the pooled allocator and an
//! injected per-pass strategy.

pub mod compiler;
pub mod executor;
pub mod merger;
pub mod pass;
pub mod pool;

pub use compiler::{compile, CompileError};
pub use executor::{
    PassContext, PassExecutor, RenderGraphExecutor, ResolvedInput, SourceTextureInfo,
};
pub use merger::{merge, MergeResult};
pub use pass::{CompiledPass, SCREEN_OUTPUT};
pub use pool::{PooledTexture, TexturePool};
