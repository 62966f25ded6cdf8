//! Core backend abstraction
//!
//! The engine never talks to a GPU API directly; everything goes through
//! [`GpuBackend`]. Embedders bind this trait to wgpu, Vulkan, GL, or a
//! software rasterizer. [`HeadlessBackend`](crate::backend::HeadlessBackend)
//! is the in-crate reference implementation.

use crate::backend::types::*;
use std::collections::HashSet;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Unknown texture handle {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("Pass already in progress")]
    PassInProgress,
    #[error("No pass in progress")]
    NoPassInProgress,
    #[error("Readback failed: {0}")]
    ReadbackFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Optional backend features, reported through [`BackendCapabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFeature {
    /// `read_pixels` is supported.
    Readback,
    /// Floating-point render targets are supported.
    FloatTargets,
}

/// Capabilities reported by a backend
#[derive(Debug, Clone)]
pub struct BackendCapabilities {
    pub max_texture_size: u32,
    pub max_textures: u32,
    pub features: HashSet<BackendFeature>,
}

impl BackendCapabilities {
    pub fn supports(&self, feature: BackendFeature) -> bool {
        self.features.contains(&feature)
    }
}

/// The narrow seam between the engine and a concrete GPU API.
///
/// Calls arrive in a strict per-pass bracket: `begin_pass`, then any number
/// of `set_uniform`/`bind_texture`, one `draw_fullscreen_quad`, then
/// `end_pass`. `begin_pass(None)` targets the screen.
pub trait GpuBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle>;
    fn destroy_texture(&mut self, handle: TextureHandle);

    fn begin_pass(&mut self, output: Option<TextureHandle>) -> BackendResult<()>;
    fn end_pass(&mut self) -> BackendResult<()>;

    fn set_uniform(&mut self, name: &str, value: &UniformValue);
    fn bind_texture(&mut self, handle: TextureHandle, slot: u32);
    fn draw_fullscreen_quad(&mut self) -> BackendResult<()>;

    /// Read back the pixel contents of a texture. Only valid when the
    /// backend reports [`BackendFeature::Readback`].
    fn read_pixels(&mut self, handle: TextureHandle) -> BackendResult<Vec<u8>>;

    fn resize(&mut self, width: u32, height: u32);
    fn present(&mut self);

    fn capabilities(&self) -> BackendCapabilities;
}
