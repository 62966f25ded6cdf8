//! Headless reference backend
//!
//! Records every call it receives instead of touching a GPU. Useful for
//! tests, dry runs of a compiled pass list, and as a template for real
//! backend bindings.

use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::{HashMap, HashSet};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateTexture {
        handle: TextureHandle,
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    DestroyTexture(TextureHandle),
    BeginPass(Option<TextureHandle>),
    EndPass,
    SetUniform(String, UniformValue),
    BindTexture(TextureHandle, u32),
    DrawFullscreenQuad,
    ReadPixels(TextureHandle),
    Resize(u32, u32),
    Present,
}

/// A [`GpuBackend`] that records calls and synthesizes readback buffers.
pub struct HeadlessBackend {
    calls: Vec<RecordedCall>,
    textures: HashMap<TextureHandle, TextureDescriptor>,
    next_handle: u64,
    pass_open: bool,
    readback_enabled: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            textures: HashMap::new(),
            next_handle: 1,
            pass_open: false,
            readback_enabled: true,
        }
    }

    /// A headless backend that reports no readback capability.
    pub fn without_readback() -> Self {
        Self {
            readback_enabled: false,
            ..Self::new()
        }
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of draw calls recorded so far.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::DrawFullscreenQuad))
            .count()
    }

    /// Number of live (created, not destroyed) textures.
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_texture(&mut self, desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "zero-sized texture {}x{}",
                desc.width, desc.height
            )));
        }
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.textures.insert(handle, desc.clone());
        self.calls.push(RecordedCall::CreateTexture {
            handle,
            width: desc.width,
            height: desc.height,
            format: desc.format,
        });
        log::debug!(
            "headless: created texture {:?} ({}x{} {:?})",
            handle,
            desc.width,
            desc.height,
            desc.format
        );
        Ok(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
        self.calls.push(RecordedCall::DestroyTexture(handle));
    }

    fn begin_pass(&mut self, output: Option<TextureHandle>) -> BackendResult<()> {
        if self.pass_open {
            return Err(BackendError::PassInProgress);
        }
        self.pass_open = true;
        self.calls.push(RecordedCall::BeginPass(output));
        Ok(())
    }

    fn end_pass(&mut self) -> BackendResult<()> {
        if !self.pass_open {
            return Err(BackendError::NoPassInProgress);
        }
        self.pass_open = false;
        self.calls.push(RecordedCall::EndPass);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: &UniformValue) {
        self.calls
            .push(RecordedCall::SetUniform(name.to_string(), *value));
    }

    fn bind_texture(&mut self, handle: TextureHandle, slot: u32) {
        self.calls.push(RecordedCall::BindTexture(handle, slot));
    }

    fn draw_fullscreen_quad(&mut self) -> BackendResult<()> {
        if !self.pass_open {
            return Err(BackendError::NoPassInProgress);
        }
        self.calls.push(RecordedCall::DrawFullscreenQuad);
        Ok(())
    }

    fn read_pixels(&mut self, handle: TextureHandle) -> BackendResult<Vec<u8>> {
        self.calls.push(RecordedCall::ReadPixels(handle));
        let desc = self
            .textures
            .get(&handle)
            .ok_or(BackendError::UnknownTexture(handle))?;
        let size = (desc.width * desc.height * desc.format.bytes_per_pixel()) as usize;
        Ok(vec![0u8; size])
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(RecordedCall::Resize(width, height));
    }

    fn present(&mut self) {
        self.calls.push(RecordedCall::Present);
    }

    fn capabilities(&self) -> BackendCapabilities {
        let mut features = HashSet::new();
        features.insert(BackendFeature::FloatTargets);
        if self.readback_enabled {
            features.insert(BackendFeature::Readback);
        }
        BackendCapabilities {
            max_texture_size: 16384,
            max_textures: 4096,
            features,
        }
    }
}
