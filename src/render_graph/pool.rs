//! Frame-scoped texture pool
//!
//! Render targets are expensive to create and cheap to reuse, so the pool
//! keeps every backend texture it ever allocated and hands them back out
//! on exact dimension/format matches. Entries acquired during a frame
//! return to the free list at `end_frame`; backend resources are only
//! destroyed by `clear`.

use crate::backend::traits::{BackendResult, GpuBackend, TextureHandle};
use crate::backend::types::{TextureDescriptor, TextureFormat};

/// One reusable render target owned by the pool.
#[derive(Debug, Clone)]
pub struct PooledTexture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    in_use: bool,
}

/// Grow-only pool of backend textures with cross-frame reuse.
///
/// Matching is exact by dimensions and format. A differently-sized idle
/// entry is never handed out and never evicted; the pool only grows.
pub struct TexturePool {
    textures: Vec<PooledTexture>,
    total_allocations: usize,
    reuse_count: usize,
    frame_active: bool,
}

impl TexturePool {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            total_allocations: 0,
            reuse_count: 0,
            frame_active: false,
        }
    }

    /// Mark the start of a frame. Only per-frame bookkeeping resets;
    /// pooled textures and cumulative counters persist.
    pub fn begin_frame(&mut self) {
        if self.frame_active {
            log::warn!("begin_frame called while a frame is already active");
        }
        self.frame_active = true;
    }

    /// Acquire a texture matching `width x height x format` exactly,
    /// reusing a free entry when possible and allocating through the
    /// backend otherwise.
    pub fn acquire(
        &mut self,
        backend: &mut dyn GpuBackend,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> BackendResult<TextureHandle> {
        if let Some(entry) = self.textures.iter_mut().find(|t| {
            !t.in_use && t.width == width && t.height == height && t.format == format
        }) {
            entry.in_use = true;
            self.reuse_count += 1;
            return Ok(entry.handle);
        }

        let desc = TextureDescriptor::new(width, height, format)
            .with_label(&format!("pooled_{}", self.textures.len()));
        let handle = backend.create_texture(&desc)?;
        self.total_allocations += 1;
        self.textures.push(PooledTexture {
            handle,
            width,
            height,
            format,
            in_use: true,
        });
        log::debug!(
            "pool allocated {}x{} {:?} (pool size {})",
            width,
            height,
            format,
            self.textures.len()
        );
        Ok(handle)
    }

    /// Return every texture acquired this frame to the free list. Backend
    /// resources stay alive for reuse next frame.
    pub fn end_frame(&mut self) {
        for entry in &mut self.textures {
            entry.in_use = false;
        }
        self.frame_active = false;
    }

    pub fn frame_active(&self) -> bool {
        self.frame_active
    }

    /// Total entries, free and in use.
    pub fn pool_size(&self) -> usize {
        self.textures.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.textures.iter().filter(|t| t.in_use).count()
    }

    /// Cumulative backend allocations over the pool's lifetime.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Cumulative free-list hits over the pool's lifetime.
    pub fn reuse_count(&self) -> usize {
        self.reuse_count
    }

    /// Destroy all backend textures and empty the pool. Counters are
    /// lifetime statistics and survive.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        for entry in self.textures.drain(..) {
            backend.destroy_texture(entry.handle);
        }
        self.frame_active = false;
    }
}

impl Default for TexturePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    #[test]
    fn reuse_across_frames() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        let first = pool
            .acquire(&mut backend, 1920, 1080, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        assert_eq!(pool.total_allocations(), 1);
        assert_eq!(pool.reuse_count(), 0);

        pool.begin_frame();
        let second = pool
            .acquire(&mut backend, 1920, 1080, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        assert_eq!(first, second);
        assert_eq!(pool.total_allocations(), 1);
        assert_eq!(pool.reuse_count(), 1);
        assert_eq!(pool.pool_size(), 1);
    }

    #[test]
    fn in_use_entry_not_rehanded_out() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        let a = pool
            .acquire(&mut backend, 640, 480, TextureFormat::Rgba8Unorm)
            .unwrap();
        let b = pool
            .acquire(&mut backend, 640, 480, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        assert_ne!(a, b);
        assert_eq!(pool.total_allocations(), 2);
        assert_eq!(pool.reuse_count(), 0);
    }

    #[test]
    fn size_mismatch_always_allocates() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        pool.acquire(&mut backend, 1920, 1080, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        pool.begin_frame();
        pool.acquire(&mut backend, 1280, 720, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        assert_eq!(pool.total_allocations(), 2);
        assert_eq!(pool.reuse_count(), 0);
        // The stale 1920x1080 entry is kept, not evicted.
        assert_eq!(pool.pool_size(), 2);
    }

    #[test]
    fn format_mismatch_always_allocates() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        pool.acquire(&mut backend, 512, 512, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        pool.begin_frame();
        pool.acquire(&mut backend, 512, 512, TextureFormat::Rgba16Float)
            .unwrap();
        pool.end_frame();

        assert_eq!(pool.total_allocations(), 2);
    }

    #[test]
    fn in_use_count_tracks_frame() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        pool.acquire(&mut backend, 64, 64, TextureFormat::Rgba8Unorm)
            .unwrap();
        assert_eq!(pool.in_use_count(), 1);
        pool.end_frame();
        assert_eq!(pool.in_use_count(), 0);
        assert_eq!(pool.pool_size(), 1);
    }

    #[test]
    fn clear_destroys_backend_textures() {
        let mut backend = HeadlessBackend::new();
        let mut pool = TexturePool::new();

        pool.begin_frame();
        pool.acquire(&mut backend, 64, 64, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.acquire(&mut backend, 128, 128, TextureFormat::Rgba8Unorm)
            .unwrap();
        pool.end_frame();

        pool.clear(&mut backend);
        assert_eq!(pool.pool_size(), 0);
        assert_eq!(backend.live_texture_count(), 0);
        // Lifetime counters survive a clear.
        assert_eq!(pool.total_allocations(), 2);
    }
}
