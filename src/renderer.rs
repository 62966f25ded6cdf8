//! Graph renderer facade
//!
//! Glues compiler output, the pass merger, the texture pool, and the
//! executor to a [`GpuBackend`], and keeps the frame/allocation statistics
//! the embedding application reads.

use crate::backend::traits::{
    BackendError, BackendFeature, BackendResult, GpuBackend, TextureHandle,
};
use crate::backend::types::{TextureDescriptor, INTERMEDIATE_FORMAT};
use crate::render_graph::executor::{
    PassContext, PassExecutor, RenderGraphExecutor, SourceTextureInfo,
};
use crate::render_graph::merger::merge;
use crate::render_graph::pass::CompiledPass;
use crate::render_graph::pool::TexturePool;
use crate::RendererConfig;
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// Errors raised by the renderer facade.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no backend set, call set_backend first")]
    NoBackendSet,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Statistics for one `render` call.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub pass_count: usize,
    pub render_time_ms: f32,
    /// New backend textures the pool allocated this frame.
    pub textures_allocated: usize,
    /// Pool entries reused from earlier frames.
    pub textures_reused: usize,
}

/// Cumulative renderer statistics.
#[derive(Debug, Clone, Copy)]
pub struct RendererStats {
    pub frames_rendered: u64,
    pub passes_executed: u64,
    pub passes_merged: u64,
    pub pool_size: usize,
    pub total_allocations: usize,
    pub reuse_count: usize,
}

/// The standard per-pass strategy: begin pass, upload uniforms, bind
/// resolved inputs to consecutive slots, draw a fullscreen quad, end pass.
pub struct DrawQuadExecutor;

impl PassExecutor for DrawQuadExecutor {
    fn execute_pass(
        &mut self,
        backend: &mut dyn GpuBackend,
        ctx: &PassContext<'_>,
    ) -> BackendResult<()> {
        backend.begin_pass(ctx.output)?;
        for (name, value) in &ctx.pass.uniforms {
            backend.set_uniform(name, value);
        }
        for (slot, (name, input)) in ctx.inputs.iter().enumerate() {
            match input.handle() {
                Some(handle) => backend.bind_texture(handle, slot as u32),
                None => log::debug!(
                    "pass '{}': input '{}' unresolved, slot {} left unbound",
                    ctx.pass.id,
                    name,
                    slot
                ),
            }
        }
        let draw = backend.draw_fullscreen_quad();
        // The pass bracket closes even when the draw fails.
        let end = backend.end_pass();
        draw?;
        end
    }
}

/// Facade over the compile -> merge -> execute pipeline.
pub struct GraphRenderer<B: GpuBackend> {
    backend: Option<B>,
    pool: TexturePool,
    executor: RenderGraphExecutor,
    sources: HashMap<String, SourceTextureInfo>,
    config: RendererConfig,
    frames_rendered: u64,
    passes_executed: u64,
    passes_merged: u64,
}

impl<B: GpuBackend> GraphRenderer<B> {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            backend: None,
            pool: TexturePool::new(),
            executor: RenderGraphExecutor::new(),
            sources: HashMap::new(),
            config,
            frames_rendered: 0,
            passes_executed: 0,
            passes_merged: 0,
        }
    }

    pub fn set_backend(&mut self, backend: B) {
        self.backend = Some(backend);
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Register an external texture under its id for input resolution.
    /// Re-registering an id replaces the previous entry.
    pub fn register_source_texture(&mut self, info: SourceTextureInfo) {
        if self.sources.insert(info.id.clone(), info).is_some() {
            log::debug!("source texture re-registered, previous entry replaced");
        }
    }

    pub fn unregister_source_texture(&mut self, id: &str) -> bool {
        self.sources.remove(id).is_some()
    }

    pub fn clear_source_textures(&mut self) {
        self.sources.clear();
    }

    /// Render a compiled pass list at the given dimensions.
    ///
    /// Fails with [`RenderError::NoBackendSet`] before touching the pool
    /// when no backend is attached. With merging enabled in the config,
    /// the pass list is fused first.
    pub fn render(
        &mut self,
        passes: &[CompiledPass],
        width: u32,
        height: u32,
    ) -> Result<FrameStats, RenderError> {
        if self.backend.is_none() {
            return Err(RenderError::NoBackendSet);
        }
        self.executor.clear_external_outputs();
        self.run_frame(passes, width, height)
    }

    /// Render into one explicit output texture instead of the screen.
    ///
    /// The final pass's output is rewritten to target a freshly created
    /// texture, which is returned on success and owned by the caller.
    pub fn render_to_texture(
        &mut self,
        passes: &[CompiledPass],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, RenderError> {
        const TARGET_NAME: &str = "render_target";

        let backend = self.backend.as_mut().ok_or(RenderError::NoBackendSet)?;
        let desc =
            TextureDescriptor::new(width, height, INTERMEDIATE_FORMAT).with_label(TARGET_NAME);
        let target = backend.create_texture(&desc)?;

        let mut rewritten = passes.to_vec();
        if let Some(last) = rewritten.last_mut() {
            last.output = TARGET_NAME.to_string();
        }

        self.executor.clear_external_outputs();
        self.executor.set_external_output(TARGET_NAME, target);
        let result = self.run_frame(&rewritten, width, height);
        self.executor.clear_external_outputs();

        match result {
            Ok(_) => Ok(target),
            Err(err) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.destroy_texture(target);
                }
                Err(err)
            }
        }
    }

    fn run_frame(
        &mut self,
        passes: &[CompiledPass],
        width: u32,
        height: u32,
    ) -> Result<FrameStats, RenderError> {
        let backend = self.backend.as_mut().ok_or(RenderError::NoBackendSet)?;

        let merged;
        let passes: &[CompiledPass] = if self.config.merge_passes {
            merged = merge(passes);
            self.passes_merged += merged.merged_count as u64;
            &merged.passes
        } else {
            passes
        };

        let allocations_before = self.pool.total_allocations();
        let reuse_before = self.pool.reuse_count();
        let start = Instant::now();

        let mut strategy = DrawQuadExecutor;
        let executed = self.executor.execute(
            passes,
            width,
            height,
            &mut self.pool,
            &mut *backend,
            &self.sources,
            &mut strategy,
        )?;

        if passes.iter().any(|p| p.targets_screen()) {
            backend.present();
        }

        self.frames_rendered += 1;
        self.passes_executed += executed as u64;

        Ok(FrameStats {
            pass_count: executed,
            render_time_ms: start.elapsed().as_secs_f32() * 1000.0,
            textures_allocated: self.pool.total_allocations() - allocations_before,
            textures_reused: self.pool.reuse_count() - reuse_before,
        })
    }

    /// Read back a texture's pixels. Returns `None`, never an error, when
    /// no backend is attached or the backend lacks readback support.
    pub fn read_pixels(&mut self, handle: TextureHandle) -> Option<Vec<u8>> {
        let backend = self.backend.as_mut()?;
        if !backend.capabilities().supports(BackendFeature::Readback) {
            return None;
        }
        match backend.read_pixels(handle) {
            Ok(pixels) => Some(pixels),
            Err(err) => {
                log::warn!("readback failed: {}", err);
                None
            }
        }
    }

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            frames_rendered: self.frames_rendered,
            passes_executed: self.passes_executed,
            passes_merged: self.passes_merged,
            pool_size: self.pool.pool_size(),
            total_allocations: self.pool.total_allocations(),
            reuse_count: self.pool.reuse_count(),
        }
    }

    /// Destroy all pooled textures. Requires a backend; without one the
    /// pool is left untouched.
    pub fn clear_pool(&mut self) {
        match self.backend.as_mut() {
            Some(backend) => self.pool.clear(backend),
            None => {
                if self.pool.pool_size() > 0 {
                    log::warn!("clear_pool without a backend, pooled textures not destroyed");
                }
            }
        }
    }

    /// Release everything: pooled textures, source registrations, and the
    /// backend itself.
    pub fn dispose(&mut self) {
        self.clear_pool();
        self.sources.clear();
        self.executor.clear_external_outputs();
        self.backend = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, RecordedCall};
    use crate::graph::MergeCategory;
    use crate::render_graph::pass::SCREEN_OUTPUT;
    use std::collections::BTreeMap;

    fn pass(id: &str, category: MergeCategory, inputs: &[&str], output: &str) -> CompiledPass {
        CompiledPass {
            id: id.to_string(),
            node_ids: vec![id.to_string()],
            shader: format!("fn {}() {{ }}", id),
            entry_point: id.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
            uniforms: BTreeMap::new(),
            category,
        }
    }

    fn renderer(merge_passes: bool) -> GraphRenderer<HeadlessBackend> {
        let mut renderer = GraphRenderer::new(RendererConfig { merge_passes });
        renderer.set_backend(HeadlessBackend::new());
        renderer
    }

    #[test]
    fn render_without_backend_fails_before_pool() {
        let mut renderer: GraphRenderer<HeadlessBackend> =
            GraphRenderer::new(RendererConfig::default());
        let passes = vec![pass(
            "p0",
            MergeCategory::Uncategorized,
            &[],
            "intermediate_0",
        )];
        assert!(matches!(
            renderer.render(&passes, 640, 480),
            Err(RenderError::NoBackendSet)
        ));
        assert_eq!(renderer.stats().total_allocations, 0);
        assert_eq!(renderer.stats().frames_rendered, 0);
    }

    #[test]
    fn render_empty_list() {
        let mut renderer = renderer(true);
        let stats = renderer.render(&[], 1920, 1080).unwrap();
        assert_eq!(stats.pass_count, 0);
        assert_eq!(stats.textures_allocated, 0);
        assert_eq!(stats.textures_reused, 0);
        assert_eq!(renderer.stats().frames_rendered, 1);
    }

    #[test]
    fn merging_folds_chain_and_counts() {
        let passes = vec![
            pass(
                "a",
                MergeCategory::ColorCorrection,
                &["src"],
                "intermediate_0",
            ),
            pass(
                "b",
                MergeCategory::ColorCorrection,
                &["intermediate_0"],
                "intermediate_1",
            ),
            pass(
                "c",
                MergeCategory::ColorCorrection,
                &["intermediate_1"],
                SCREEN_OUTPUT,
            ),
        ];

        let mut merged = renderer(true);
        let stats = merged.render(&passes, 1280, 720).unwrap();
        assert_eq!(stats.pass_count, 1);
        assert_eq!(merged.stats().passes_merged, 2);
        assert_eq!(stats.textures_allocated, 0);

        let mut unmerged = renderer(false);
        let stats = unmerged.render(&passes, 1280, 720).unwrap();
        assert_eq!(stats.pass_count, 3);
        assert_eq!(unmerged.stats().passes_merged, 0);
        // Two intermediates materialized.
        assert_eq!(stats.textures_allocated, 2);
    }

    #[test]
    fn pool_reuse_shows_in_frame_stats() {
        let passes = vec![
            pass("a", MergeCategory::Blur, &["src"], "intermediate_0"),
            pass(
                "b",
                MergeCategory::ColorCorrection,
                &["intermediate_0"],
                SCREEN_OUTPUT,
            ),
        ];
        let mut renderer = renderer(false);

        let first = renderer.render(&passes, 1920, 1080).unwrap();
        assert_eq!(first.textures_allocated, 1);
        assert_eq!(first.textures_reused, 0);

        let second = renderer.render(&passes, 1920, 1080).unwrap();
        assert_eq!(second.textures_allocated, 0);
        assert_eq!(second.textures_reused, 1);
        assert_eq!(renderer.stats().pool_size, 1);
    }

    #[test]
    fn screen_frame_presents() {
        let mut renderer = renderer(false);
        let passes = vec![pass("p0", MergeCategory::Uncategorized, &[], SCREEN_OUTPUT)];
        renderer.render(&passes, 640, 480).unwrap();
        let backend = renderer.backend().unwrap();
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, RecordedCall::Present)));
    }

    #[test]
    fn render_to_texture_targets_explicit_texture() {
        let mut renderer = renderer(false);
        let passes = vec![pass("p0", MergeCategory::Uncategorized, &[], SCREEN_OUTPUT)];
        let target = renderer.render_to_texture(&passes, 256, 256).unwrap();

        let backend = renderer.backend().unwrap();
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, RecordedCall::BeginPass(Some(h)) if *h == target)));
        // The explicit target is not a pool entry.
        assert_eq!(renderer.stats().total_allocations, 0);
    }

    #[test]
    fn read_pixels_none_without_backend() {
        let mut renderer: GraphRenderer<HeadlessBackend> =
            GraphRenderer::new(RendererConfig::default());
        assert!(renderer.read_pixels(TextureHandle(1)).is_none());
    }

    #[test]
    fn read_pixels_none_without_capability() {
        let mut renderer = GraphRenderer::new(RendererConfig::default());
        renderer.set_backend(HeadlessBackend::without_readback());
        assert!(renderer.read_pixels(TextureHandle(1)).is_none());
    }

    #[test]
    fn read_pixels_roundtrip() {
        let mut renderer = renderer(false);
        let target = renderer.render_to_texture(&[], 8, 8).unwrap();
        let pixels = renderer.read_pixels(target).unwrap();
        assert_eq!(pixels.len(), 8 * 8 * 4);
    }

    #[test]
    fn dispose_clears_everything() {
        let mut renderer = renderer(false);
        let passes = vec![pass(
            "p0",
            MergeCategory::Uncategorized,
            &[],
            "intermediate_0",
        )];
        renderer.render(&passes, 64, 64).unwrap();
        assert_eq!(renderer.stats().pool_size, 1);

        renderer.dispose();
        assert_eq!(renderer.stats().pool_size, 0);
        assert!(renderer.backend().is_none());
    }
}
