use anyhow::Result;

use crate::device::Backend;

use super::ctx::FrameCtx;

/// Control directive returned by per-frame callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Lifecycle contract between the host and a renderer.
///
/// The host calls, in order:
/// 1. `on_load` once, after the GPU context exists
/// 2. `on_resize` with the initial size, then on every non-zero resize
/// 3. `on_update` then `on_render`, once per frame
/// 4. `on_unload` once, before the GPU context is dropped
///
/// All calls happen on the thread that owns the event loop.
pub trait GraphicsContext<B: Backend> {
    /// Allocates GPU resources. An error aborts startup.
    fn on_load(&mut self, gpu: &mut B) -> Result<()>;

    /// Called with the new drawable size in physical pixels. Never called with zero.
    fn on_resize(&mut self, gpu: &mut B, width: u32, height: u32) {
        let _ = (gpu, width, height);
    }

    /// Per-frame logic, before rendering.
    fn on_update(&mut self, ctx: &mut FrameCtx<'_, B>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    fn on_render(&mut self, ctx: &mut FrameCtx<'_, B>) -> AppControl;

    /// Releases GPU resources.
    fn on_unload(&mut self, gpu: &mut B) -> Result<()>;
}
