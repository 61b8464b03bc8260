use crate::device::Backend;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-frame context passed to `on_update` and `on_render`.
///
/// `runtime` buffers window commands (title, exit); the host applies them
/// after the callbacks return.
pub struct FrameCtx<'a, B: Backend> {
    pub gpu: &'a mut B,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, B: Backend> FrameCtx<'a, B> {
    pub fn new(gpu: &'a mut B, time: FrameTime, runtime: &'a mut RuntimeCtx) -> Self {
        Self { gpu, time, runtime }
    }
}
