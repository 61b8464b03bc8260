//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the renderer driven by it.

mod app;
mod ctx;

pub use app::{AppControl, GraphicsContext};
pub use ctx::FrameCtx;
