//! raylab engine crate.
//!
//! Owns the window, the GPU context and the event loop, and drives a renderer
//! through the [`core::GraphicsContext`] lifecycle.

pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;
