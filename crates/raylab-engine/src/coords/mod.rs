//! Pixel-space types shared between the host and renderers.
//!
//! Viewports are expressed in physical pixels with a top-left origin, matching
//! the surface configuration.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
