//! raylab studio: a full-screen quad renderer driven by `raylab-engine`.
//!
//! The renderer is generic over [`raylab_engine::device::Backend`]; the binary
//! runs it on wgpu, tests run it on the headless backend.

pub mod config;
pub mod diagnostics;
pub mod geometry;
pub mod renderer;
pub mod shader;

pub use config::StudioConfig;
pub use renderer::{Phase, QuadRenderer};
