//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue and the window Surface
//! - the [`Backend`] seam renderers are written against
//! - a wgpu implementation ([`Gpu`]) and a recording one ([`HeadlessBackend`])

mod backend;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use backend::{
    Backend, BufferInit, BufferKind, Compiled, DrawCall, FrameDraw, FrameStatus, IndexFormat,
    ProgramDesc, ShaderDesc, ShaderStage, Topology, VertexAttribute, VertexFormat, VertexLayout,
};
pub use gpu::{Gpu, GpuProgram, GpuShader};
pub use headless::{
    Bindings, HandleId, HandleKind, HeadlessBackend, HeadlessBuffer, HeadlessProgram,
    HeadlessShader, RecordedDraw,
};
pub use init::GpuInit;
