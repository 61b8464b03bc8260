use std::ops::Range;

use anyhow::Result;

use crate::coords::{ColorRgba, Viewport};

/// What a buffer is bound as during drawing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Immutable buffer contents uploaded at creation time.
#[derive(Debug, Copy, Clone)]
pub struct BufferInit<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub contents: &'a [u8],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Shader source for a single pipeline stage.
///
/// The module must contain exactly one entry point for `stage`; it is selected
/// automatically.
#[derive(Debug, Copy, Clone)]
pub struct ShaderDesc<'a> {
    pub label: &'a str,
    pub stage: ShaderStage,
    pub source: &'a str,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32x3,
}

impl VertexFormat {
    /// Size of one attribute value in bytes.
    pub const fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x3 => 12,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u64,
}

/// Layout of one interleaved vertex buffer.
///
/// This is the attribute description a program is linked against: which shader
/// locations read which bytes of each vertex.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// `true` when the attributes fill the stride without gaps.
    pub fn is_tightly_packed(&self) -> bool {
        let used: u64 = self.attributes.iter().map(|a| a.format.size()).sum();
        used == self.stride
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexFormat {
    Uint32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    TriangleList,
}

/// Inputs for linking a vertex + fragment pair into a program.
pub struct ProgramDesc<'a, S> {
    pub label: &'a str,
    pub vertex: &'a S,
    pub fragment: &'a S,
    pub layout: &'a VertexLayout,
    pub topology: Topology,
}

/// Result of a shader compile or program link.
///
/// `log` carries the backend's diagnostics, one entry per message. A non-empty
/// log does not mean the handle is unusable; backends decide that at draw time.
#[derive(Debug)]
pub struct Compiled<H> {
    pub handle: H,
    pub log: Vec<String>,
}

/// One indexed draw.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub topology: Topology,
    pub indices: Range<u32>,
    pub base_vertex: i32,
}

impl DrawCall {
    pub fn index_count(&self) -> u32 {
        self.indices.end.saturating_sub(self.indices.start)
    }

    /// Number of primitives assembled from the index range.
    pub fn primitive_count(&self) -> u32 {
        match self.topology {
            Topology::TriangleList => self.index_count() / 3,
        }
    }
}

/// Everything needed to render and present one frame with a single draw.
pub struct FrameDraw<'a, B: Backend + ?Sized> {
    pub clear: ColorRgba,
    pub program: &'a B::Program,
    pub vertex_buffer: &'a B::Buffer,
    pub index_buffer: &'a B::Buffer,
    pub index_format: IndexFormat,
    pub draw: DrawCall,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// The frame was rendered and handed to the compositor.
    Presented,
    /// No frame could be acquired this time; try again next frame.
    Skipped,
}

/// GPU operations a renderer is written against.
///
/// Handles are owned values: releasing consumes them, so a handle cannot be
/// used after it was given back to the backend.
pub trait Backend {
    type Buffer;
    type Shader;
    type Program;

    fn create_buffer(&mut self, init: &BufferInit<'_>) -> Self::Buffer;

    /// Compiles one stage. Never fails; diagnostics are returned in the log.
    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Compiled<Self::Shader>;

    /// Links a program. Never fails; diagnostics are returned in the log.
    fn link_program(&mut self, desc: &ProgramDesc<'_, Self::Shader>) -> Compiled<Self::Program>;

    fn set_viewport(&mut self, viewport: Viewport);

    fn viewport(&self) -> Viewport;

    /// Clears the target, issues `frame.draw` and presents.
    ///
    /// Errors are fatal for the render loop.
    fn draw_frame(&mut self, frame: &FrameDraw<'_, Self>) -> Result<FrameStatus>;

    /// Resets any bound program/buffer state to "none".
    ///
    /// Backends without global binding state have nothing to do.
    fn clear_bindings(&mut self) {}

    fn release_buffer(&mut self, buffer: Self::Buffer);

    fn release_shader(&mut self, shader: Self::Shader);

    fn release_program(&mut self, program: Self::Program);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_list_primitive_count() {
        let call = DrawCall { topology: Topology::TriangleList, indices: 0..6, base_vertex: 0 };
        assert_eq!(call.index_count(), 6);
        assert_eq!(call.primitive_count(), 2);
    }

    #[test]
    fn partial_index_range_counts_whole_triangles() {
        let call = DrawCall { topology: Topology::TriangleList, indices: 2..10, base_vertex: 0 };
        assert_eq!(call.index_count(), 8);
        assert_eq!(call.primitive_count(), 2);
    }

    #[test]
    fn tightly_packed_layout() {
        let layout = VertexLayout {
            stride: 12,
            attributes: vec![VertexAttribute { location: 0, format: VertexFormat::Float32x3, offset: 0 }],
        };
        assert!(layout.is_tightly_packed());

        let padded = VertexLayout { stride: 16, ..layout };
        assert!(!padded.is_tightly_packed());
    }
}
