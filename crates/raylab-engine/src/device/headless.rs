use std::collections::BTreeMap;
use std::num::NonZeroU32;

use anyhow::Result;

use crate::coords::{ColorRgba, Viewport};

use super::backend::{
    Backend, BufferInit, BufferKind, Compiled, DrawCall, FrameDraw, FrameStatus, IndexFormat,
    ProgramDesc, ShaderDesc, ShaderStage, VertexLayout,
};

/// Identifier handed out by [`HeadlessBackend`]. Never zero.
pub type HandleId = NonZeroU32;

#[derive(Debug)]
pub struct HeadlessBuffer {
    id: HandleId,
    len: usize,
}

impl HeadlessBuffer {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Size of the uploaded contents in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
pub struct HeadlessShader {
    id: HandleId,
    stage: ShaderStage,
    valid: bool,
}

impl HeadlessShader {
    pub fn id(&self) -> HandleId {
        self.id
    }
}

#[derive(Debug)]
pub struct HeadlessProgram {
    id: HandleId,
    layout: VertexLayout,
    valid: bool,
}

impl HeadlessProgram {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Kind of a live handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandleKind {
    Buffer(BufferKind),
    Shader(ShaderStage),
    Program,
}

/// Currently bound state, as left by the last draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    pub program: Option<HandleId>,
    pub vertex_buffer: Option<HandleId>,
    pub index_buffer: Option<HandleId>,
    pub vertex_layout: Option<VertexLayout>,
}

impl Bindings {
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// A draw recorded by [`HeadlessBackend::draw_frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub clear: ColorRgba,
    pub viewport: Viewport,
    pub program: HandleId,
    pub vertex_buffer: HandleId,
    pub index_buffer: HandleId,
    pub index_format: IndexFormat,
    pub call: DrawCall,
}

/// Backend that records GPU work instead of submitting it.
///
/// Hands out non-zero ids, tracks which handles are alive and which are bound,
/// and keeps every draw in submission order. No device or window is required,
/// which makes it suitable for tests and dry runs of a renderer's lifecycle.
#[derive(Debug)]
pub struct HeadlessBackend {
    next_id: u32,
    live: BTreeMap<HandleId, HandleKind>,
    bindings: Bindings,
    viewport: Viewport,
    draws: Vec<RecordedDraw>,
    frames_presented: u64,
    pending_skips: u32,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            next_id: 1,
            live: BTreeMap::new(),
            bindings: Bindings::default(),
            viewport: Viewport::full(width, height),
            draws: Vec::new(),
            frames_presented: 0,
            pending_skips: 0,
        }
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn handle_kind(&self, id: HandleId) -> Option<HandleKind> {
        self.live.get(&id).copied()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Makes the next `count` frames report [`FrameStatus::Skipped`], as a
    /// surface does while it is being reconfigured.
    pub fn skip_frames(&mut self, count: u32) {
        self.pending_skips = count;
    }

    /// Hands out the next id that is not live.
    ///
    /// Ids count up from 1. After `u32::MAX` the counter starts over at 1 and
    /// skips ids that are still live, so a live handle is never shadowed.
    fn allocate(&mut self, kind: HandleKind) -> HandleId {
        loop {
            let candidate = NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MIN);
            self.next_id = match self.next_id.checked_add(1) {
                Some(next) => next,
                None => {
                    log::warn!("headless: handle ids exhausted, reusing released ids");
                    1
                }
            };

            if !self.live.contains_key(&candidate) {
                self.live.insert(candidate, kind);
                return candidate;
            }
        }
    }

    fn release(&mut self, id: HandleId) {
        if self.live.remove(&id).is_none() {
            log::warn!("headless: handle {id} released twice");
        }
    }
}

impl Backend for HeadlessBackend {
    type Buffer = HeadlessBuffer;
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;

    fn create_buffer(&mut self, init: &BufferInit<'_>) -> HeadlessBuffer {
        let id = self.allocate(HandleKind::Buffer(init.kind));
        log::trace!("headless: buffer {id} `{}` ({} bytes)", init.label, init.contents.len());
        HeadlessBuffer {
            id,
            len: init.contents.len(),
        }
    }

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Compiled<HeadlessShader> {
        let id = self.allocate(HandleKind::Shader(desc.stage));
        let valid = !desc.source.trim().is_empty();
        let log = if valid {
            Vec::new()
        } else {
            vec![format!("{} shader `{}` has no source", desc.stage.as_str(), desc.label)]
        };

        Compiled {
            handle: HeadlessShader { id, stage: desc.stage, valid },
            log,
        }
    }

    fn link_program(&mut self, desc: &ProgramDesc<'_, HeadlessShader>) -> Compiled<HeadlessProgram> {
        let id = self.allocate(HandleKind::Program);

        let mut log = Vec::new();
        for (shader, expected) in [
            (desc.vertex, ShaderStage::Vertex),
            (desc.fragment, ShaderStage::Fragment),
        ] {
            if shader.stage != expected {
                log.push(format!(
                    "program `{}`: {} slot holds a {} shader",
                    desc.label,
                    expected.as_str(),
                    shader.stage.as_str()
                ));
            } else if !shader.valid {
                log.push(format!(
                    "program `{}`: {} shader failed to compile",
                    desc.label,
                    expected.as_str()
                ));
            }
        }

        Compiled {
            handle: HeadlessProgram {
                id,
                layout: desc.layout.clone(),
                valid: log.is_empty(),
            },
            log,
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw_frame(&mut self, frame: &FrameDraw<'_, Self>) -> Result<FrameStatus> {
        if self.pending_skips > 0 {
            self.pending_skips -= 1;
            return Ok(FrameStatus::Skipped);
        }

        for id in [frame.program.id, frame.vertex_buffer.id, frame.index_buffer.id] {
            anyhow::ensure!(self.is_live(id), "draw references released handle {id}");
        }

        self.bindings = Bindings {
            program: Some(frame.program.id),
            vertex_buffer: Some(frame.vertex_buffer.id),
            index_buffer: Some(frame.index_buffer.id),
            vertex_layout: Some(frame.program.layout.clone()),
        };

        if frame.program.valid {
            self.draws.push(RecordedDraw {
                clear: frame.clear,
                viewport: self.viewport,
                program: frame.program.id,
                vertex_buffer: frame.vertex_buffer.id,
                index_buffer: frame.index_buffer.id,
                index_format: frame.index_format,
                call: frame.draw.clone(),
            });
        }

        self.frames_presented += 1;
        Ok(FrameStatus::Presented)
    }

    fn clear_bindings(&mut self) {
        self.bindings = Bindings::default();
    }

    fn release_buffer(&mut self, buffer: HeadlessBuffer) {
        self.release(buffer.id);
    }

    fn release_shader(&mut self, shader: HeadlessShader) {
        self.release(shader.id);
    }

    fn release_program(&mut self, program: HeadlessProgram) {
        self.release(program.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::backend::{Topology, VertexAttribute, VertexFormat};

    fn layout() -> VertexLayout {
        VertexLayout {
            stride: 12,
            attributes: vec![VertexAttribute { location: 0, format: VertexFormat::Float32x3, offset: 0 }],
        }
    }

    fn shader(gpu: &mut HeadlessBackend, stage: ShaderStage, source: &str) -> Compiled<HeadlessShader> {
        gpu.compile_shader(&ShaderDesc { label: "test", stage, source })
    }

    #[test]
    fn ids_are_non_zero_and_unique() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let a = gpu.create_buffer(&BufferInit { label: "a", kind: BufferKind::Vertex, contents: &[0; 12] });
        let b = gpu.create_buffer(&BufferInit { label: "b", kind: BufferKind::Index, contents: &[0; 4] });
        assert_ne!(a.id(), b.id());
        assert_eq!(a.len(), 12);
        assert_eq!(gpu.handle_kind(b.id()), Some(HandleKind::Buffer(BufferKind::Index)));
        assert_eq!(gpu.live_handles(), 2);
    }

    #[test]
    fn empty_shader_source_is_reported() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let compiled = shader(&mut gpu, ShaderStage::Vertex, "   ");
        assert_eq!(compiled.log.len(), 1);
        assert!(compiled.log[0].contains("no source"));
    }

    #[test]
    fn program_with_broken_stage_is_invalid() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let vs = shader(&mut gpu, ShaderStage::Vertex, "").handle;
        let fs = shader(&mut gpu, ShaderStage::Fragment, "fn main() {}").handle;
        let layout = layout();
        let linked = gpu.link_program(&ProgramDesc {
            label: "p",
            vertex: &vs,
            fragment: &fs,
            layout: &layout,
            topology: Topology::TriangleList,
        });
        assert!(!linked.handle.is_valid());
        assert!(linked.log[0].contains("vertex shader failed"));
    }

    #[test]
    fn swapped_stages_are_reported() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let vs = shader(&mut gpu, ShaderStage::Vertex, "v").handle;
        let fs = shader(&mut gpu, ShaderStage::Fragment, "f").handle;
        let layout = layout();
        let linked = gpu.link_program(&ProgramDesc {
            label: "p",
            vertex: &fs,
            fragment: &vs,
            layout: &layout,
            topology: Topology::TriangleList,
        });
        assert_eq!(linked.log.len(), 2);
    }

    #[test]
    fn release_drops_live_handle() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let buf = gpu.create_buffer(&BufferInit { label: "a", kind: BufferKind::Vertex, contents: &[] });
        let id = buf.id();
        gpu.release_buffer(buf);
        assert!(!gpu.is_live(id));
        assert_eq!(gpu.live_handles(), 0);
    }

    #[test]
    fn id_counter_wrap_skips_live_handles() {
        let mut gpu = HeadlessBackend::new(8, 8);
        let first = gpu.create_buffer(&BufferInit { label: "a", kind: BufferKind::Vertex, contents: &[] });
        assert_eq!(first.id().get(), 1);

        gpu.next_id = u32::MAX;
        let last = gpu.create_buffer(&BufferInit { label: "b", kind: BufferKind::Vertex, contents: &[] });
        let wrapped = gpu.create_buffer(&BufferInit { label: "c", kind: BufferKind::Index, contents: &[] });

        assert_eq!(last.id().get(), u32::MAX);
        assert_eq!(wrapped.id().get(), 2);
        assert_eq!(gpu.handle_kind(first.id()), Some(HandleKind::Buffer(BufferKind::Vertex)));
        assert_eq!(gpu.live_handles(), 3);
    }

    #[test]
    fn viewport_starts_full() {
        let gpu = HeadlessBackend::new(640, 480);
        assert_eq!(gpu.viewport(), Viewport::full(640, 480));
    }
}
