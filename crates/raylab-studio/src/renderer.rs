use anyhow::{bail, Result};

use raylab_engine::coords::Viewport;
use raylab_engine::core::{AppControl, FrameCtx, GraphicsContext};
use raylab_engine::device::{
    Backend, BufferInit, BufferKind, FrameDraw, FrameStatus, IndexFormat, ProgramDesc, ShaderDesc,
    ShaderStage, Topology, VertexLayout,
};
use raylab_engine::time::FrameTime;

use crate::config::StudioConfig;
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::geometry::{quad_draw_call, Vertex, QUAD_INDICES, QUAD_VERTICES};
use crate::shader::ShaderSources;

/// Where a renderer is in its lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Created,
    Loaded,
    Unloaded,
}

/// Compiled stages plus the program linking them.
pub struct ShaderProgram<B: Backend> {
    pub vertex: B::Shader,
    pub fragment: B::Shader,
    pub program: B::Program,
}

/// GPU resources owned by a loaded renderer.
pub struct QuadResources<B: Backend> {
    pub vertex_buffer: B::Buffer,
    pub vertex_layout: VertexLayout,
    pub index_buffer: B::Buffer,
    pub program: ShaderProgram<B>,
}

impl<B: Backend> QuadResources<B> {
    fn release(self, gpu: &mut B) {
        let QuadResources {
            vertex_buffer,
            vertex_layout: _,
            index_buffer,
            program,
        } = self;

        gpu.release_buffer(vertex_buffer);
        gpu.release_buffer(index_buffer);
        gpu.release_program(program.program);
        gpu.release_shader(program.vertex);
        gpu.release_shader(program.fragment);
    }
}

enum State<B: Backend> {
    Created,
    Loaded(QuadResources<B>),
    Unloaded,
}

/// Draws one full-screen quad with a shader pair loaded from disk.
///
/// Diagnostics from compiling and linking the shaders go to `S`; they never
/// fail the load.
pub struct QuadRenderer<B: Backend, S: DiagnosticSink = LogSink> {
    config: StudioConfig,
    sink: S,
    state: State<B>,
    warned_not_loaded: bool,
}

impl<B: Backend> QuadRenderer<B, LogSink> {
    pub fn new(config: StudioConfig) -> Self {
        Self::with_sink(config, LogSink)
    }
}

impl<B: Backend, S: DiagnosticSink> QuadRenderer<B, S> {
    pub fn with_sink(config: StudioConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            state: State::Created,
            warned_not_loaded: false,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Created => Phase::Created,
            State::Loaded(_) => Phase::Loaded,
            State::Unloaded => Phase::Unloaded,
        }
    }

    /// GPU resources, present only between load and unload.
    pub fn resources(&self) -> Option<&QuadResources<B>> {
        match &self.state {
            State::Loaded(res) => Some(res),
            _ => None,
        }
    }

    /// Window title for the given frame, if the frame rate is to be shown.
    pub fn fps_title(&self, time: &FrameTime) -> Option<String> {
        self.config
            .show_fps_in_title
            .then(|| format!("{} | FPS: {}", self.config.title, time.fps()))
    }

    pub fn load(&mut self, gpu: &mut B) -> Result<()> {
        match self.state {
            State::Created => {}
            State::Loaded(_) => bail!("quad renderer is already loaded"),
            State::Unloaded => bail!("quad renderer was unloaded and cannot be reloaded"),
        }

        // Read sources before allocating anything so a missing file leaks nothing.
        let sources = ShaderSources::load(&self.config.vertex_shader, &self.config.fragment_shader)?;

        let vertex_buffer = gpu.create_buffer(&BufferInit {
            label: "raylab quad vertices",
            kind: BufferKind::Vertex,
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
        });
        let vertex_layout = Vertex::layout();
        let index_buffer = gpu.create_buffer(&BufferInit {
            label: "raylab quad indices",
            kind: BufferKind::Index,
            contents: bytemuck::cast_slice(&QUAD_INDICES),
        });

        let program = self.build_program(gpu, &sources, &vertex_layout);

        self.state = State::Loaded(QuadResources {
            vertex_buffer,
            vertex_layout,
            index_buffer,
            program,
        });
        log::info!(
            "quad renderer loaded ({}, {})",
            self.config.vertex_shader.display(),
            self.config.fragment_shader.display()
        );
        Ok(())
    }

    fn build_program(
        &self,
        gpu: &mut B,
        sources: &ShaderSources,
        layout: &VertexLayout,
    ) -> ShaderProgram<B> {
        let vertex = gpu.compile_shader(&ShaderDesc {
            label: "raylab quad vertex shader",
            stage: ShaderStage::Vertex,
            source: &sources.vertex,
        });
        self.report("vertex shader", &vertex.log);

        let fragment = gpu.compile_shader(&ShaderDesc {
            label: "raylab quad fragment shader",
            stage: ShaderStage::Fragment,
            source: &sources.fragment,
        });
        self.report("fragment shader", &fragment.log);

        let linked = gpu.link_program(&ProgramDesc {
            label: "raylab quad program",
            vertex: &vertex.handle,
            fragment: &fragment.handle,
            layout,
            topology: Topology::TriangleList,
        });
        self.report("program", &linked.log);

        ShaderProgram {
            vertex: vertex.handle,
            fragment: fragment.handle,
            program: linked.handle,
        }
    }

    fn report(&self, what: &str, log: &[String]) {
        for line in log.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            self.sink.report(&format!("{what}: {line}"));
        }
    }

    pub fn resize(&mut self, gpu: &mut B, width: u32, height: u32) {
        gpu.set_viewport(Viewport::full(width, height));
    }

    /// Draws the quad and presents. Errors are fatal for the render loop.
    pub fn render(&mut self, gpu: &mut B) -> Result<FrameStatus> {
        let State::Loaded(res) = &self.state else {
            if !self.warned_not_loaded {
                log::debug!("render called while {:?}; nothing drawn", self.phase());
                self.warned_not_loaded = true;
            }
            return Ok(FrameStatus::Skipped);
        };

        gpu.draw_frame(&FrameDraw {
            clear: self.config.clear_color,
            program: &res.program.program,
            vertex_buffer: &res.vertex_buffer,
            index_buffer: &res.index_buffer,
            index_format: IndexFormat::Uint32,
            draw: quad_draw_call(),
        })
    }

    /// Clears bindings and releases every handle allocated by `load`.
    pub fn unload(&mut self, gpu: &mut B) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Unloaded) {
            State::Loaded(res) => {
                gpu.clear_bindings();
                res.release(gpu);
                log::info!("quad renderer unloaded");
                Ok(())
            }
            State::Created => {
                self.state = State::Created;
                bail!("quad renderer was never loaded")
            }
            State::Unloaded => bail!("quad renderer is already unloaded"),
        }
    }
}

impl<B: Backend, S: DiagnosticSink> GraphicsContext<B> for QuadRenderer<B, S> {
    fn on_load(&mut self, gpu: &mut B) -> Result<()> {
        self.load(gpu)
    }

    fn on_resize(&mut self, gpu: &mut B, width: u32, height: u32) {
        self.resize(gpu, width, height);
    }

    fn on_update(&mut self, ctx: &mut FrameCtx<'_, B>) -> AppControl {
        if let Some(title) = self.fps_title(&ctx.time) {
            ctx.runtime.set_title(title);
        }
        AppControl::Continue
    }

    fn on_render(&mut self, ctx: &mut FrameCtx<'_, B>) -> AppControl {
        match self.render(ctx.gpu) {
            Ok(_) => AppControl::Continue,
            Err(e) => {
                log::error!("render failed: {e:#}");
                AppControl::Exit
            }
        }
    }

    fn on_unload(&mut self, gpu: &mut B) -> Result<()> {
        self.unload(gpu)
    }
}
