use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::{ColorRgba, Viewport};

use super::backend::{
    Backend, BufferInit, BufferKind, Compiled, FrameDraw, FrameStatus, IndexFormat, ProgramDesc,
    ShaderDesc, Topology, VertexFormat, VertexLayout,
};
use super::frame::GpuFrame;
use super::surface::{self, SurfaceRecovery};
use super::GpuInit;

/// Shader module plus whether it compiled without errors.
pub struct GpuShader {
    module: wgpu::ShaderModule,
    valid: bool,
}

/// Linked render pipeline plus whether linking succeeded.
///
/// Invalid programs are kept so the caller's lifecycle stays uniform, but
/// frames drawn with them only clear the target.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    valid: bool,
}

impl GpuProgram {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates and stores Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - implements [`Backend`] on top of them
pub struct Gpu {
    window: Arc<Window>,

    /// Surface bound to the window. Holding `window` keeps it valid.
    surface: wgpu::Surface<'static>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    /// Viewport applied to every draw, in physical pixels.
    viewport: Viewport,
}

impl Gpu {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("raylab device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::pick_format(&surface_caps.formats, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let info = adapter.get_info();
        log::info!(
            "using {} ({:?}), surface {:?} {:?} {}x{}",
            info.name,
            info.backend,
            format,
            config.present_mode,
            size.width,
            size.height
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            viewport: Viewport::full(size.width, size.height),
        })
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface after a resize.
    ///
    /// The viewport is left alone; renderers set it from their resize callback.
    /// A 0x0 size (minimized window) is recorded but the surface keeps its last
    /// configuration until a non-zero size arrives.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.reconfigure();
    }

    fn reconfigure(&self) {
        if self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("raylab frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the surface texture.
    fn submit(&self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        self.window.pre_present_notify();
        surface_texture.present();
    }

    /// Runs `create` inside a validation error scope and collects the error, if any.
    fn capture_validation<T>(&self, create: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<String>) {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        let error = pollster::block_on(scope.pop()).map(|e| e.to_string());
        (value, error)
    }
}

impl Backend for Gpu {
    type Buffer = wgpu::Buffer;
    type Shader = GpuShader;
    type Program = GpuProgram;

    fn create_buffer(&mut self, init: &BufferInit<'_>) -> wgpu::Buffer {
        let usage = match init.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(init.label),
            contents: init.contents,
            usage,
        })
    }

    fn compile_shader(&mut self, desc: &ShaderDesc<'_>) -> Compiled<GpuShader> {
        let (module, error) = self.capture_validation(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.source.into()),
            })
        });

        let info = pollster::block_on(module.get_compilation_info());
        let mut log: Vec<String> = info.messages.iter().map(format_compilation_message).collect();

        let has_errors = info
            .messages
            .iter()
            .any(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error));

        // Validation errors that are not compilation messages (e.g. a missing
        // entry point) only surface through the error scope.
        if let Some(error) = &error {
            if !has_errors {
                log.push(error.clone());
            }
        }

        Compiled {
            handle: GpuShader {
                module,
                valid: error.is_none() && !has_errors,
            },
            log,
        }
    }

    fn link_program(&mut self, desc: &ProgramDesc<'_, GpuShader>) -> Compiled<GpuProgram> {
        let attributes = to_wgpu_attributes(desc.layout);
        let format = self.config.format;

        let (pipeline, error) = self.capture_validation(|device| {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&layout),

                vertex: wgpu::VertexState {
                    module: &desc.vertex.module,
                    entry_point: None,
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: desc.layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &desc.fragment.module,
                    entry_point: None,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: to_wgpu_topology(desc.topology),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        });

        let mut log = Vec::new();
        for (shader, stage) in [(desc.vertex, "vertex"), (desc.fragment, "fragment")] {
            if !shader.valid {
                log.push(format!("{stage} shader did not compile"));
            }
        }
        if let Some(error) = &error {
            log.push(error.clone());
        }

        Compiled {
            handle: GpuProgram {
                pipeline,
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
        let mut target = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let recovery = SurfaceRecovery::for_error(&err);
                match recovery {
                    SurfaceRecovery::Fatal => {
                        anyhow::bail!("surface texture acquisition failed: {err}")
                    }
                    SurfaceRecovery::Reconfigure => self.reconfigure(),
                    SurfaceRecovery::Skip => {}
                }
                log::debug!("frame skipped after surface error ({recovery:?}): {err}");
                return Ok(FrameStatus::Skipped);
            }
        };

        // A viewport set before the surface caught up with a resize must not
        // exceed the render target.
        let viewport = self.viewport.clamped_to(self.config.width, self.config.height);

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("raylab frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(frame.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(vp) = viewport.filter(|_| frame.program.valid) {
                rpass.set_viewport(
                    vp.x as f32,
                    vp.y as f32,
                    vp.width as f32,
                    vp.height as f32,
                    0.0,
                    1.0,
                );
                rpass.set_pipeline(&frame.program.pipeline);
                rpass.set_vertex_buffer(0, frame.vertex_buffer.slice(..));
                rpass.set_index_buffer(
                    frame.index_buffer.slice(..),
                    to_wgpu_index_format(frame.index_format),
                );
                rpass.draw_indexed(frame.draw.indices.clone(), frame.draw.base_vertex, 0..1);
            }
        }

        self.submit(target);
        Ok(FrameStatus::Presented)
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn release_shader(&mut self, shader: GpuShader) {
        drop(shader);
    }

    fn release_program(&mut self, program: GpuProgram) {
        drop(program);
    }
}

fn format_compilation_message(message: &wgpu::CompilationMessage) -> String {
    let kind = match message.message_type {
        wgpu::CompilationMessageType::Error => "error",
        wgpu::CompilationMessageType::Warning => "warning",
        wgpu::CompilationMessageType::Info => "info",
    };

    match &message.location {
        Some(loc) => format!(
            "{kind} at {}:{}: {}",
            loc.line_number, loc.line_position, message.message
        ),
        None => format!("{kind}: {}", message.message),
    }
}

fn to_wgpu_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: match a.format {
                VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            },
            offset: a.offset,
            shader_location: a.location,
        })
        .collect()
}

fn to_wgpu_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

fn to_wgpu_index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

fn to_wgpu_color(c: ColorRgba) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}
