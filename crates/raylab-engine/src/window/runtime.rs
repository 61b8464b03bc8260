use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{AppControl, FrameCtx, GraphicsContext};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial drawable size in physical pixels.
    pub size: PhysicalSize<u32>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "raylab".to_string(),
            size: PhysicalSize::new(1024, 1024),
            resizable: true,
        }
    }
}

/// Runtime context passed to per-frame callbacks.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    /// Last title requested this frame, if any.
    pub fn requested_title(&self) -> Option<&str> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::SetTitle(t) => Some(t.as_str()),
            Command::Exit => None,
        })
    }

    pub fn exit_requested(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Exit))
    }
}

#[derive(Debug)]
enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until the window is closed.
    ///
    /// Returns the load error if the application failed to start.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: GraphicsContext<Gpu> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Host {
    window: Arc<Window>,
    gpu: Gpu,
    clock: FrameClock,
}

struct AppState<A>
where
    A: GraphicsContext<Gpu> + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    host: Option<Host>,
    started: bool,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: GraphicsContext<Gpu> + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            host: None,
            started: false,
            exit_requested: false,
            failure: None,
        }
    }

    /// Creates the window + GPU context and loads the application.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(self.config.resizable);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let mut gpu = pollster::block_on(Gpu::new(Arc::clone(&window), self.gpu_init))
            .context("GPU initialization failed")?;

        self.app.on_load(&mut gpu).context("application failed to load")?;
        log::debug!("application loaded");

        let size = gpu.size();
        if size.width > 0 && size.height > 0 {
            self.app.on_resize(&mut gpu, size.width, size.height);
        }

        let mut clock = FrameClock::default();
        clock.reset();

        window.request_redraw();
        self.host = Some(Host { window, gpu, clock });
        Ok(())
    }

    /// Unloads the application and drops the GPU context and window.
    ///
    /// Safe to call more than once; only the first call reaches the application.
    fn shutdown(&mut self) {
        let Some(mut host) = self.host.take() else {
            return;
        };

        if let Err(e) = self.app.on_unload(&mut host.gpu) {
            log::error!("application failed to unload: {e:#}");
        }
        log::debug!("application unloaded");
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.shutdown();
        event_loop.exit();
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        host.gpu.resize(new_size);
        if new_size.width > 0 && new_size.height > 0 {
            self.app.on_resize(&mut host.gpu, new_size.width, new_size.height);
        }
        host.window.request_redraw();
    }

    /// Drives one update + render pass. Returns `Exit` if the app asked to stop.
    fn frame(&mut self) -> AppControl {
        let Self { app, host, .. } = self;
        let Some(host) = host.as_mut() else {
            return AppControl::Continue;
        };

        let time = host.clock.tick();
        let mut runtime = RuntimeCtx::default();

        let mut control = {
            let mut ctx = FrameCtx::new(&mut host.gpu, time, &mut runtime);
            match app.on_update(&mut ctx) {
                AppControl::Continue => app.on_render(&mut ctx),
                AppControl::Exit => AppControl::Exit,
            }
        };

        for cmd in runtime.commands.drain(..) {
            match cmd {
                Command::SetTitle(title) => host.window.set_title(&title),
                Command::Exit => control = AppControl::Exit,
            }
        }

        control
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: GraphicsContext<Gpu> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self.start(event_loop) {
            log::error!("failed to start: {e:#}");
            self.failure = Some(e);
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(host) = &self.host {
            host.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.host.as_ref().map(|h| h.window.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.host.as_ref().map(|h| h.window.inner_size()) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.frame() == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_title_is_last_set() {
        let mut ctx = RuntimeCtx::default();
        assert_eq!(ctx.requested_title(), None);
        ctx.set_title("a");
        ctx.set_title("b");
        assert_eq!(ctx.requested_title(), Some("b"));
        assert!(!ctx.exit_requested());
    }

    #[test]
    fn exit_is_recorded() {
        let mut ctx = RuntimeCtx::default();
        ctx.exit();
        assert!(ctx.exit_requested());
    }

    #[test]
    fn default_config_is_square() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.size, PhysicalSize::new(1024, 1024));
    }
}
