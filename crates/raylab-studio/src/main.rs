use std::process::ExitCode;

use raylab_engine::device::Gpu;
use raylab_engine::logging::{init_logging, LoggingConfig};
use raylab_engine::window::Runtime;
use raylab_studio::{QuadRenderer, StudioConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::default();
    log::info!(
        "starting `{}` at {}x{}",
        config.title,
        config.width,
        config.height
    );

    let renderer: QuadRenderer<Gpu> = QuadRenderer::new(config.clone());

    match Runtime::run(config.runtime_config(), config.gpu_init(), renderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
