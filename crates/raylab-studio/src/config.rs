use std::path::{Path, PathBuf};

use raylab_engine::coords::ColorRgba;
use raylab_engine::device::GpuInit;
use raylab_engine::window::{PhysicalSize, RuntimeConfig};

/// Shader files shipped with the crate.
const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

/// Viewer settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    /// Append the instantaneous frame rate to the window title every frame.
    pub show_fps_in_title: bool,
    /// Cap presentation at the display refresh rate.
    pub vsync: bool,
    pub clear_color: ColorRgba,
}

impl Default for StudioConfig {
    fn default() -> Self {
        let shaders = Path::new(SHADER_DIR);
        Self {
            title: "RayTracing".to_string(),
            width: 1024,
            height: 1024,
            vertex_shader: shaders.join("quad.vert.wgsl"),
            fragment_shader: shaders.join("quad.frag.wgsl"),
            show_fps_in_title: cfg!(debug_assertions),
            vsync: true,
            clear_color: ColorRgba::black(),
        }
    }
}

impl StudioConfig {
    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    pub fn with_fps_in_title(mut self, enabled: bool) -> Self {
        self.show_fps_in_title = enabled;
        self
    }

    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.vsync = enabled;
        self
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit {
            vsync: self.vsync,
            ..GpuInit::default()
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            size: PhysicalSize::new(self.width, self.height),
            ..RuntimeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_window_contract() {
        let cfg = StudioConfig::default();
        assert_eq!(cfg.title, "RayTracing");
        assert_eq!((cfg.width, cfg.height), (1024, 1024));
        assert_eq!(cfg.clear_color, ColorRgba::black());
    }

    #[test]
    fn default_shaders_exist() {
        let cfg = StudioConfig::default();
        assert!(cfg.vertex_shader.is_file(), "{}", cfg.vertex_shader.display());
        assert!(cfg.fragment_shader.is_file(), "{}", cfg.fragment_shader.display());
    }

    #[test]
    fn runtime_config_carries_title_and_size() {
        let rc = StudioConfig::default().runtime_config();
        assert_eq!(rc.title, "RayTracing");
        assert_eq!(rc.size, PhysicalSize::new(1024, 1024));
    }

    #[test]
    fn gpu_init_follows_vsync() {
        assert!(StudioConfig::default().gpu_init().vsync);

        let uncapped = StudioConfig::default().with_vsync(false).gpu_init();
        assert!(!uncapped.vsync);
        assert!(uncapped.prefer_srgb);
    }
}
