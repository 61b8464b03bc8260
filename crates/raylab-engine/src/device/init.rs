/// Presentation settings for the window surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GpuInit {
    /// Prefer an sRGB surface format so linear clear colors display as written.
    pub prefer_srgb: bool,

    /// Wait for vertical blank before presenting.
    ///
    /// With vsync off the frame rate is only bounded by how fast frames can be
    /// acquired, which is what a frame-rate readout is meant to show.
    pub vsync: bool,
}

impl GpuInit {
    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_selects_fifo() {
        assert_eq!(GpuInit::default().present_mode(), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn no_vsync_lets_the_platform_pick() {
        let init = GpuInit { vsync: false, ..GpuInit::default() };
        assert_eq!(init.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }
}
