use wgpu::{SurfaceError, TextureFormat};

/// What a frame does when its surface texture could not be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SurfaceRecovery {
    /// The swapchain no longer matches the window; configure it again and
    /// skip this frame.
    Reconfigure,
    /// Try again next frame.
    Skip,
    /// The device cannot continue; stop rendering.
    Fatal,
}

impl SurfaceRecovery {
    pub(crate) fn for_error(err: &SurfaceError) -> Self {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
            SurfaceError::Timeout | SurfaceError::Other => SurfaceRecovery::Skip,
            SurfaceError::OutOfMemory => SurfaceRecovery::Fatal,
        }
    }
}

/// Picks the swapchain format from what the surface supports.
///
/// With `prefer_srgb`, an sRGB 8-bit format wins if offered; otherwise the
/// surface's own first choice is used.
pub(crate) fn pick_format(formats: &[TextureFormat], prefer_srgb: bool) -> Option<TextureFormat> {
    let srgb = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Rgba8UnormSrgb];

    prefer_srgb
        .then(|| srgb.into_iter().find(|f| formats.contains(f)))
        .flatten()
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_swapchain_is_reconfigured() {
        assert_eq!(SurfaceRecovery::for_error(&SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::for_error(&SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
    }

    #[test]
    fn timeout_skips_the_frame() {
        assert_eq!(SurfaceRecovery::for_error(&SurfaceError::Timeout), SurfaceRecovery::Skip);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert_eq!(SurfaceRecovery::for_error(&SurfaceError::OutOfMemory), SurfaceRecovery::Fatal);
    }

    #[test]
    fn srgb_preferred_when_offered() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba16Float, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_format(&formats, true), Some(TextureFormat::Rgba16Float));
    }

    #[test]
    fn no_formats_means_no_surface() {
        assert_eq!(pick_format(&[], true), None);
    }
}
