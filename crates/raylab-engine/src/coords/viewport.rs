/// Viewport rectangle in physical pixels.
///
/// The origin is the top-left corner of the render target. A viewport covering
/// the whole target is `Viewport::full(width, height)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a `width` x `height` target, anchored at the origin.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Clips the viewport to a `width` x `height` target.
    ///
    /// Returns `None` when nothing of the viewport remains visible.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        let clamped = Self::new(self.x, self.y, w, h);
        clamped.is_valid().then_some(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_is_anchored_at_origin() {
        assert_eq!(Viewport::full(1024, 768), Viewport::new(0, 0, 1024, 768));
    }

    #[test]
    fn zero_sized_viewport_is_invalid() {
        assert!(!Viewport::full(0, 10).is_valid());
        assert!(!Viewport::full(10, 0).is_valid());
        assert!(Viewport::full(1, 1).is_valid());
    }

    #[test]
    fn clamped_to_larger_target_is_identity() {
        let vp = Viewport::full(800, 600);
        assert_eq!(vp.clamped_to(1024, 1024), Some(vp));
    }

    #[test]
    fn clamped_to_smaller_target_shrinks() {
        let vp = Viewport::new(10, 20, 1000, 1000);
        assert_eq!(vp.clamped_to(110, 70), Some(Viewport::new(10, 20, 100, 50)));
    }

    #[test]
    fn clamped_outside_target_is_none() {
        assert_eq!(Viewport::new(200, 0, 10, 10).clamped_to(100, 100), None);
        assert_eq!(Viewport::full(0, 0).clamped_to(100, 100), None);
    }
}
