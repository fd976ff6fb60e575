/// Drawing surface size in logical pixels, captured when a renderer is created.
///
/// Not updated on resize; demos that care re-create their context.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// `width / height`, the aspect argument of a perspective projection.
    ///
    /// `0.0` for an invalid viewport, which a projection rejects as a null frustum.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{MathError, Matrix4};

    #[test]
    fn aspect_feeds_perspective() {
        let vp = Viewport::new(800.0, 400.0);
        assert_eq!(vp.aspect(), 2.0);
        assert!(Matrix4::identity().set_perspective(30.0, vp.aspect(), 1.0, 100.0).is_ok());
    }

    #[test]
    fn empty_viewport_is_rejected_by_projection() {
        let vp = Viewport::default();
        assert!(!vp.is_valid());
        let err = Matrix4::identity().set_perspective(30.0, vp.aspect(), 1.0, 100.0).unwrap_err();
        assert!(matches!(err, MathError::NullFrustum { .. }));
    }
}
