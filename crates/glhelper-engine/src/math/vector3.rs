use bytemuck::{Pod, Zeroable};

/// Three-component `f32` vector.
///
/// Components live in `elements`; `x()`, `y()`, `z()` read from the same storage,
/// so writes through `elements` are visible through the accessors.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    pub elements: [f32; 3],
}

impl Vector3 {
    #[inline]
    pub const fn new(elements: [f32; 3]) -> Self {
        Self { elements }
    }

    #[inline]
    pub const fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self { elements: [x, y, z] }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { elements: [0.0; 3] }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.elements[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.elements[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.elements[2]
    }

    #[inline]
    pub fn length(&self) -> f32 {
        let [x, y, z] = self.elements;
        (x * x + y * y + z * z).sqrt()
    }

    /// Normalizes in place.
    ///
    /// A zero vector stays zero; a vector that is already unit length is left untouched.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len == 0.0 {
            self.elements = [0.0; 3];
            return self;
        }
        if len == 1.0 {
            return self;
        }
        let inv = 1.0 / len;
        for e in &mut self.elements {
            *e *= inv;
        }
        self
    }
}

impl From<[f32; 3]> for Vector3 {
    #[inline]
    fn from(elements: [f32; 3]) -> Self {
        Self { elements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_elements() {
        let mut v = Vector3::from_xyz(1.0, 2.0, 3.0);
        v.elements[1] = 9.0;
        assert_eq!(v.y(), 9.0);
        assert_eq!((v.x(), v.z()), (1.0, 3.0));
    }

    #[test]
    fn normalize_scales_to_unit_length() {
        let mut v = Vector3::from_xyz(3.0, 0.0, 4.0);
        v.normalize();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!((v.x() - 0.6).abs() < 1e-6);
        assert!((v.z() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let mut v = Vector3::zero();
        v.normalize();
        assert_eq!(v, Vector3::zero());
    }
}
