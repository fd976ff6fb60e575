use bytemuck::{Pod, Zeroable};

/// Four-component `f32` vector (homogeneous point or RGBA).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector4 {
    pub elements: [f32; 4],
}

impl Vector4 {
    #[inline]
    pub const fn new(elements: [f32; 4]) -> Self {
        Self { elements }
    }

    #[inline]
    pub const fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { elements: [x, y, z, w] }
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
    pub fn w(&self) -> f32 {
        self.elements[3]
    }
}

impl From<[f32; 4]> for Vector4 {
    #[inline]
    fn from(elements: [f32; 4]) -> Self {
        Self { elements }
    }
}
