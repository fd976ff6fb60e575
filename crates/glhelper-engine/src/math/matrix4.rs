use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::{angle, MathError, Vector3, Vector4};

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// 4x4 transform stored column-major.
///
/// Element `(row, col)` lives at `elements[col * 4 + row]`, which is the layout
/// `glUniformMatrix4fv` expects with `transpose = false`.
///
/// Mutators come in two families:
/// - `set_*` overwrites all 16 elements from scratch
/// - the un-prefixed form post-multiplies: `self = self * M(args)`
///
/// Both return `&mut Self` so calls chain. Projection builders validate their
/// bounds and return `Result`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Matrix4 {
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    #[inline]
    pub const fn identity() -> Self {
        Self { elements: IDENTITY }
    }

    #[inline]
    pub const fn from_elements(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    pub fn set_identity(&mut self) -> &mut Self {
        self.elements = IDENTITY;
        self
    }

    /// Copies `other` into `self`.
    pub fn set(&mut self, other: &Matrix4) -> &mut Self {
        self.elements = other.elements;
        self
    }

    // ── composition ───────────────────────────────────────────────────────

    /// `self = self * other`.
    pub fn concat(&mut self, other: &Matrix4) -> &mut Self {
        // `other` may be a copy of `self`; read from a local copy either way.
        let b = other.elements;
        let e = &mut self.elements;

        for i in 0..4 {
            let ai0 = e[i];
            let ai1 = e[i + 4];
            let ai2 = e[i + 8];
            let ai3 = e[i + 12];
            e[i] = ai0 * b[0] + ai1 * b[1] + ai2 * b[2] + ai3 * b[3];
            e[i + 4] = ai0 * b[4] + ai1 * b[5] + ai2 * b[6] + ai3 * b[7];
            e[i + 8] = ai0 * b[8] + ai1 * b[9] + ai2 * b[10] + ai3 * b[11];
            e[i + 12] = ai0 * b[12] + ai1 * b[13] + ai2 * b[14] + ai3 * b[15];
        }

        self
    }

    /// Alias of [`concat`](Self::concat).
    #[inline]
    pub fn multiply(&mut self, other: &Matrix4) -> &mut Self {
        self.concat(other)
    }

    /// Transforms `pos` as a point (implicit `w = 1`), returning a new vector.
    pub fn multiply_vector3(&self, pos: &Vector3) -> Vector3 {
        let e = &self.elements;
        let p = &pos.elements;
        Vector3::from_xyz(
            p[0] * e[0] + p[1] * e[4] + p[2] * e[8] + e[12],
            p[0] * e[1] + p[1] * e[5] + p[2] * e[9] + e[13],
            p[0] * e[2] + p[1] * e[6] + p[2] * e[10] + e[14],
        )
    }

    /// Transforms a column vector, returning a new vector.
    pub fn multiply_vector4(&self, pos: &Vector4) -> Vector4 {
        let e = &self.elements;
        let p = &pos.elements;
        Vector4::from_xyzw(
            p[0] * e[0] + p[1] * e[4] + p[2] * e[8] + p[3] * e[12],
            p[0] * e[1] + p[1] * e[5] + p[2] * e[9] + p[3] * e[13],
            p[0] * e[2] + p[1] * e[6] + p[2] * e[10] + p[3] * e[14],
            p[0] * e[3] + p[1] * e[7] + p[2] * e[11] + p[3] * e[15],
        )
    }

    pub fn transpose(&mut self) -> &mut Self {
        let e = &mut self.elements;
        e.swap(1, 4);
        e.swap(2, 8);
        e.swap(3, 12);
        e.swap(6, 9);
        e.swap(7, 13);
        e.swap(11, 14);
        self
    }

    // ── inverse ───────────────────────────────────────────────────────────

    /// Sets `self` to the inverse of `other` (cofactor / adjugate method).
    ///
    /// If `other` is singular (determinant exactly zero) `self` is left unchanged.
    pub fn set_inverse_of(&mut self, other: &Matrix4) -> &mut Self {
        let s = &other.elements;
        let mut inv = [0.0f32; 16];

        inv[0] = s[5] * s[10] * s[15] - s[5] * s[11] * s[14] - s[9] * s[6] * s[15]
            + s[9] * s[7] * s[14]
            + s[13] * s[6] * s[11]
            - s[13] * s[7] * s[10];
        inv[4] = -s[4] * s[10] * s[15] + s[4] * s[11] * s[14] + s[8] * s[6] * s[15]
            - s[8] * s[7] * s[14]
            - s[12] * s[6] * s[11]
            + s[12] * s[7] * s[10];
        inv[8] = s[4] * s[9] * s[15] - s[4] * s[11] * s[13] - s[8] * s[5] * s[15]
            + s[8] * s[7] * s[13]
            + s[12] * s[5] * s[11]
            - s[12] * s[7] * s[9];
        inv[12] = -s[4] * s[9] * s[14] + s[4] * s[10] * s[13] + s[8] * s[5] * s[14]
            - s[8] * s[6] * s[13]
            - s[12] * s[5] * s[10]
            + s[12] * s[6] * s[9];

        inv[1] = -s[1] * s[10] * s[15] + s[1] * s[11] * s[14] + s[9] * s[2] * s[15]
            - s[9] * s[3] * s[14]
            - s[13] * s[2] * s[11]
            + s[13] * s[3] * s[10];
        inv[5] = s[0] * s[10] * s[15] - s[0] * s[11] * s[14] - s[8] * s[2] * s[15]
            + s[8] * s[3] * s[14]
            + s[12] * s[2] * s[11]
            - s[12] * s[3] * s[10];
        inv[9] = -s[0] * s[9] * s[15] + s[0] * s[11] * s[13] + s[8] * s[1] * s[15]
            - s[8] * s[3] * s[13]
            - s[12] * s[1] * s[11]
            + s[12] * s[3] * s[9];
        inv[13] = s[0] * s[9] * s[14] - s[0] * s[10] * s[13] - s[8] * s[1] * s[14]
            + s[8] * s[2] * s[13]
            + s[12] * s[1] * s[10]
            - s[12] * s[2] * s[9];

        inv[2] = s[1] * s[6] * s[15] - s[1] * s[7] * s[14] - s[5] * s[2] * s[15]
            + s[5] * s[3] * s[14]
            + s[13] * s[2] * s[7]
            - s[13] * s[3] * s[6];
        inv[6] = -s[0] * s[6] * s[15] + s[0] * s[7] * s[14] + s[4] * s[2] * s[15]
            - s[4] * s[3] * s[14]
            - s[12] * s[2] * s[7]
            + s[12] * s[3] * s[6];
        inv[10] = s[0] * s[5] * s[15] - s[0] * s[7] * s[13] - s[4] * s[1] * s[15]
            + s[4] * s[3] * s[13]
            + s[12] * s[1] * s[7]
            - s[12] * s[3] * s[5];
        inv[14] = -s[0] * s[5] * s[14] + s[0] * s[6] * s[13] + s[4] * s[1] * s[14]
            - s[4] * s[2] * s[13]
            - s[12] * s[1] * s[6]
            + s[12] * s[2] * s[5];

        inv[3] = -s[1] * s[6] * s[11] + s[1] * s[7] * s[10] + s[5] * s[2] * s[11]
            - s[5] * s[3] * s[10]
            - s[9] * s[2] * s[7]
            + s[9] * s[3] * s[6];
        inv[7] = s[0] * s[6] * s[11] - s[0] * s[7] * s[10] - s[4] * s[2] * s[11]
            + s[4] * s[3] * s[10]
            + s[8] * s[2] * s[7]
            - s[8] * s[3] * s[6];
        inv[11] = -s[0] * s[5] * s[11] + s[0] * s[7] * s[9] + s[4] * s[1] * s[11]
            - s[4] * s[3] * s[9]
            - s[8] * s[1] * s[7]
            + s[8] * s[3] * s[5];
        inv[15] = s[0] * s[5] * s[10] - s[0] * s[6] * s[9] - s[4] * s[1] * s[10]
            + s[4] * s[2] * s[9]
            + s[8] * s[1] * s[6]
            - s[8] * s[2] * s[5];

        let det = s[0] * inv[0] + s[1] * inv[4] + s[2] * inv[8] + s[3] * inv[12];
        if det == 0.0 {
            return self;
        }

        let inv_det = 1.0 / det;
        for (dst, src) in self.elements.iter_mut().zip(inv) {
            *dst = src * inv_det;
        }

        self
    }

    /// Inverts in place (no-op when singular).
    pub fn invert(&mut self) -> &mut Self {
        let copy = *self;
        self.set_inverse_of(&copy)
    }

    // ── projections ───────────────────────────────────────────────────────

    /// Orthographic projection.
    pub fn set_ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        if left == right || bottom == top || near == far {
            return Err(MathError::NullFrustum { left, right, bottom, top, near, far });
        }

        let rw = 1.0 / (right - left);
        let rh = 1.0 / (top - bottom);
        let rd = 1.0 / (far - near);

        self.elements = [
            2.0 * rw, 0.0, 0.0, 0.0, //
            0.0, 2.0 * rh, 0.0, 0.0, //
            0.0, 0.0, -2.0 * rd, 0.0, //
            -(right + left) * rw,
            -(top + bottom) * rh,
            -(far + near) * rd,
            1.0,
        ];
        Ok(self)
    }

    pub fn ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        let mut m = Matrix4::identity();
        m.set_ortho(left, right, bottom, top, near, far)?;
        Ok(self.concat(&m))
    }

    /// Perspective projection from an explicit view volume.
    pub fn set_frustum(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        if left == right || top == bottom || near == far {
            return Err(MathError::NullFrustum { left, right, bottom, top, near, far });
        }
        if near <= 0.0 {
            return Err(MathError::NonPositiveNear(near));
        }
        if far <= 0.0 {
            return Err(MathError::NonPositiveFar(far));
        }

        let rw = 1.0 / (right - left);
        let rh = 1.0 / (top - bottom);
        let rd = 1.0 / (far - near);

        self.elements = [
            2.0 * near * rw, 0.0, 0.0, 0.0, //
            0.0, 2.0 * near * rh, 0.0, 0.0, //
            (right + left) * rw,
            (top + bottom) * rh,
            -(far + near) * rd,
            -1.0,
            0.0, 0.0, -2.0 * near * far * rd, 0.0,
        ];
        Ok(self)
    }

    pub fn frustum(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        let mut m = Matrix4::identity();
        m.set_frustum(left, right, bottom, top, near, far)?;
        Ok(self.concat(&m))
    }

    /// Symmetric perspective projection. `fovy` is the vertical field of view in degrees.
    pub fn set_perspective(
        &mut self,
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        let null_frustum = || MathError::NullFrustum {
            left: -aspect,
            right: aspect,
            bottom: -1.0,
            top: 1.0,
            near,
            far,
        };

        if near == far || aspect == 0.0 {
            return Err(null_frustum());
        }
        if near <= 0.0 {
            return Err(MathError::NonPositiveNear(near));
        }
        if far <= 0.0 {
            return Err(MathError::NonPositiveFar(far));
        }

        let half_fovy = angle::to_radians(fovy) / 2.0;
        let s = half_fovy.sin();
        if s == 0.0 {
            return Err(null_frustum());
        }

        let rd = 1.0 / (far - near);
        let ct = half_fovy.cos() / s;

        self.elements = [
            ct / aspect, 0.0, 0.0, 0.0, //
            0.0, ct, 0.0, 0.0, //
            0.0, 0.0, -(far + near) * rd, -1.0, //
            0.0, 0.0, -2.0 * near * far * rd, 0.0,
        ];
        Ok(self)
    }

    pub fn perspective(
        &mut self,
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<&mut Self, MathError> {
        let mut m = Matrix4::identity();
        m.set_perspective(fovy, aspect, near, far)?;
        Ok(self.concat(&m))
    }

    // ── affine ────────────────────────────────────────────────────────────

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.elements = [
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        self
    }

    /// `self = self * scale(x, y, z)`, computed by scaling the first three columns.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let e = &mut self.elements;
        for row in 0..4 {
            e[row] *= x;
            e[row + 4] *= y;
            e[row + 8] *= z;
        }
        self
    }

    pub fn set_translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.elements = [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        ];
        self
    }

    /// `self = self * translate(x, y, z)`, computed by updating the last column.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let e = &mut self.elements;
        for row in 0..4 {
            e[row + 12] += e[row] * x + e[row + 4] * y + e[row + 8] * z;
        }
        self
    }

    /// Rotation of `degrees` around the axis `(x, y, z)`.
    ///
    /// The axis does not need to be normalized. Pure X, Y or Z axes take a fast
    /// path where only the sign of the non-zero component matters. A zero axis is
    /// not checked and yields NaN elements.
    pub fn set_rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) -> &mut Self {
        let rad = angle::to_radians(degrees);
        let mut sin = rad.sin();
        let cos = rad.cos();

        if x != 0.0 && y == 0.0 && z == 0.0 {
            if x < 0.0 {
                sin = -sin;
            }
            self.elements = [
                1.0, 0.0, 0.0, 0.0, //
                0.0, cos, sin, 0.0, //
                0.0, -sin, cos, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
        } else if x == 0.0 && y != 0.0 && z == 0.0 {
            if y < 0.0 {
                sin = -sin;
            }
            self.elements = [
                cos, 0.0, -sin, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                sin, 0.0, cos, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
        } else if x == 0.0 && y == 0.0 && z != 0.0 {
            if z < 0.0 {
                sin = -sin;
            }
            self.elements = [
                cos, sin, 0.0, 0.0, //
                -sin, cos, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
        } else {
            let (mut x, mut y, mut z) = (x, y, z);
            let len = (x * x + y * y + z * z).sqrt();
            if len != 1.0 {
                let rlen = 1.0 / len;
                x *= rlen;
                y *= rlen;
                z *= rlen;
            }

            let nc = 1.0 - cos;
            let (xy, yz, zx) = (x * y, y * z, z * x);
            let (xs, ys, zs) = (x * sin, y * sin, z * sin);

            self.elements = [
                x * x * nc + cos,
                xy * nc + zs,
                zx * nc - ys,
                0.0,
                xy * nc - zs,
                y * y * nc + cos,
                yz * nc + xs,
                0.0,
                zx * nc + ys,
                yz * nc - xs,
                z * z * nc + cos,
                0.0,
                0.0,
                0.0,
                0.0,
                1.0,
            ];
        }

        self
    }

    pub fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) -> &mut Self {
        let mut m = Matrix4::identity();
        m.set_rotate(degrees, x, y, z);
        self.concat(&m)
    }

    // ── viewing ───────────────────────────────────────────────────────────

    /// View matrix looking from `eye` towards `center`.
    ///
    /// `up` parallel to the viewing direction is not checked and yields NaNs.
    pub fn set_look_at(&mut self, eye: &Vector3, center: &Vector3, up: &Vector3) -> &mut Self {
        let [eye_x, eye_y, eye_z] = eye.elements;
        let [center_x, center_y, center_z] = center.elements;
        let [up_x, up_y, up_z] = up.elements;

        let mut fx = center_x - eye_x;
        let mut fy = center_y - eye_y;
        let mut fz = center_z - eye_z;

        let rlf = 1.0 / (fx * fx + fy * fy + fz * fz).sqrt();
        fx *= rlf;
        fy *= rlf;
        fz *= rlf;

        // s = f x up
        let mut sx = fy * up_z - fz * up_y;
        let mut sy = fz * up_x - fx * up_z;
        let mut sz = fx * up_y - fy * up_x;

        let rls = 1.0 / (sx * sx + sy * sy + sz * sz).sqrt();
        sx *= rls;
        sy *= rls;
        sz *= rls;

        // u = s x f
        let ux = sy * fz - sz * fy;
        let uy = sz * fx - sx * fz;
        let uz = sx * fy - sy * fx;

        self.elements = [
            sx, ux, -fx, 0.0, //
            sy, uy, -fy, 0.0, //
            sz, uz, -fz, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];

        self.translate(-eye_x, -eye_y, -eye_z)
    }

    pub fn look_at(&mut self, eye: &Vector3, center: &Vector3, up: &Vector3) -> &mut Self {
        let mut m = Matrix4::identity();
        m.set_look_at(eye, center, up);
        self.concat(&m)
    }

    // ── shadows ───────────────────────────────────────────────────────────

    /// Post-multiplies a planar shadow projection.
    ///
    /// `plane` is `(a, b, c, d)` for `ax + by + cz + d = 0`; `light` is a homogeneous
    /// light position (`w = 0` for a directional light).
    pub fn drop_shadow(&mut self, plane: [f32; 4], light: [f32; 4]) -> &mut Self {
        let dot = plane[0] * light[0] + plane[1] * light[1] + plane[2] * light[2] + plane[3] * light[3];

        let mut m = Matrix4::identity();
        for col in 0..4 {
            for row in 0..4 {
                let diag = if row == col { dot } else { 0.0 };
                m.elements[col * 4 + row] = diag - light[row] * plane[col];
            }
        }

        self.concat(&m)
    }

    /// Planar shadow from a directional light.
    ///
    /// The plane passes through `point` with normal `normal`.
    pub fn drop_shadow_directionally(
        &mut self,
        normal: &Vector3,
        point: &Vector3,
        light: &Vector3,
    ) -> &mut Self {
        let [nx, ny, nz] = normal.elements;
        let [px, py, pz] = point.elements;
        let [lx, ly, lz] = light.elements;
        let a = px * nx + py * ny + pz * nz;
        self.drop_shadow([nx, ny, nz, -a], [lx, ly, lz, 0.0])
    }
}

impl Mul for &Matrix4 {
    type Output = Matrix4;

    #[inline]
    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        let mut out = *self;
        out.concat(rhs);
        out
    }
}

impl Mul<&Vector4> for &Matrix4 {
    type Output = Vector4;

    #[inline]
    fn mul(self, rhs: &Vector4) -> Vector4 {
        self.multiply_vector4(rhs)
    }
}

impl From<[f32; 16]> for Matrix4 {
    #[inline]
    fn from(elements: [f32; 16]) -> Self {
        Self { elements }
    }
}
