//! Multi-segment jointed arm: base, two arm segments, a palm and two fingers.
//!
//! One model matrix is carried down the hierarchy with incremental
//! translate/rotate calls. The fingers are siblings, so the palm transform is
//! saved on the context's matrix stack before the first finger and restored for
//! the second.

use anyhow::{ensure, Context, Result};
use glhelper_engine::gl::{
    AttribLayout, DrawMode, GlApi, IndexType, RendererContext, ShaderObject, ShaderSource,
    UseBufferExecutor,
};
use glhelper_engine::math::{angle, Matrix4, Vector3};

const VERTEX_SHADER: &str = "\
attribute vec4 a_Position;
attribute vec4 a_Normal;
uniform mat4 u_MvpMatrix;
uniform mat4 u_NormalMatrix;
varying vec4 v_Color;
void main() {
  gl_Position = u_MvpMatrix * a_Position;
  vec3 lightDirection = normalize(vec3(0.0, 0.5, 0.7));
  vec4 color = vec4(1.0, 0.4, 0.0, 1.0);
  vec3 normal = normalize((u_NormalMatrix * a_Normal).xyz);
  float nDotL = max(dot(normal, lightDirection), 0.0);
  v_Color = vec4(color.rgb * nDotL + vec3(0.1), color.a);
}
";

const FRAGMENT_SHADER: &str = "\
varying vec4 v_Color;
void main() {
  gl_FragColor = v_Color;
}
";

const BASE_HEIGHT: f32 = 2.0;
const ARM1_LENGTH: f32 = 10.0;
const ARM2_LENGTH: f32 = 10.0;
const PALM_LENGTH: f32 = 2.0;

// ── geometry ──────────────────────────────────────────────────────────────────

/// Box spanning `y = 0..height`, centred on the y axis, 4 vertices per face.
///
/// Face order: front, right, up, left, down, back.
pub fn box_vertices(width: f32, height: f32, depth: f32) -> Vec<f32> {
    let (x, z) = (width / 2.0, depth / 2.0);
    let v = [
        [x, height, z],   // v0
        [-x, height, z],  // v1
        [-x, 0.0, z],     // v2
        [x, 0.0, z],      // v3
        [x, 0.0, -z],     // v4
        [x, height, -z],  // v5
        [-x, height, -z], // v6
        [-x, 0.0, -z],    // v7
    ];
    let faces = [[0, 1, 2, 3], [0, 3, 4, 5], [0, 5, 6, 1], [1, 6, 7, 2], [7, 4, 3, 2], [4, 7, 6, 5]];
    faces.iter().flat_map(|face| face.iter().flat_map(|&i| v[i])).collect()
}

pub fn box_normals() -> Vec<f32> {
    let normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, -1.0],
    ];
    normals.iter().flat_map(|n| std::iter::repeat_n(*n, 4).flatten()).collect()
}

/// Two triangles per face.
pub fn box_indices() -> Vec<u8> {
    (0..6u8).flat_map(|f| [0, 1, 2, 0, 2, 3].map(|i| f * 4 + i)).collect()
}

// ── animation state ───────────────────────────────────────────────────────────

/// Joint angles in degrees plus the base position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArmPose {
    pub rotate_arm1: f32,
    pub rotate_joint1: f32,
    pub rotate_joint2: f32,
    pub rotate_finger: f32,
    pub base: [f32; 3],
    step: f32,
    count: f32,
}

impl Default for ArmPose {
    fn default() -> Self {
        Self {
            rotate_arm1: 90.0,
            rotate_joint1: 45.0,
            rotate_joint2: 0.0,
            rotate_finger: 0.0,
            base: [0.0, -12.0, 0.0],
            step: 1.5,
            count: 0.0,
        }
    }
}

impl ArmPose {
    /// Moves every joint one animation step along its cycle.
    pub fn advance(&mut self) {
        self.count += self.step;
        if self.count > 360.0 {
            self.count = 0.0;
        }
        let rad = angle::to_radians(self.count);
        self.rotate_arm1 = self.count;
        self.rotate_joint1 = rad.sin() * 135.0;
        self.rotate_joint2 = self.count;
        self.rotate_finger = rad.cos() * 60.0;
    }
}

// ── scene ─────────────────────────────────────────────────────────────────────

struct Segments {
    base: UseBufferExecutor,
    arm1: UseBufferExecutor,
    arm2: UseBufferExecutor,
    palm: UseBufferExecutor,
    finger: UseBufferExecutor,
}

pub struct ArmScene<G: GlApi> {
    ctx: RendererContext<G>,
    // Kept alive for its program handle.
    _shader: ShaderObject<G>,
    u_mvp: G::UniformLocation,
    u_normal: G::UniformLocation,
    segments: Segments,
    index_count: i32,
    view_proj: Matrix4,
    model: Matrix4,
}

impl<G: GlApi + 'static> ArmScene<G> {
    pub fn new(ctx: RendererContext<G>) -> Result<Self> {
        let source = ShaderSource::new(VERTEX_SHADER, FRAGMENT_SHADER)
            .attributes(["a_Position", "a_Normal"])
            .uniforms(["u_MvpMatrix", "u_NormalMatrix"]);
        let shader = ctx.create_shader_program(source, true).context("arm shader program")?;

        let a_position = shader.get_attribute_location("a_Position")?.context("a_Position")?;
        let a_normal = shader.get_attribute_location("a_Normal")?.context("a_Normal")?;
        let u_mvp = shader.get_uniform_location("u_MvpMatrix")?.context("u_MvpMatrix")?;
        let u_normal = shader.get_uniform_location("u_NormalMatrix")?.context("u_NormalMatrix")?;

        // Normals and indices are shared by every box; positions differ per segment.
        ctx.create_vertex_array_buffer(a_normal, &box_normals(), Some(3))?;
        let indices = box_indices();
        ctx.create_element_array_buffer(&indices)?;

        let segment = |w: f32, h: f32, d: f32| -> Result<UseBufferExecutor> {
            let object = ctx.create_array_buffer_object(&box_vertices(w, h, d))?;
            Ok(object.create_use_buffer_executor(a_position, AttribLayout::floats(3)))
        };
        let segments = Segments {
            base: segment(10.0, BASE_HEIGHT, 10.0)?,
            arm1: segment(3.0, ARM1_LENGTH, 3.0)?,
            arm2: segment(4.0, ARM2_LENGTH, 4.0)?,
            palm: segment(2.0, PALM_LENGTH, 6.0)?,
            finger: segment(1.0, 2.0, 1.0)?,
        };

        let mut view_proj = Matrix4::identity();
        view_proj
            .set_perspective(50.0, ctx.viewport().aspect(), 0.1, 100.0)
            .context("arm projection")?
            .look_at(
                &Vector3::from_xyz(20.0, 10.0, 30.0),
                &Vector3::from_xyz(0.0, 0.0, 0.0),
                &Vector3::from_xyz(0.0, 1.0, 0.0),
            );

        Ok(Self {
            ctx,
            _shader: shader,
            u_mvp,
            u_normal,
            segments,
            index_count: indices.len() as i32,
            view_proj,
            model: Matrix4::identity(),
        })
    }

    pub fn context(&self) -> &RendererContext<G> {
        &self.ctx
    }

    /// Clears and draws the six segments for `pose`.
    pub fn draw(&mut self, pose: &ArmPose) -> Result<()> {
        self.ctx.clear();

        let [tx, ty, tz] = pose.base;
        self.model.set_translate(tx, ty, tz);
        self.draw_segment(&self.segments.base)?;

        self.model.translate(0.0, BASE_HEIGHT, 0.0).rotate(pose.rotate_arm1, 0.0, 1.0, 0.0);
        self.draw_segment(&self.segments.arm1)?;

        self.model.translate(0.0, ARM1_LENGTH, 0.0).rotate(pose.rotate_joint1, 0.0, 0.0, 1.0);
        self.draw_segment(&self.segments.arm2)?;

        self.model.translate(0.0, ARM2_LENGTH, 0.0).rotate(pose.rotate_joint2, 0.0, 1.0, 0.0);
        self.draw_segment(&self.segments.palm)?;

        self.model.translate(0.0, PALM_LENGTH, 0.0);

        let model = self.model;
        ensure!(self.ctx.matrix_stack().save(&model), "matrix stack save failed");
        self.model.translate(0.0, 0.0, 2.0).rotate(pose.rotate_finger, 1.0, 0.0, 0.0);
        self.draw_segment(&self.segments.finger)?;
        self.model = self.ctx.matrix_stack().restore().context("matrix stack underflow")?;

        self.model.translate(0.0, 0.0, -2.0).rotate(-pose.rotate_finger, 1.0, 0.0, 0.0);
        self.draw_segment(&self.segments.finger)?;
        Ok(())
    }

    fn draw_segment(&self, use_buffer: &UseBufferExecutor) -> Result<()> {
        use_buffer()?;

        let mut mvp = self.view_proj;
        mvp.multiply(&self.model);
        self.ctx.uniform_matrix4fv(&self.u_mvp, &mvp);

        let mut normal = Matrix4::identity();
        normal.set_inverse_of(&self.model).transpose();
        self.ctx.uniform_matrix4fv(&self.u_normal, &normal);

        self.ctx.draw_elements(DrawMode::Triangles, self.index_count, IndexType::UnsignedByte, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glhelper_engine::gl::{HeadlessGl, HeadlessSurface, MATRIX_STACK};

    use super::*;

    fn scene() -> ArmScene<HeadlessGl> {
        let mut surface = HeadlessSurface::new(800, 600);
        ArmScene::new(RendererContext::new(&mut surface).unwrap()).unwrap()
    }

    #[test]
    fn box_geometry_is_consistent() {
        assert_eq!(box_vertices(1.0, 2.0, 3.0).len(), 72);
        assert_eq!(box_normals().len(), 72);
        let indices = box_indices();
        assert_eq!(indices.len(), 36);
        assert_eq!(indices.iter().max(), Some(&23));
    }

    #[test]
    fn frame_draws_six_segments_cleanly() {
        let mut scene = scene();
        scene.draw(&ArmPose::default()).unwrap();

        let gl = scene.context().gl();
        assert!(gl.errors().is_empty(), "{:?}", gl.errors());
        assert_eq!(gl.draw_count(), 6);
        assert!(gl.draw_calls().iter().all(|d| d.count == 36 && d.indexed));
    }

    #[test]
    fn matrix_stack_is_balanced_after_a_frame() {
        let mut scene = scene();
        let mut pose = ArmPose::default();
        for _ in 0..3 {
            pose.advance();
            scene.draw(&pose).unwrap();
        }
        assert!(scene.ctx.matrix_stack().is_empty());
    }

    #[test]
    fn failed_stack_save_aborts_the_frame() {
        let mut surface = HeadlessSurface::new(800, 600);
        let mut ctx = RendererContext::new(&mut surface).unwrap();
        ctx.stacks().get_with(MATRIX_STACK, |_| Err(anyhow::anyhow!("snapshot refused")));
        let mut scene = ArmScene::new(ctx).unwrap();

        let err = scene.draw(&ArmPose::default()).unwrap_err();
        assert!(err.to_string().contains("matrix stack save failed"));
        // Base, arm1, arm2 and palm were drawn before the fingers.
        assert_eq!(scene.context().gl().draw_count(), 4);
    }

    #[test]
    fn pose_cycle_wraps() {
        let mut pose = ArmPose::default();
        for _ in 0..241 {
            pose.advance();
        }
        // 240 steps of 1.5 reach 360; the next step passes it and wraps.
        assert_eq!(pose.rotate_arm1, 0.0);
        assert_eq!(pose.rotate_finger, 60.0);
    }
}
