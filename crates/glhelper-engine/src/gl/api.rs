use std::fmt::Debug;

use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, DataType, DrawMode, IndexType, ShaderKind,
    TextureFilter,
};

/// The slice of the native graphics API the layer drives.
///
/// Methods mirror GL entry points one to one and never validate on their own;
/// policy (fail-fast checks, defaults, cleanup on failure) lives in
/// [`ResourceContext`](super::ResourceContext).
///
/// Implemented for `glow::Context` and for the software [`HeadlessGl`](super::HeadlessGl).
pub trait GlApi {
    type Shader: Copy + Debug + Eq;
    type Program: Copy + Debug + Eq;
    type Buffer: Copy + Debug + Eq;
    type Texture: Copy + Debug + Eq;
    type UniformLocation: Clone + Debug;

    // ── shaders / programs ────────────────────────────────────────────────

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    /// `None` when the program has no active attribute called `name`.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    /// `None` when the program has no active uniform called `name`.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;

    // ── buffers / attributes ──────────────────────────────────────────────

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: DataType,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&self, index: u32);

    // ── state ─────────────────────────────────────────────────────────────

    fn enable(&self, cap: Capability);
    fn disable(&self, cap: Capability);
    fn polygon_offset(&self, factor: f32, units: f32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: ClearMask);

    // ── uniforms ──────────────────────────────────────────────────────────

    fn uniform_matrix4(&self, location: &Self::UniformLocation, transpose: bool, data: &[f32; 16]);
    fn uniform_1i(&self, location: &Self::UniformLocation, x: i32);
    fn uniform_1f(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);

    // ── draws ─────────────────────────────────────────────────────────────

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
    fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: i32);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<Self::Texture, String>;
    /// `unit` is zero-based (`0` is `TEXTURE0`).
    fn active_texture(&self, unit: u32);
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    fn tex_min_filter_2d(&self, filter: TextureFilter);
    /// Uploads tightly packed RGBA8 rows, first row at the bottom.
    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]);
}
