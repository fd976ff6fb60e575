//! [`GlApi`] over a live `glow::Context` (desktop GL, GLES or WebGL).
//!
//! # Safety
//!
//! glow entry points are `unsafe` because they require a current context on the
//! calling thread. Whoever hands a `glow::Context` to a [`GlowSurface`](super::GlowSurface)
//! takes on that obligation for the lifetime of the renderer.

use glow::HasContext;

use super::api::GlApi;
use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, DataType, DrawMode, IndexType, ShaderKind,
    TextureFilter,
};

type Ctx = glow::Context;

impl GlApi for Ctx {
    type Shader = <Ctx as HasContext>::Shader;
    type Program = <Ctx as HasContext>::Program;
    type Buffer = <Ctx as HasContext>::Buffer;
    type Texture = <Ctx as HasContext>::Texture;
    type UniformLocation = <Ctx as HasContext>::UniformLocation;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, kind.to_gl()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target.to_gl(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.buffer_data_u8_slice(target.to_gl(), data, usage.to_gl()) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: DataType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.vertex_attrib_pointer_f32(index, size, data_type.to_gl(), normalized, stride, offset)
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn enable(&self, cap: Capability) {
        unsafe { HasContext::enable(self, cap.to_gl()) }
    }

    fn disable(&self, cap: Capability) {
        unsafe { HasContext::disable(self, cap.to_gl()) }
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        unsafe { HasContext::polygon_offset(self, factor, units) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { HasContext::clear_color(self, r, g, b, a) }
    }

    fn clear(&self, mask: ClearMask) {
        unsafe { HasContext::clear(self, mask.bits()) }
    }

    fn uniform_matrix4(&self, location: &Self::UniformLocation, transpose: bool, data: &[f32; 16]) {
        unsafe { self.uniform_matrix_4_f32_slice(Some(location), transpose, data) }
    }

    fn uniform_1i(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { self.uniform_1_i32(Some(location), x) }
    }

    fn uniform_1f(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { self.uniform_1_f32(Some(location), x) }
    }

    fn uniform_3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { self.uniform_3_f32(Some(location), x, y, z) }
    }

    fn uniform_4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe { self.uniform_4_f32(Some(location), x, y, z, w) }
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, mode.to_gl(), first, count) }
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: i32) {
        unsafe { HasContext::draw_elements(self, mode.to_gl(), count, index_type.to_gl(), offset) }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn tex_min_filter_2d(&self, filter: TextureFilter) {
        unsafe { self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter.to_gl()) }
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            )
        }
    }
}
