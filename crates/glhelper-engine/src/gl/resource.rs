use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytemuck::Pod;

use crate::coords::Viewport;
use crate::math::{Matrix4, Vector3, Vector4};

use super::api::GlApi;
use super::error::GlError;
use super::surface::{Surface, RENDERER_ID_ATTRIBUTE};
use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, DrawMode, IndexType, ShaderKind,
};

/// Prepended to every fragment shader so GLES/WebGL sources get a default float precision.
pub const FRAGMENT_PRECISION_PREAMBLE: &str = "#ifdef GL_ES\nprecision mediump float;\n#endif\n";

static NEXT_RENDERER_ID: AtomicUsize = AtomicUsize::new(0);

/// Initialization options for a [`ResourceContext`].
#[derive(Debug, Clone)]
pub struct RendererInit {
    /// Enable hidden surface removal right away.
    pub depth_test: bool,

    /// Clear color and depth once the context is up.
    pub clear_on_init: bool,

    /// Prefix fragment sources with [`FRAGMENT_PRECISION_PREAMBLE`].
    ///
    /// Turn off for desktop GLSL versions that reject a `precision` statement
    /// before `#version`.
    pub precision_preamble: bool,
}

impl Default for RendererInit {
    fn default() -> Self {
        Self { depth_test: true, clear_on_init: true, precision_preamble: true }
    }
}

/// Handles produced by a successful link.
pub struct LinkedProgram<G: GlApi> {
    pub program: G::Program,
    pub vertex_shader: G::Shader,
    pub fragment_shader: G::Shader,
}

impl<G: GlApi> Clone for LinkedProgram<G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GlApi> Copy for LinkedProgram<G> {}

impl<G: GlApi> fmt::Debug for LinkedProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedProgram")
            .field("program", &self.program)
            .field("vertex_shader", &self.vertex_shader)
            .field("fragment_shader", &self.fragment_shader)
            .finish()
    }
}

// ── shared helpers ────────────────────────────────────────────────────────────
//
// Free functions so buffer and shader objects can call them with only a GL handle.

pub(crate) fn attrib_location<G: GlApi>(
    gl: &G,
    program: G::Program,
    name: &str,
) -> Result<u32, GlError> {
    gl.attrib_location(program, name).ok_or_else(|| GlError::AttribNotFound(name.to_owned()))
}

pub(crate) fn uniform_location<G: GlApi>(
    gl: &G,
    program: G::Program,
    name: &str,
) -> Result<G::UniformLocation, GlError> {
    gl.uniform_location(program, name).ok_or_else(|| GlError::UniformNotFound(name.to_owned()))
}

/// Creates a buffer, binds it to `target` and uploads `data`. The buffer stays bound.
pub(crate) fn upload_buffer<G: GlApi, T: Pod>(
    gl: &G,
    data: &[T],
    target: BufferTarget,
    usage: BufferUsage,
) -> Result<G::Buffer, GlError> {
    let buffer = gl.create_buffer().map_err(GlError::BufferCreation)?;
    gl.bind_buffer(target, Some(buffer));
    gl.buffer_data(target, bytemuck::cast_slice(data), usage);
    log::debug!(
        "buffer {buffer:?} created: {target:?} {} bytes {usage:?}",
        std::mem::size_of_val(data)
    );
    Ok(buffer)
}

// ── capability toggles ────────────────────────────────────────────────────────

/// `enable`/`disable` pair for the depth test.
pub struct DepthTest<'a, G: GlApi> {
    gl: &'a G,
}

impl<G: GlApi> DepthTest<'_, G> {
    pub fn enable(&self) {
        self.gl.enable(Capability::DepthTest);
    }

    pub fn disable(&self) {
        self.gl.disable(Capability::DepthTest);
    }
}

/// Polygon offset toggles. The plain forms act on fill mode.
pub struct PolygonOffset<'a, G: GlApi> {
    gl: &'a G,
}

impl<G: GlApi> PolygonOffset<'_, G> {
    pub fn enable(&self) {
        self.enable_mode(Capability::PolygonOffsetFill);
    }

    pub fn disable(&self) {
        self.disable_mode(Capability::PolygonOffsetFill);
    }

    /// `mode` is one of the `PolygonOffset*` capabilities.
    pub fn enable_mode(&self, mode: Capability) {
        self.gl.enable(mode);
    }

    pub fn disable_mode(&self, mode: Capability) {
        self.gl.disable(mode);
    }

    pub fn offset(&self, factor: f32, units: f32) {
        self.gl.polygon_offset(factor, units);
    }
}

// ── context ───────────────────────────────────────────────────────────────────

/// Owns the graphics handle of one surface and wraps the raw API with
/// fail-fast resource creation.
pub struct ResourceContext<G: GlApi> {
    gl: Rc<G>,
    viewport: Viewport,
    id: usize,
    precision_preamble: bool,
}

impl<G: GlApi> ResourceContext<G> {
    pub fn new<S>(surface: &mut S) -> Result<Self, GlError>
    where
        S: Surface<Gl = G>,
    {
        Self::with_init(surface, RendererInit::default())
    }

    /// Empties and tags `surface`, creates its context, captures the size, then
    /// applies `init`.
    ///
    /// A surface that cannot produce a context, or whose size does not fit a
    /// viewport, is rejected before it is modified.
    ///
    /// Every call takes a fresh id from a process-wide counter, re-initializing
    /// the same surface included.
    pub fn with_init<S>(surface: &mut S, init: RendererInit) -> Result<Self, GlError>
    where
        S: Surface<Gl = G>,
    {
        if !surface.context_available() {
            return Err(GlError::ContextUnavailable("context creation refused".to_owned()));
        }
        let (width, height) = surface.size();
        let (Ok(viewport_w), Ok(viewport_h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(GlError::InvalidSurfaceSize { width, height });
        };

        let id = NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed) + 1;

        surface.clear_children();
        surface.set_attribute(RENDERER_ID_ATTRIBUTE, &format!("renderer-{id}"));
        let gl = surface
            .create_gl(&format!("canvas-{id}"))
            .map_err(GlError::ContextUnavailable)?;

        gl.viewport(0, 0, viewport_w, viewport_h);

        let ctx = Self {
            gl: Rc::new(gl),
            viewport: Viewport::new(width as f32, height as f32),
            id,
            precision_preamble: init.precision_preamble,
        };

        if init.depth_test {
            ctx.depth_test().enable();
        }
        if init.clear_on_init {
            ctx.clear();
        }

        log::debug!("renderer-{id} initialized: {width}x{height}");
        Ok(ctx)
    }

    #[inline]
    pub fn gl(&self) -> &G {
        &self.gl
    }

    /// Shared handle for objects that outlive a borrow of the context.
    #[inline]
    pub fn gl_rc(&self) -> Rc<G> {
        Rc::clone(&self.gl)
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.viewport.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.viewport.height
    }

    pub fn depth_test(&self) -> DepthTest<'_, G> {
        DepthTest { gl: &self.gl }
    }

    pub fn polygon_offset(&self) -> PolygonOffset<'_, G> {
        PolygonOffset { gl: &self.gl }
    }

    /// Clears to opaque black, color and depth.
    pub fn clear(&self) {
        self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
        self.gl.clear(ClearMask::COLOR | ClearMask::DEPTH);
    }

    // ── shaders / programs ────────────────────────────────────────────────

    /// Compiles one stage. A failed compile deletes the shader and reports the
    /// info log together with the offending source.
    pub fn create_shader(&self, kind: ShaderKind, source: &str) -> Result<G::Shader, GlError> {
        let shader = self.gl.create_shader(kind).map_err(GlError::ShaderCreation)?;
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);

        if !self.gl.shader_compile_status(shader) {
            let log = self.gl.shader_info_log(shader);
            self.gl.delete_shader(shader);
            return Err(GlError::ShaderCompile { kind, log, source: source.to_owned() });
        }

        log::debug!("{kind:?} shader {shader:?} compiled");
        Ok(shader)
    }

    /// Compiles both stages and links them. On link failure the program and both
    /// shaders are deleted.
    pub fn create_program(&self, vertex: &str, fragment: &str) -> Result<LinkedProgram<G>, GlError> {
        let vertex_shader = self.create_shader(ShaderKind::Vertex, vertex)?;

        let fragment_shader = if self.precision_preamble {
            let source = format!("{FRAGMENT_PRECISION_PREAMBLE}{fragment}");
            self.create_shader(ShaderKind::Fragment, &source)
        } else {
            self.create_shader(ShaderKind::Fragment, fragment)
        };
        let fragment_shader = match fragment_shader {
            Ok(shader) => shader,
            Err(e) => {
                self.gl.delete_shader(vertex_shader);
                return Err(e);
            }
        };

        let program = match self.gl.create_program() {
            Ok(program) => program,
            Err(msg) => {
                self.gl.delete_shader(vertex_shader);
                self.gl.delete_shader(fragment_shader);
                return Err(GlError::ProgramCreation(msg));
            }
        };

        self.gl.attach_shader(program, vertex_shader);
        self.gl.attach_shader(program, fragment_shader);
        self.gl.link_program(program);

        if !self.gl.program_link_status(program) {
            let log = self.gl.program_info_log(program);
            self.gl.delete_program(program);
            self.gl.delete_shader(vertex_shader);
            self.gl.delete_shader(fragment_shader);
            return Err(GlError::ProgramLink { log });
        }

        log::debug!("program {program:?} linked");
        Ok(LinkedProgram { program, vertex_shader, fragment_shader })
    }

    pub fn use_program(&self, program: G::Program) {
        self.gl.use_program(Some(program));
    }

    pub fn get_attrib_location(&self, program: G::Program, name: &str) -> Result<u32, GlError> {
        attrib_location(self.gl(), program, name)
    }

    pub fn get_uniform_location(
        &self,
        program: G::Program,
        name: &str,
    ) -> Result<G::UniformLocation, GlError> {
        uniform_location(self.gl(), program, name)
    }

    // ── buffers ───────────────────────────────────────────────────────────

    /// Uploads `data`. `target` defaults to the array target and `usage` to static draw.
    pub fn create_buffer<T: Pod>(
        &self,
        data: &[T],
        target: Option<BufferTarget>,
        usage: Option<BufferUsage>,
    ) -> Result<G::Buffer, GlError> {
        upload_buffer(self.gl(), data, target.unwrap_or_default(), usage.unwrap_or_default())
    }

    pub fn create_array_buffer<T: Pod>(&self, data: &[T]) -> Result<G::Buffer, GlError> {
        self.create_buffer(data, Some(BufferTarget::Array), Some(BufferUsage::StaticDraw))
    }

    pub fn create_element_array_buffer<T: Pod>(&self, data: &[T]) -> Result<G::Buffer, GlError> {
        self.create_buffer(data, Some(BufferTarget::ElementArray), Some(BufferUsage::StaticDraw))
    }

    pub fn unbind_array_buffer(&self) {
        self.gl.bind_buffer(BufferTarget::Array, None);
    }

    pub fn unbind_element_array_buffer(&self) {
        self.gl.bind_buffer(BufferTarget::ElementArray, None);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    pub fn uniform_matrix4fv(&self, location: &G::UniformLocation, matrix: &Matrix4) {
        self.gl.uniform_matrix4(location, false, &matrix.elements);
    }

    pub fn uniform1i(&self, location: &G::UniformLocation, x: i32) {
        self.gl.uniform_1i(location, x);
    }

    pub fn uniform1f(&self, location: &G::UniformLocation, x: f32) {
        self.gl.uniform_1f(location, x);
    }

    pub fn uniform3f(&self, location: &G::UniformLocation, x: f32, y: f32, z: f32) {
        self.gl.uniform_3f(location, x, y, z);
    }

    pub fn uniform4f(&self, location: &G::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.gl.uniform_4f(location, x, y, z, w);
    }

    pub fn uniform3fv(&self, location: &G::UniformLocation, v: &Vector3) {
        let [x, y, z] = v.elements;
        self.gl.uniform_3f(location, x, y, z);
    }

    pub fn uniform4fv(&self, location: &G::UniformLocation, v: &Vector4) {
        let [x, y, z, w] = v.elements;
        self.gl.uniform_4f(location, x, y, z, w);
    }

    // ── draws ─────────────────────────────────────────────────────────────

    pub fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.gl.draw_arrays(mode, first, count);
    }

    /// `offset` is in bytes into the bound element buffer.
    pub fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: i32) {
        self.gl.draw_elements(mode, count, index_type, offset);
    }
}

impl<G: GlApi> fmt::Debug for ResourceContext<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContext")
            .field("id", &self.id)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{HeadlessGl, HeadlessSurface, CANVAS_ID_ATTRIBUTE};

    const VS: &str = "attribute vec4 a_Position;\nuniform mat4 u_ModelMatrix;\nvoid main() {\n  gl_Position = u_ModelMatrix * a_Position;\n}\n";
    const FS: &str = "uniform vec4 u_FragColor;\nvoid main() {\n  gl_FragColor = u_FragColor;\n}\n";

    fn context() -> (HeadlessSurface, ResourceContext<HeadlessGl>) {
        let mut surface = HeadlessSurface::new(400, 300);
        let ctx = ResourceContext::new(&mut surface).unwrap();
        (surface, ctx)
    }

    #[test]
    fn init_tags_surface_and_canvas() {
        let (surface, ctx) = context();
        let id = ctx.id();

        assert_eq!(surface.attribute(RENDERER_ID_ATTRIBUTE), Some(format!("renderer-{id}").as_str()));
        assert_eq!(surface.children().len(), 1);
        assert_eq!(
            surface.children()[0].attributes.get(CANVAS_ID_ATTRIBUTE),
            Some(&format!("canvas-{id}"))
        );
        assert_eq!(ctx.width(), 400.0);
        assert_eq!(ctx.height(), 300.0);
    }

    #[test]
    fn init_enables_depth_and_clears() {
        let (_surface, ctx) = context();
        assert!(ctx.gl().is_enabled(Capability::DepthTest));
        assert_eq!(ctx.gl().clears(), vec![ClearMask::COLOR | ClearMask::DEPTH]);
        assert_eq!(ctx.gl().clear_color_value(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn reinit_replaces_canvas_with_fresh_id() {
        let mut surface = HeadlessSurface::new(10, 10);
        let first = ResourceContext::new(&mut surface).unwrap();
        let second = ResourceContext::new(&mut surface).unwrap();

        assert!(second.id() > first.id());
        assert_eq!(surface.children().len(), 1);
        assert_eq!(
            surface.attribute(RENDERER_ID_ATTRIBUTE),
            Some(format!("renderer-{}", second.id()).as_str())
        );
    }

    #[test]
    fn init_options_are_honoured() {
        let mut surface = HeadlessSurface::new(10, 10);
        let init = RendererInit { depth_test: false, clear_on_init: false, ..Default::default() };
        let ctx = ResourceContext::with_init(&mut surface, init).unwrap();

        assert!(!ctx.gl().is_enabled(Capability::DepthTest));
        assert!(ctx.gl().clears().is_empty());
    }

    #[test]
    fn lost_context_is_an_error() {
        let mut surface = HeadlessSurface::new(10, 10).with_context_lost();
        let err = ResourceContext::new(&mut surface).unwrap_err();
        assert!(matches!(err, GlError::ContextUnavailable(_)));
    }

    #[test]
    fn failed_reinit_leaves_surface_as_tagged() {
        let mut surface = HeadlessSurface::new(10, 10);
        let ctx = ResourceContext::new(&mut surface).unwrap();
        let tag = format!("renderer-{}", ctx.id());

        let mut surface = surface.with_context_lost();
        let err = ResourceContext::new(&mut surface).unwrap_err();

        assert!(matches!(err, GlError::ContextUnavailable(_)));
        assert_eq!(surface.attribute(RENDERER_ID_ATTRIBUTE), Some(tag.as_str()));
        assert_eq!(surface.children().len(), 1);
    }

    #[test]
    fn oversized_surface_is_rejected_untouched() {
        let mut surface = HeadlessSurface::new(u32::MAX, 10);
        let err = ResourceContext::new(&mut surface).unwrap_err();

        assert!(matches!(err, GlError::InvalidSurfaceSize { width: u32::MAX, height: 10 }));
        assert!(err.to_string().contains("4294967295x10"));
        assert!(surface.attribute(RENDERER_ID_ATTRIBUTE).is_none());
        assert!(surface.children().is_empty());
    }

    #[test]
    fn compile_failure_carries_log_and_source() {
        let (_surface, ctx) = context();
        let err = ctx.create_shader(ShaderKind::Vertex, "not glsl").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Vertex"), "{message}");
        assert!(message.contains("not glsl"), "{message}");
        match err {
            GlError::ShaderCompile { kind, log, source } => {
                assert_eq!(kind, ShaderKind::Vertex);
                assert!(!log.is_empty());
                assert_eq!(source, "not glsl");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.gl().live_shaders(), 0);
    }

    #[test]
    fn program_links_with_preamble() {
        let (_surface, ctx) = context();
        let linked = ctx.create_program(VS, FS).unwrap();
        ctx.use_program(linked.program);

        assert_eq!(ctx.gl().current_program(), Some(linked.program));
        assert_eq!(ctx.get_attrib_location(linked.program, "a_Position").unwrap(), 0);
        assert!(ctx.get_uniform_location(linked.program, "u_FragColor").is_ok());
    }

    #[test]
    fn missing_locations_are_errors() {
        let (_surface, ctx) = context();
        let linked = ctx.create_program(VS, FS).unwrap();

        let err = ctx.get_attrib_location(linked.program, "a_Missing").unwrap_err();
        assert!(matches!(err, GlError::AttribNotFound(ref n) if n == "a_Missing"));
        let err = ctx.get_uniform_location(linked.program, "u_Missing").unwrap_err();
        assert!(matches!(err, GlError::UniformNotFound(ref n) if n == "u_Missing"));
    }

    #[test]
    fn link_failure_cleans_up_everything() {
        let (_surface, ctx) = context();
        let fs = "varying vec4 v_Color;\nvoid main() {\n  gl_FragColor = v_Color;\n}\n";

        let err = ctx.create_program(VS, fs).unwrap_err();
        match err {
            GlError::ProgramLink { log } => assert!(log.contains("v_Color")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.gl().live_shaders(), 0);
        assert_eq!(ctx.gl().live_programs(), 0);
    }

    #[test]
    fn fragment_compile_failure_releases_vertex_shader() {
        let (_surface, ctx) = context();
        let err = ctx.create_program(VS, "uniform vec4 u;").unwrap_err();

        assert!(matches!(err, GlError::ShaderCompile { kind: ShaderKind::Fragment, .. }));
        assert_eq!(ctx.gl().live_shaders(), 0);
    }

    #[test]
    fn buffers_default_to_static_array() {
        let (_surface, ctx) = context();
        let buffer = ctx.create_buffer(&[0.0f32, 0.5, -0.5], None, None).unwrap();

        assert_eq!(ctx.gl().bound_buffer(BufferTarget::Array), Some(buffer));
        assert_eq!(ctx.gl().buffer_contents(buffer).unwrap().len(), 12);

        ctx.unbind_array_buffer();
        assert_eq!(ctx.gl().bound_buffer(BufferTarget::Array), None);
    }

    #[test]
    fn element_buffer_binds_element_target() {
        let (_surface, ctx) = context();
        let buffer = ctx.create_element_array_buffer(&[0u16, 1, 2]).unwrap();
        assert_eq!(ctx.gl().bound_buffer(BufferTarget::ElementArray), Some(buffer));

        ctx.unbind_element_array_buffer();
        assert_eq!(ctx.gl().bound_buffer(BufferTarget::ElementArray), None);
    }

    #[test]
    fn buffer_allocation_failure() {
        let (_surface, ctx) = context();
        ctx.gl().set_allocation_failure(true);
        let err = ctx.create_array_buffer(&[1.0f32]).unwrap_err();
        assert!(matches!(err, GlError::BufferCreation(_)));
    }

    #[test]
    fn polygon_offset_toggles() {
        let (_surface, ctx) = context();
        ctx.polygon_offset().enable();
        ctx.polygon_offset().offset(1.0, 1.0);
        assert!(ctx.gl().is_enabled(Capability::PolygonOffsetFill));
        assert_eq!(ctx.gl().polygon_offset_params(), (1.0, 1.0));

        ctx.polygon_offset().enable_mode(Capability::PolygonOffsetLine);
        ctx.polygon_offset().disable();
        assert!(!ctx.gl().is_enabled(Capability::PolygonOffsetFill));
        assert!(ctx.gl().is_enabled(Capability::PolygonOffsetLine));

        ctx.depth_test().disable();
        assert!(!ctx.gl().is_enabled(Capability::DepthTest));
    }

    #[test]
    fn uniform_helpers_upload_column_major() {
        let (_surface, ctx) = context();
        let linked = ctx.create_program(VS, FS).unwrap();
        ctx.use_program(linked.program);

        let mut m = Matrix4::identity();
        m.translate(1.0, 2.0, 3.0);
        let loc = ctx.get_uniform_location(linked.program, "u_ModelMatrix").unwrap();
        ctx.uniform_matrix4fv(&loc, &m);

        assert_eq!(
            ctx.gl().uniform_value(&loc),
            Some(crate::gl::UniformValue::Matrix4(m.elements))
        );

        let color = ctx.get_uniform_location(linked.program, "u_FragColor").unwrap();
        ctx.uniform4fv(&color, &Vector4::from_xyzw(1.0, 0.5, 0.0, 1.0));
        assert_eq!(
            ctx.gl().uniform_value(&color),
            Some(crate::gl::UniformValue::Floats(vec![1.0, 0.5, 0.0, 1.0]))
        );
        assert!(ctx.gl().errors().is_empty());
    }
}
