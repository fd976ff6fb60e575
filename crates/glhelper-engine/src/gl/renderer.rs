use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use bytemuck::Pod;

use crate::math::Matrix4;
use crate::stack::{StackRegistry, TransformStack};

use super::api::GlApi;
use super::buffer_object::{AttribLayout, BufferObject};
use super::error::GlError;
use super::resource::{RendererInit, ResourceContext};
use super::shader_object::{ShaderObject, ShaderSource};
use super::surface::Surface;
use super::texture::{DecodedImage, ImageFetcher, TextureLoader};
use super::types::TextureFilter;

/// Name of the model-matrix stack returned by [`RendererContext::matrix_stack`].
pub const MATRIX_STACK: &str = "matrixStack";

/// Texture upload parameters.
#[derive(Debug, Clone, Default)]
pub struct TextureConfig {
    pub url: String,
    /// Zero-based texture unit made active before binding.
    pub unit: u32,
    /// Value written to the sampler uniform.
    pub texture_unit: i32,
}

impl TextureConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }
}

/// Result of [`RendererContext::load_texture`].
pub struct LoadedTexture<G: GlApi> {
    pub image: Rc<DecodedImage>,
    pub texture: G::Texture,
}

impl<G: GlApi> fmt::Debug for LoadedTexture<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedTexture")
            .field("width", &self.image.width)
            .field("height", &self.image.height)
            .field("texture", &self.texture)
            .finish()
    }
}

/// Everything a demo needs for one surface: the base resource context, named
/// matrix stacks and the texture loader.
///
/// Derefs to [`ResourceContext`] for the raw resource operations.
pub struct RendererContext<G: GlApi> {
    base: ResourceContext<G>,
    stacks: StackRegistry<Matrix4>,
    textures: TextureLoader,
}

impl<G: GlApi> RendererContext<G> {
    pub fn new<S>(surface: &mut S) -> Result<Self, GlError>
    where
        S: Surface<Gl = G>,
    {
        Self::with_init(surface, RendererInit::default())
    }

    pub fn with_init<S>(surface: &mut S, init: RendererInit) -> Result<Self, GlError>
    where
        S: Surface<Gl = G>,
    {
        Ok(Self {
            base: ResourceContext::with_init(surface, init)?,
            stacks: StackRegistry::new(),
            textures: TextureLoader::default(),
        })
    }

    /// Replaces the texture loader (and its cache) with one backed by `fetcher`.
    pub fn with_fetcher(mut self, fetcher: impl ImageFetcher + 'static) -> Self {
        self.textures = TextureLoader::new(fetcher);
        self
    }

    #[inline]
    pub fn base(&self) -> &ResourceContext<G> {
        &self.base
    }

    /// The model-matrix stack of this context, created on first use.
    pub fn matrix_stack(&mut self) -> &mut TransformStack<Matrix4> {
        self.stacks.get(MATRIX_STACK)
    }

    /// All named matrix stacks of this context.
    pub fn stacks(&mut self) -> &mut StackRegistry<Matrix4> {
        &mut self.stacks
    }

    pub fn textures(&self) -> &TextureLoader {
        &self.textures
    }

    pub fn create_array_buffer_object<T: Pod>(&self, data: &[T]) -> Result<BufferObject<G>, GlError> {
        BufferObject::with_data(self.base.gl_rc(), data)
    }

    /// Uploads `vertices` and points attribute `location` at them as tightly
    /// packed floats with `size` components (default 3).
    pub fn create_vertex_array_buffer<T: Pod>(
        &self,
        location: u32,
        vertices: &[T],
        size: Option<i32>,
    ) -> Result<G::Buffer, GlError> {
        let object = self.create_array_buffer_object(vertices)?;
        object.use_buffer(location, AttribLayout::floats(size.unwrap_or(3)))?;
        object.buffer().ok_or(GlError::BufferNotCreated)
    }

    /// Compiles and links `source`, optionally making it the current program.
    pub fn create_shader_program(
        &self,
        source: ShaderSource,
        enable_program: bool,
    ) -> Result<ShaderObject<G>, GlError> {
        let linked = self.base.create_program(&source.vertex, &source.fragment)?;
        if enable_program {
            self.base.use_program(linked.program);
        }
        Ok(ShaderObject::new(self.base.gl_rc(), source, linked))
    }

    /// Loads `config.url` and uploads it as a 2D RGBA texture on `config.unit`,
    /// then points the sampler at `location` to `config.texture_unit`.
    pub async fn load_texture(
        &self,
        location: &G::UniformLocation,
        config: TextureConfig,
    ) -> Result<LoadedTexture<G>, GlError> {
        if config.url.is_empty() {
            return Err(GlError::MissingUrl);
        }

        let image = self.textures.load_image(&config.url).await?;

        let gl = self.base.gl();
        let texture = gl.create_texture().map_err(GlError::TextureCreation)?;
        gl.active_texture(config.unit);
        gl.bind_texture_2d(Some(texture));
        gl.tex_min_filter_2d(TextureFilter::Linear);
        gl.tex_image_2d_rgba(image.width, image.height, &image.pixels);
        gl.uniform_1i(location, config.texture_unit);

        log::debug!(
            "texture {texture:?} uploaded from {} ({}x{}) on unit {}",
            config.url,
            image.width,
            image.height,
            config.unit
        );
        Ok(LoadedTexture { image, texture })
    }

    /// [`load_texture`](Self::load_texture) driven to completion on the current thread.
    pub fn load_texture_blocking(
        &self,
        location: &G::UniformLocation,
        config: TextureConfig,
    ) -> Result<LoadedTexture<G>, GlError> {
        pollster::block_on(self.load_texture(location, config))
    }
}

impl<G: GlApi> Deref for RendererContext<G> {
    type Target = ResourceContext<G>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<G: GlApi> fmt::Debug for RendererContext<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererContext")
            .field("base", &self.base)
            .field("stacks", &self.stacks)
            .field("textures", &self.textures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::texture::tests::{png_2x2, MemoryFetcher};
    use crate::gl::{
        Capability, DrawMode, HeadlessGl, HeadlessSurface, IndexType, UniformValue,
    };
    use crate::math::Vector3;

    const CUBE_VS: &str = "\
attribute vec4 a_Position;
attribute vec4 a_Color;
uniform mat4 u_MvpMatrix;
varying vec4 v_Color;
void main() {
  gl_Position = u_MvpMatrix * a_Position;
  v_Color = a_Color;
}
";

    const CUBE_FS: &str = "\
varying vec4 v_Color;
void main() {
  gl_FragColor = v_Color;
}
";

    #[rustfmt::skip]
    const CUBE_VERTICES: [f32; 24] = [
         1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
         1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,
    ];

    #[rustfmt::skip]
    const CUBE_COLORS: [f32; 24] = [
        1.0, 1.0, 1.0,  1.0, 0.0, 1.0,  1.0, 0.0, 0.0,  1.0, 1.0, 0.0,
        0.0, 1.0, 0.0,  0.0, 1.0, 1.0,  0.0, 0.0, 1.0,  0.0, 0.0, 0.0,
    ];

    #[rustfmt::skip]
    const CUBE_INDICES: [u8; 36] = [
        0, 1, 2,  0, 2, 3,
        0, 3, 4,  0, 4, 5,
        0, 5, 6,  0, 6, 1,
        1, 6, 7,  1, 7, 2,
        7, 4, 3,  7, 3, 2,
        4, 7, 6,  4, 6, 5,
    ];

    fn renderer() -> (HeadlessSurface, RendererContext<HeadlessGl>) {
        let mut surface = HeadlessSurface::new(400, 400);
        let ctx = RendererContext::new(&mut surface).unwrap();
        (surface, ctx)
    }

    fn mvp(ctx: &RendererContext<HeadlessGl>) -> Matrix4 {
        let mut m = Matrix4::identity();
        m.set_perspective(30.0, ctx.width() / ctx.height(), 1.0, 100.0).unwrap();
        m.look_at(
            &Vector3::from_xyz(3.0, 3.0, 7.0),
            &Vector3::from_xyz(0.0, 0.0, 0.0),
            &Vector3::from_xyz(0.0, 1.0, 0.0),
        );
        m
    }

    #[test]
    fn draws_indexed_cube() {
        let (_surface, ctx) = renderer();
        let shader = ctx
            .create_shader_program(
                ShaderSource::new(CUBE_VS, CUBE_FS)
                    .attributes(["a_Position", "a_Color"])
                    .uniform("u_MvpMatrix"),
                true,
            )
            .unwrap();

        let a_position = shader.get_attribute_location("a_Position").unwrap().unwrap();
        let a_color = shader.get_attribute_location("a_Color").unwrap().unwrap();
        assert_ne!(a_position, a_color);

        ctx.create_vertex_array_buffer(a_position, &CUBE_VERTICES, Some(3)).unwrap();
        ctx.create_vertex_array_buffer(a_color, &CUBE_COLORS, None).unwrap();
        ctx.create_element_array_buffer(&CUBE_INDICES).unwrap();

        let u_mvp = shader.get_uniform_location("u_MvpMatrix").unwrap().unwrap();
        ctx.uniform_matrix4fv(&u_mvp, &mvp(&ctx));

        ctx.clear();
        ctx.draw_elements(DrawMode::Triangles, CUBE_INDICES.len() as i32, IndexType::UnsignedByte, 0);

        let gl = ctx.gl();
        assert!(gl.errors().is_empty(), "{:?}", gl.errors());
        assert_eq!(gl.draw_count(), 1);
        let draw = gl.draw_calls()[0];
        assert_eq!(draw.count, 36);
        assert!(draw.indexed);
        assert!(gl.is_enabled(Capability::DepthTest));
        assert_eq!(gl.uniform_value(&u_mvp), Some(UniformValue::Matrix4(mvp(&ctx).elements)));
    }

    #[test]
    fn draws_cube_with_short_indices() {
        let (_surface, ctx) = renderer();
        let shader = ctx
            .create_shader_program(ShaderSource::new(CUBE_VS, CUBE_FS).attribute("a_Position"), true)
            .unwrap();
        let a_position = shader.get_attribute_location("a_Position").unwrap().unwrap();

        ctx.create_vertex_array_buffer(a_position, &CUBE_VERTICES, None).unwrap();
        let indices: Vec<u16> = CUBE_INDICES.iter().map(|&i| u16::from(i)).collect();
        ctx.create_element_array_buffer(&indices).unwrap();

        // Second half of the cube only.
        ctx.draw_elements(DrawMode::Triangles, 18, IndexType::UnsignedShort, 36);
        assert!(ctx.gl().errors().is_empty(), "{:?}", ctx.gl().errors());
        assert_eq!(ctx.gl().draw_count(), 1);
    }

    #[test]
    fn matrix_stack_belongs_to_context() {
        let (_s1, mut a) = renderer();
        let (_s2, mut b) = renderer();

        let mut model = Matrix4::identity();
        a.matrix_stack().save(&model);
        model.translate(0.0, 5.0, 0.0);

        assert!(b.matrix_stack().restore().is_none());
        assert_eq!(a.matrix_stack().restore(), Some(Matrix4::identity()));
        assert!(a.stacks().contains(MATRIX_STACK));
    }

    #[test]
    fn texture_upload_sequence() {
        let (_surface, ctx) = renderer();
        let ctx = ctx.with_fetcher(MemoryFetcher::with("sky.png", png_2x2()));
        let fs = "uniform sampler2D u_Sampler;\nvoid main() {}\n";
        let shader = ctx
            .create_shader_program(ShaderSource::new(CUBE_VS, fs).uniform("u_Sampler"), true)
            .unwrap();
        let u_sampler = shader.get_uniform_location("u_Sampler").unwrap().unwrap();

        let config = TextureConfig { url: "sky.png".to_owned(), unit: 1, texture_unit: 1 };
        let loaded = ctx.load_texture_blocking(&u_sampler, config).unwrap();

        let gl = ctx.gl();
        assert!(gl.errors().is_empty(), "{:?}", gl.errors());
        assert_eq!(gl.active_texture_unit(), 1);
        assert_eq!(gl.bound_texture(), Some(loaded.texture));
        assert_eq!(gl.texture_size(loaded.texture), Some((2, 2)));
        assert_eq!(gl.texture_min_filter(loaded.texture), Some(TextureFilter::Linear));
        assert_eq!(gl.uniform_value(&u_sampler), Some(UniformValue::Int(1)));

        let calls = gl.calls();
        let pos = |name: &str| calls.iter().position(|c| *c == name).unwrap();
        assert!(pos("create_texture") < pos("active_texture"));
        assert!(pos("active_texture") < pos("bind_texture_2d"));
        assert!(pos("tex_min_filter_2d") < pos("tex_image_2d_rgba"));
    }

    #[test]
    fn texture_requires_url() {
        let (_surface, ctx) = renderer();
        let shader = ctx
            .create_shader_program(ShaderSource::new(CUBE_VS, CUBE_FS).uniform("u_MvpMatrix"), true)
            .unwrap();
        let loc = shader.get_uniform_location("u_MvpMatrix").unwrap().unwrap();

        let err = ctx.load_texture_blocking(&loc, TextureConfig::default()).unwrap_err();
        assert!(matches!(err, GlError::MissingUrl));
        assert!(!ctx.gl().calls().contains(&"create_texture"));
    }

    #[test]
    fn texture_fetch_failure_is_reported() {
        let (_surface, ctx) = renderer();
        let ctx = ctx.with_fetcher(MemoryFetcher::default());
        let shader = ctx
            .create_shader_program(ShaderSource::new(CUBE_VS, CUBE_FS).uniform("u_MvpMatrix"), true)
            .unwrap();
        let loc = shader.get_uniform_location("u_MvpMatrix").unwrap().unwrap();

        let err = ctx.load_texture_blocking(&loc, TextureConfig::new("gone.png")).unwrap_err();
        assert!(matches!(err, GlError::Texture(_)));
    }
}
