//! GL resource layer.
//!
//! Layout:
//! - `api`: the [`GlApi`] seam, implemented for `glow::Context` and [`HeadlessGl`]
//! - `surface`: the container a renderer draws into
//! - `resource`: [`ResourceContext`], fail-fast shader/program/buffer helpers
//! - `shader_object` / `buffer_object`: thin stateful wrappers over one program / buffer
//! - `texture`: image fetch, decode and cache
//! - `renderer`: the [`RendererContext`] facade most callers use
//!
//! Everything here is single-threaded: handles are shared with `Rc` and the
//! headless backend uses interior mutability.

mod api;
mod buffer_object;
mod error;
mod glow_backend;
mod headless;
mod renderer;
mod resource;
mod shader_object;
mod surface;
mod texture;
mod types;

pub use api::GlApi;
pub use buffer_object::{AttribLayout, BufferObject, UseBufferExecutor};
pub use error::GlError;
pub use headless::{AttribPointer, DrawCall, HeadlessGl, HeadlessHandle, HeadlessUniform, UniformValue};
pub use renderer::{LoadedTexture, RendererContext, TextureConfig, MATRIX_STACK};
pub use resource::{
    DepthTest, LinkedProgram, PolygonOffset, RendererInit, ResourceContext,
    FRAGMENT_PRECISION_PREAMBLE,
};
pub use shader_object::{ShaderObject, ShaderSource};
pub use surface::{
    GlowSurface, HeadlessCanvas, HeadlessSurface, Surface, CANVAS_ID_ATTRIBUTE,
    RENDERER_ID_ATTRIBUTE,
};
pub use texture::{
    DecodedImage, FileFetcher, ImageFetcher, ImageResult, SharedImage, TextureError, TextureLoader,
};
pub use types::{
    BufferTarget, BufferUsage, Capability, ClearMask, DataType, DrawMode, IndexType, ShaderKind,
    TextureFilter,
};
