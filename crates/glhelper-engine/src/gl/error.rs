use std::fmt;

use super::texture::TextureError;
use super::types::ShaderKind;

/// Failure raised while creating or binding GL resources.
///
/// Variants carrying text hold the native diagnostic (info log or driver message).
#[derive(Debug, Clone)]
pub enum GlError {
    /// The surface could not produce a graphics context.
    ContextUnavailable(String),
    /// Surface dimensions that do not fit a GL viewport.
    InvalidSurfaceSize { width: u32, height: u32 },
    ShaderCreation(String),
    ShaderCompile {
        kind: ShaderKind,
        log: String,
        source: String,
    },
    ProgramCreation(String),
    ProgramLink { log: String },
    /// The linked program has no active attribute with this name.
    AttribNotFound(String),
    /// The linked program has no active uniform with this name.
    UniformNotFound(String),
    BufferCreation(String),
    /// `bind_buffer` on a buffer object that holds no buffer.
    BufferNotCreated,
    TextureCreation(String),
    /// Texture config with an empty URL.
    MissingUrl,
    Texture(TextureError),
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::ContextUnavailable(msg) => write!(f, "graphics context unavailable: {msg}"),
            GlError::InvalidSurfaceSize { width, height } => {
                write!(f, "surface size {width}x{height} exceeds the viewport range")
            }
            GlError::ShaderCreation(msg) => write!(f, "failed to create shader: {msg}"),
            GlError::ShaderCompile { kind, log, source } => {
                write!(f, "failed to compile {kind:?} shader: {log}\n--- source ---\n{source}")
            }
            GlError::ProgramCreation(msg) => write!(f, "failed to create program: {msg}"),
            GlError::ProgramLink { log } => write!(f, "failed to link program: {log}"),
            GlError::AttribNotFound(name) => {
                write!(f, "failed to get the storage location of attribute {name}")
            }
            GlError::UniformNotFound(name) => {
                write!(f, "failed to get the storage location of uniform {name}")
            }
            GlError::BufferCreation(msg) => write!(f, "failed to create vertex buffer: {msg}"),
            GlError::BufferNotCreated => write!(f, "buffer is null"),
            GlError::TextureCreation(msg) => write!(f, "failed to create texture: {msg}"),
            GlError::MissingUrl => write!(f, "texture url is empty"),
            GlError::Texture(e) => write!(f, "texture load failed: {e}"),
        }
    }
}

impl std::error::Error for GlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlError::Texture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TextureError> for GlError {
    fn from(e: TextureError) -> Self {
        GlError::Texture(e)
    }
}
