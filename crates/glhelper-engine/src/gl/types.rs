//! Typed stand-ins for the raw GL enums used by the layer.

use bitflags::bitflags;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn to_gl(self) -> u32 {
        match self {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    #[default]
    Array,
    /// Index data.
    ElementArray,
}

impl BufferTarget {
    pub fn to_gl(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Upload usage hint.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

impl BufferUsage {
    pub fn to_gl(self) -> u32 {
        match self {
            BufferUsage::StaticDraw => glow::STATIC_DRAW,
            BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
            BufferUsage::StreamDraw => glow::STREAM_DRAW,
        }
    }
}

/// Component type of a vertex attribute.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DataType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    #[default]
    Float,
}

impl DataType {
    pub fn to_gl(self) -> u32 {
        match self {
            DataType::Byte => glow::BYTE,
            DataType::UnsignedByte => glow::UNSIGNED_BYTE,
            DataType::Short => glow::SHORT,
            DataType::UnsignedShort => glow::UNSIGNED_SHORT,
            DataType::Float => glow::FLOAT,
        }
    }

    pub fn size_bytes(self) -> usize {
        match self {
            DataType::Byte | DataType::UnsignedByte => 1,
            DataType::Short | DataType::UnsignedShort => 2,
            DataType::Float => 4,
        }
    }
}

/// Element index type for indexed draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
}

impl IndexType {
    pub fn to_gl(self) -> u32 {
        match self {
            IndexType::UnsignedByte => glow::UNSIGNED_BYTE,
            IndexType::UnsignedShort => glow::UNSIGNED_SHORT,
        }
    }

    pub fn size_bytes(self) -> usize {
        match self {
            IndexType::UnsignedByte => 1,
            IndexType::UnsignedShort => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    pub fn to_gl(self) -> u32 {
        match self {
            DrawMode::Points => glow::POINTS,
            DrawMode::Lines => glow::LINES,
            DrawMode::LineStrip => glow::LINE_STRIP,
            DrawMode::LineLoop => glow::LINE_LOOP,
            DrawMode::Triangles => glow::TRIANGLES,
            DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
            DrawMode::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// Server-side capabilities toggled through `enable`/`disable`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    DepthTest,
    PolygonOffsetFill,
    PolygonOffsetLine,
    PolygonOffsetPoint,
    CullFace,
    Blend,
}

impl Capability {
    pub fn to_gl(self) -> u32 {
        match self {
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::PolygonOffsetFill => glow::POLYGON_OFFSET_FILL,
            Capability::PolygonOffsetLine => glow::POLYGON_OFFSET_LINE,
            Capability::PolygonOffsetPoint => glow::POLYGON_OFFSET_POINT,
            Capability::CullFace => glow::CULL_FACE,
            Capability::Blend => glow::BLEND,
        }
    }
}

bitflags! {
    /// Buffers cleared by `clear`.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct ClearMask: u32 {
        const COLOR = glow::COLOR_BUFFER_BIT;
        const DEPTH = glow::DEPTH_BUFFER_BIT;
        const STENCIL = glow::STENCIL_BUFFER_BIT;
    }
}

/// Minification / magnification filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

impl TextureFilter {
    pub fn to_gl(self) -> i32 {
        match self {
            TextureFilter::Nearest => glow::NEAREST as i32,
            TextureFilter::Linear => glow::LINEAR as i32,
        }
    }
}
