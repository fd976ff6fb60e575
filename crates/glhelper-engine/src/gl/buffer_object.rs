use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bytemuck::Pod;

use super::api::GlApi;
use super::error::GlError;
use super::resource::upload_buffer;
use super::types::{BufferTarget, BufferUsage, DataType};

/// How one attribute reads from a buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttribLayout {
    pub data_type: DataType,
    /// Components per vertex (1 to 4).
    pub size: i32,
    /// Bytes between consecutive vertices; `0` means tightly packed.
    pub stride: i32,
    /// Byte offset of the first component.
    pub offset: i32,
}

impl Default for AttribLayout {
    fn default() -> Self {
        Self { data_type: DataType::Float, size: 3, stride: 0, offset: 0 }
    }
}

impl AttribLayout {
    /// Tightly packed floats with `size` components.
    pub fn floats(size: i32) -> Self {
        Self { size, ..Self::default() }
    }

    /// Float attribute inside an interleaved float buffer.
    ///
    /// `stride_floats` and `offset_floats` count `f32` elements, not bytes.
    pub fn interleaved(size: i32, stride_floats: i32, offset_floats: i32) -> Self {
        let fsize = DataType::Float.size_bytes() as i32;
        Self {
            data_type: DataType::Float,
            size,
            stride: stride_floats * fsize,
            offset: offset_floats * fsize,
        }
    }
}

/// Deferred `use_buffer` call.
pub type UseBufferExecutor = Box<dyn Fn() -> Result<(), GlError>>;

/// One array buffer and the calls that point attributes at it.
///
/// The handle lives in a shared cell so executors created earlier observe
/// [`unbind_buffer`](Self::unbind_buffer) and a later [`create_buffer`](Self::create_buffer).
pub struct BufferObject<G: GlApi> {
    gl: Rc<G>,
    buffer: Rc<Cell<Option<G::Buffer>>>,
}

impl<G: GlApi> BufferObject<G> {
    /// Empty object; call [`create_buffer`](Self::create_buffer) before binding.
    pub fn new(gl: Rc<G>) -> Self {
        Self { gl, buffer: Rc::new(Cell::new(None)) }
    }

    pub fn with_data<T: Pod>(gl: Rc<G>, data: &[T]) -> Result<Self, GlError> {
        let object = Self::new(gl);
        object.create_buffer(data)?;
        Ok(object)
    }

    /// Uploads `data` into a new array buffer, replacing the held handle.
    pub fn create_buffer<T: Pod>(&self, data: &[T]) -> Result<(), GlError> {
        let buffer = upload_buffer(&*self.gl, data, BufferTarget::Array, BufferUsage::StaticDraw)?;
        self.buffer.set(Some(buffer));
        Ok(())
    }

    #[inline]
    pub fn buffer(&self) -> Option<G::Buffer> {
        self.buffer.get()
    }

    pub fn bind_buffer(&self) -> Result<(), GlError> {
        bind(&*self.gl, &self.buffer)
    }

    /// Binds the buffer, points attribute `location` at it and enables the attribute.
    pub fn use_buffer(&self, location: u32, layout: AttribLayout) -> Result<(), GlError> {
        use_buffer(&*self.gl, &self.buffer, location, layout)
    }

    /// Captures `location` and `layout` so the same attribute can be re-pointed at
    /// this buffer later, once per draw.
    pub fn create_use_buffer_executor(&self, location: u32, layout: AttribLayout) -> UseBufferExecutor
    where
        G: 'static,
    {
        let gl = Rc::clone(&self.gl);
        let buffer = Rc::clone(&self.buffer);
        Box::new(move || use_buffer(&*gl, &buffer, location, layout))
    }

    /// Forgets the handle. The GPU buffer itself is not deleted.
    pub fn unbind_buffer(&self) {
        self.buffer.set(None);
    }
}

impl<G: GlApi> fmt::Debug for BufferObject<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferObject").field("buffer", &self.buffer.get()).finish()
    }
}

fn bind<G: GlApi>(gl: &G, buffer: &Cell<Option<G::Buffer>>) -> Result<(), GlError> {
    let buffer = buffer.get().ok_or(GlError::BufferNotCreated)?;
    gl.bind_buffer(BufferTarget::Array, Some(buffer));
    Ok(())
}

fn use_buffer<G: GlApi>(
    gl: &G,
    buffer: &Cell<Option<G::Buffer>>,
    location: u32,
    layout: AttribLayout,
) -> Result<(), GlError> {
    bind(gl, buffer)?;
    gl.vertex_attrib_pointer(
        location,
        layout.size,
        layout.data_type,
        false,
        layout.stride,
        layout.offset,
    );
    gl.enable_vertex_attrib_array(location);
    Ok(())
}
