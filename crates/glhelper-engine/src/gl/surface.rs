use std::collections::HashMap;

use super::api::GlApi;
use super::headless::HeadlessGl;

/// Attribute set on the surface to identify its renderer.
pub const RENDERER_ID_ATTRIBUTE: &str = "data-webgl-renderer-id";
/// Attribute set on the drawing canvas created inside the surface.
pub const CANVAS_ID_ATTRIBUTE: &str = "data-webgl-canvas-id";

/// Container a renderer draws into.
///
/// Initialization empties the container, tags it, then asks it for a canvas and a
/// graphics context bound to that canvas.
pub trait Surface {
    type Gl: GlApi;

    /// Logical size in pixels, captured once at initialization.
    fn size(&self) -> (u32, u32);

    /// Removes every child (previous canvases included).
    fn clear_children(&mut self);

    fn set_attribute(&mut self, name: &str, value: &str);

    /// `false` once `create_gl` is known to fail; checked before the surface is touched.
    fn context_available(&self) -> bool {
        true
    }

    /// Creates a canvas child tagged with `canvas_id` and returns its context.
    fn create_gl(&mut self, canvas_id: &str) -> Result<Self::Gl, String>;
}

/// Canvas created by a [`HeadlessSurface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessCanvas {
    pub attributes: HashMap<String, String>,
}

/// In-memory surface backed by [`HeadlessGl`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    attributes: HashMap<String, String>,
    children: Vec<HeadlessCanvas>,
    context_lost: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Makes `create_gl` fail, as a browser does when the context limit is hit.
    pub fn with_context_lost(mut self) -> Self {
        self.context_lost = true;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[HeadlessCanvas] {
        &self.children
    }
}

impl Surface for HeadlessSurface {
    type Gl = HeadlessGl;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_children(&mut self) {
        self.children.clear();
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn context_available(&self) -> bool {
        !self.context_lost
    }

    fn create_gl(&mut self, canvas_id: &str) -> Result<HeadlessGl, String> {
        if self.context_lost {
            return Err("context creation refused".to_owned());
        }
        let mut canvas = HeadlessCanvas::default();
        canvas.attributes.insert(CANVAS_ID_ATTRIBUTE.to_owned(), canvas_id.to_owned());
        self.children.push(canvas);
        Ok(HeadlessGl::new())
    }
}

/// Surface wrapping a context the host already created (window, offscreen or WebGL).
///
/// The context can be handed out once; re-initializing on the same surface fails
/// and leaves it as the first renderer tagged it.
pub struct GlowSurface {
    width: u32,
    height: u32,
    context: Option<glow::Context>,
    attributes: HashMap<String, String>,
    canvas_id: Option<String>,
}

impl GlowSurface {
    /// The caller keeps the context current on this thread for as long as the
    /// renderer built from it is alive.
    pub fn new(context: glow::Context, width: u32, height: u32) -> Self {
        Self { width, height, context: Some(context), attributes: HashMap::new(), canvas_id: None }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn canvas_id(&self) -> Option<&str> {
        self.canvas_id.as_deref()
    }
}

impl Surface for GlowSurface {
    type Gl = glow::Context;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_children(&mut self) {
        self.canvas_id = None;
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn context_available(&self) -> bool {
        self.context.is_some()
    }

    fn create_gl(&mut self, canvas_id: &str) -> Result<glow::Context, String> {
        let context = self.context.take().ok_or_else(|| "context already taken".to_owned())?;
        self.canvas_id = Some(canvas_id.to_owned());
        Ok(context)
    }
}
