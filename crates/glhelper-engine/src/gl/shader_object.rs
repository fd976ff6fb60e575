use std::fmt;
use std::rc::Rc;

use super::api::GlApi;
use super::error::GlError;
use super::resource::{attrib_location, uniform_location, LinkedProgram};

/// Shader pair plus the attribute and uniform names the caller intends to use.
#[derive(Debug, Clone, Default)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self { vertex: vertex.into(), fragment: fragment.into(), ..Self::default() }
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn uniform(mut self, name: impl Into<String>) -> Self {
        self.uniforms.push(name.into());
        self
    }

    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn uniforms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniforms.extend(names.into_iter().map(Into::into));
        self
    }
}

/// A linked program together with its declared interface.
///
/// Lookups of names that were never declared return `Ok(None)` without touching
/// the GL; declared names must resolve in the program or the lookup fails.
pub struct ShaderObject<G: GlApi> {
    gl: Rc<G>,
    source: ShaderSource,
    linked: LinkedProgram<G>,
}

impl<G: GlApi> ShaderObject<G> {
    pub(crate) fn new(gl: Rc<G>, source: ShaderSource, linked: LinkedProgram<G>) -> Self {
        Self { gl, source, linked }
    }

    #[inline]
    pub fn program(&self) -> G::Program {
        self.linked.program
    }

    #[inline]
    pub fn vertex_shader(&self) -> G::Shader {
        self.linked.vertex_shader
    }

    #[inline]
    pub fn fragment_shader(&self) -> G::Shader {
        self.linked.fragment_shader
    }

    pub fn linked(&self) -> LinkedProgram<G> {
        self.linked
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn get_attribute_name(&self, name: &str) -> Option<&str> {
        self.source.attributes.iter().map(String::as_str).find(|n| *n == name)
    }

    pub fn get_uniform_name(&self, name: &str) -> Option<&str> {
        self.source.uniforms.iter().map(String::as_str).find(|n| *n == name)
    }

    pub fn get_attribute_location(&self, name: &str) -> Result<Option<u32>, GlError> {
        if self.get_attribute_name(name).is_none() {
            return Ok(None);
        }
        attrib_location(&*self.gl, self.linked.program, name).map(Some)
    }

    pub fn get_uniform_location(&self, name: &str) -> Result<Option<G::UniformLocation>, GlError> {
        if self.get_uniform_name(name).is_none() {
            return Ok(None);
        }
        uniform_location(&*self.gl, self.linked.program, name).map(Some)
    }
}

impl<G: GlApi> fmt::Debug for ShaderObject<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderObject")
            .field("linked", &self.linked)
            .field("attributes", &self.source.attributes)
            .field("uniforms", &self.source.uniforms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlError, HeadlessSurface, RendererContext};

    const VS: &str = "attribute vec4 a_Position;\nuniform mat4 u_MvpMatrix;\nvoid main() {}\n";
    const FS: &str = "uniform vec4 u_Color;\nvoid main() {}\n";

    #[test]
    fn undeclared_names_resolve_to_none() {
        let mut surface = HeadlessSurface::new(10, 10);
        let ctx = RendererContext::new(&mut surface).unwrap();
        let shader = ctx
            .create_shader_program(ShaderSource::new(VS, FS).attribute("a_Position"), true)
            .unwrap();

        assert_eq!(shader.get_attribute_location("a_Position").unwrap(), Some(0));
        assert_eq!(shader.get_attribute_location("a_Color").unwrap(), None);
        assert!(shader.get_uniform_location("u_MvpMatrix").unwrap().is_none());
    }

    #[test]
    fn declared_but_inactive_name_is_an_error() {
        let mut surface = HeadlessSurface::new(10, 10);
        let ctx = RendererContext::new(&mut surface).unwrap();
        let source = ShaderSource::new(VS, FS).uniforms(["u_MvpMatrix", "u_Missing"]);
        let shader = ctx.create_shader_program(source, false).unwrap();

        assert!(shader.get_uniform_location("u_MvpMatrix").unwrap().is_some());
        assert!(matches!(
            shader.get_uniform_location("u_Missing"),
            Err(GlError::UniformNotFound(_))
        ));
    }

    #[test]
    fn name_lookup_is_declared_only() {
        let source = ShaderSource::new(VS, FS).attribute("a_Position").uniform("u_Color");
        assert_eq!(source.attributes, vec!["a_Position".to_owned()]);

        let mut surface = HeadlessSurface::new(10, 10);
        let ctx = RendererContext::new(&mut surface).unwrap();
        let shader = ctx.create_shader_program(source, true).unwrap();

        assert_eq!(shader.get_attribute_name("a_Position"), Some("a_Position"));
        assert_eq!(shader.get_uniform_name("u_MvpMatrix"), None);
        assert_eq!(ctx.gl().current_program(), Some(shader.program()));
    }
}
