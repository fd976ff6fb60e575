//! Software [`GlApi`] that records calls and validates them without a GPU.
//!
//! Shaders "compile" when the source contains `void main`; a program links when
//! it has one compiled shader of each stage and every fragment `varying` is
//! also declared by the vertex stage. Attribute and uniform locations are
//! assigned in declaration order by scanning the GLSL for `attribute`/`in` and
//! `uniform` lines. Draws are checked against the bound buffers the way WebGL
//! does (out-of-range vertex fetches are rejected), and rejected calls land in
//! [`HeadlessGl::errors`] instead of panicking.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::api::GlApi;
use super::types::{
    BufferTarget, BufferUsage, Capability, ClearMask, DataType, DrawMode, IndexType, ShaderKind,
    TextureFilter,
};

/// Opaque object name handed out by [`HeadlessGl`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HeadlessHandle(u32);

impl HeadlessHandle {
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Uniform location: the owning program plus the slot inside it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HeadlessUniform {
    program: u32,
    slot: u32,
}

/// Last value written to a uniform slot.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Floats(Vec<f32>),
    Matrix4([f32; 16]),
}

/// State captured by `vertex_attrib_pointer`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttribPointer {
    pub buffer: HeadlessHandle,
    pub size: i32,
    pub data_type: DataType,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

/// One accepted draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub mode: DrawMode,
    pub count: i32,
    pub indexed: bool,
    pub program: HeadlessHandle,
}

#[derive(Debug)]
struct ShaderState {
    kind: ShaderKind,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    shaders: Vec<u32>,
    linked: bool,
    log: String,
    attribs: HashMap<String, u32>,
    uniforms: HashMap<String, u32>,
}

#[derive(Debug, Default)]
struct TextureState {
    size: Option<(u32, u32)>,
    min_filter: Option<TextureFilter>,
}

#[derive(Debug)]
struct State {
    next_id: u32,
    fail_allocations: bool,

    shaders: HashMap<u32, ShaderState>,
    programs: HashMap<u32, ProgramState>,
    buffers: HashMap<u32, Vec<u8>>,
    textures: HashMap<u32, TextureState>,

    array_binding: Option<u32>,
    element_binding: Option<u32>,
    current_program: Option<u32>,
    pointers: HashMap<u32, AttribPointer>,
    enabled_attribs: HashSet<u32>,
    capabilities: HashSet<Capability>,
    polygon_offset: (f32, f32),
    viewport: [i32; 4],
    clear_color: [f32; 4],
    clears: Vec<ClearMask>,
    active_unit: u32,
    texture_binding: Option<u32>,
    uniforms: HashMap<HeadlessUniform, UniformValue>,

    calls: Vec<&'static str>,
    errors: Vec<String>,
    draws: Vec<DrawCall>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            next_id: 1,
            fail_allocations: false,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            array_binding: None,
            element_binding: None,
            current_program: None,
            pointers: HashMap::new(),
            enabled_attribs: HashSet::new(),
            capabilities: HashSet::new(),
            polygon_offset: (0.0, 0.0),
            viewport: [0; 4],
            clear_color: [0.0; 4],
            clears: Vec::new(),
            active_unit: 0,
            texture_binding: None,
            uniforms: HashMap::new(),
            calls: Vec::new(),
            errors: Vec::new(),
            draws: Vec::new(),
        }
    }
}

impl State {
    fn alloc(&mut self, what: &str) -> Result<u32, String> {
        if self.fail_allocations {
            return Err(format!("out of memory allocating {what}"));
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    fn error(&mut self, msg: String) {
        log::trace!("headless gl: {msg}");
        self.errors.push(msg);
    }

    fn binding(&self, target: BufferTarget) -> Option<u32> {
        match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => self.element_binding,
        }
    }

    fn linked_program(&mut self, call: &str) -> Option<u32> {
        match self.current_program {
            Some(id) if self.programs.get(&id).is_some_and(|p| p.linked) => Some(id),
            _ => {
                self.error(format!("{call}: no valid program in use"));
                None
            }
        }
    }

    /// Checks that every enabled attribute can fetch `vertices` vertices.
    fn check_fetch(&mut self, call: &str, vertices: usize) -> bool {
        if vertices == 0 {
            return true;
        }
        let mut problems = Vec::new();
        for index in &self.enabled_attribs {
            let Some(ptr) = self.pointers.get(index) else {
                problems.push(format!("{call}: attribute {index} enabled without a pointer"));
                continue;
            };
            let Some(data) = self.buffers.get(&ptr.buffer.0) else {
                problems.push(format!("{call}: attribute {index} points at a deleted buffer"));
                continue;
            };
            let element = ptr.size as usize * ptr.data_type.size_bytes();
            let stride = if ptr.stride == 0 { element } else { ptr.stride as usize };
            let needed = (vertices - 1)
                .checked_mul(stride)
                .and_then(|n| n.checked_add(ptr.offset as usize + element));
            match needed {
                Some(needed) if needed <= data.len() => {}
                Some(needed) => problems.push(format!(
                    "{call}: attribute {index} reads {needed} bytes from a {} byte buffer",
                    data.len()
                )),
                None => problems.push(format!("{call}: attribute {index} range overflows")),
            }
        }
        let ok = problems.is_empty();
        for p in problems {
            self.error(p);
        }
        ok
    }

    fn set_uniform(&mut self, call: &'static str, loc: &HeadlessUniform, value: UniformValue) {
        self.calls.push(call);
        if self.current_program != Some(loc.program) {
            self.error(format!("{call}: location does not belong to the current program"));
            return;
        }
        self.uniforms.insert(*loc, value);
    }
}

/// Recording, validating software backend.
#[derive(Debug, Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_*` call fail until switched off again.
    pub fn set_allocation_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    // ── inspection ────────────────────────────────────────────────────────

    /// Entry points invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    /// Calls rejected by validation, in order.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn draw_count(&self) -> usize {
        self.state.borrow().draws.len()
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        self.state.borrow().capabilities.contains(&cap)
    }

    pub fn polygon_offset_params(&self) -> (f32, f32) {
        self.state.borrow().polygon_offset
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn clears(&self) -> Vec<ClearMask> {
        self.state.borrow().clears.clone()
    }

    pub fn viewport_rect(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    pub fn current_program(&self) -> Option<HeadlessHandle> {
        self.state.borrow().current_program.map(HeadlessHandle)
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<HeadlessHandle> {
        self.state.borrow().binding(target).map(HeadlessHandle)
    }

    pub fn buffer_contents(&self, buffer: HeadlessHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer.0).cloned()
    }

    pub fn attrib_pointer(&self, index: u32) -> Option<AttribPointer> {
        self.state.borrow().pointers.get(&index).copied()
    }

    pub fn is_attrib_enabled(&self, index: u32) -> bool {
        self.state.borrow().enabled_attribs.contains(&index)
    }

    pub fn uniform_value(&self, location: &HeadlessUniform) -> Option<UniformValue> {
        self.state.borrow().uniforms.get(location).cloned()
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    pub fn bound_texture(&self) -> Option<HeadlessHandle> {
        self.state.borrow().texture_binding.map(HeadlessHandle)
    }

    pub fn texture_size(&self, texture: HeadlessHandle) -> Option<(u32, u32)> {
        self.state.borrow().textures.get(&texture.0).and_then(|t| t.size)
    }

    pub fn texture_min_filter(&self, texture: HeadlessHandle) -> Option<TextureFilter> {
        self.state.borrow().textures.get(&texture.0).and_then(|t| t.min_filter)
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }
}

// ── GLSL scanning ─────────────────────────────────────────────────────────────

/// Names declared with one of `keywords` as the leading storage qualifier.
fn declared_names(source: &str, keywords: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let line = line.trim();
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        if !keywords.contains(&first) || !line.ends_with(';') {
            continue;
        }
        let decl = line.trim_end_matches(';');
        let Some(last) = decl.split_whitespace().last() else {
            continue;
        };
        let name = last.split('[').next().unwrap_or(last);
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

// ── GlApi ─────────────────────────────────────────────────────────────────────

impl GlApi for HeadlessGl {
    type Shader = HeadlessHandle;
    type Program = HeadlessHandle;
    type Buffer = HeadlessHandle;
    type Texture = HeadlessHandle;
    type UniformLocation = HeadlessUniform;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_shader");
        let id = s.alloc("shader")?;
        s.shaders.insert(
            id,
            ShaderState { kind, source: String::new(), compiled: false, log: String::new() },
        );
        Ok(HeadlessHandle(id))
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        let mut s = self.state.borrow_mut();
        s.calls.push("shader_source");
        match s.shaders.get_mut(&shader.0) {
            Some(sh) => sh.source = source.to_owned(),
            None => s.error(format!("shader_source: unknown shader {}", shader.0)),
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        let mut s = self.state.borrow_mut();
        s.calls.push("compile_shader");
        match s.shaders.get_mut(&shader.0) {
            Some(sh) => {
                sh.compiled = sh.source.contains("void main");
                sh.log = if sh.compiled {
                    String::new()
                } else {
                    "ERROR: 0:1: 'main' : function not defined".to_owned()
                };
            }
            None => s.error(format!("compile_shader: unknown shader {}", shader.0)),
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state.borrow().shaders.get(&shader.0).is_some_and(|sh| sh.compiled)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        self.state.borrow().shaders.get(&shader.0).map(|sh| sh.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let mut s = self.state.borrow_mut();
        s.calls.push("delete_shader");
        s.shaders.remove(&shader.0);
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_program");
        let id = s.alloc("program")?;
        s.programs.insert(id, ProgramState::default());
        Ok(HeadlessHandle(id))
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let mut s = self.state.borrow_mut();
        s.calls.push("attach_shader");
        if !s.shaders.contains_key(&shader.0) {
            s.error(format!("attach_shader: unknown shader {}", shader.0));
            return;
        }
        match s.programs.get_mut(&program.0) {
            Some(p) => p.shaders.push(shader.0),
            None => s.error(format!("attach_shader: unknown program {}", program.0)),
        }
    }

    fn link_program(&self, program: Self::Program) {
        let mut s = self.state.borrow_mut();
        s.calls.push("link_program");
        let Some(p) = s.programs.get(&program.0) else {
            s.error(format!("link_program: unknown program {}", program.0));
            return;
        };

        let mut vertex = None;
        let mut fragment = None;
        for id in &p.shaders {
            if let Some(sh) = s.shaders.get(id) {
                match sh.kind {
                    ShaderKind::Vertex => vertex = Some(sh),
                    ShaderKind::Fragment => fragment = Some(sh),
                }
            }
        }

        let (linked, log, attribs, uniforms) = match (vertex, fragment) {
            (Some(vs), Some(fs)) if vs.compiled && fs.compiled => {
                let written = declared_names(&vs.source, &["varying", "out"]);
                let unwritten: Vec<String> = declared_names(&fs.source, &["varying"])
                    .into_iter()
                    .filter(|v| !written.contains(v))
                    .collect();

                if unwritten.is_empty() {
                    let attribs = declared_names(&vs.source, &["attribute", "in"]);
                    let mut uniforms = declared_names(&vs.source, &["uniform"]);
                    for name in declared_names(&fs.source, &["uniform"]) {
                        if !uniforms.contains(&name) {
                            uniforms.push(name);
                        }
                    }
                    (true, String::new(), attribs, uniforms)
                } else {
                    let log = format!("Varyings not declared in the vertex shader: {}", unwritten.join(", "));
                    (false, log, Vec::new(), Vec::new())
                }
            }
            (Some(_), Some(_)) => {
                (false, "Attached shader is not compiled.".to_owned(), Vec::new(), Vec::new())
            }
            _ => (false, "Missing shader stage.".to_owned(), Vec::new(), Vec::new()),
        };

        if let Some(p) = s.programs.get_mut(&program.0) {
            p.linked = linked;
            p.log = log;
            p.attribs = attribs.into_iter().zip(0..).collect();
            p.uniforms = uniforms.into_iter().zip(0..).collect();
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        self.state.borrow().programs.get(&program.0).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state.borrow().programs.get(&program.0).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let mut s = self.state.borrow_mut();
        s.calls.push("delete_program");
        s.programs.remove(&program.0);
        if s.current_program == Some(program.0) {
            s.current_program = None;
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let mut s = self.state.borrow_mut();
        s.calls.push("use_program");
        match program {
            Some(p) if !s.programs.get(&p.0).is_some_and(|p| p.linked) => {
                s.error(format!("use_program: program {} is not linked", p.0));
            }
            _ => s.current_program = program.map(|p| p.0),
        }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        s.programs.get(&program.0).and_then(|p| p.attribs.get(name).copied())
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        let s = self.state.borrow();
        s.programs
            .get(&program.0)
            .and_then(|p| p.uniforms.get(name).copied())
            .map(|slot| HeadlessUniform { program: program.0, slot })
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_buffer");
        let id = s.alloc("buffer")?;
        s.buffers.insert(id, Vec::new());
        Ok(HeadlessHandle(id))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        let mut s = self.state.borrow_mut();
        s.calls.push("bind_buffer");
        if let Some(b) = buffer {
            if !s.buffers.contains_key(&b.0) {
                s.error(format!("bind_buffer: unknown buffer {}", b.0));
                return;
            }
        }
        let id = buffer.map(|b| b.0);
        match target {
            BufferTarget::Array => s.array_binding = id,
            BufferTarget::ElementArray => s.element_binding = id,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut s = self.state.borrow_mut();
        s.calls.push("buffer_data");
        let Some(id) = s.binding(target) else {
            s.error(format!("buffer_data: nothing bound to {target:?}"));
            return;
        };
        if let Some(store) = s.buffers.get_mut(&id) {
            store.clear();
            store.extend_from_slice(data);
        }
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
        let mut s = self.state.borrow_mut();
        s.calls.push("vertex_attrib_pointer");
        if !(1..=4).contains(&size) || stride < 0 || offset < 0 {
            s.error(format!(
                "vertex_attrib_pointer: invalid layout size={size} stride={stride} offset={offset}"
            ));
            return;
        }
        let Some(buffer) = s.array_binding else {
            s.error("vertex_attrib_pointer: no array buffer bound".to_owned());
            return;
        };
        s.pointers.insert(
            index,
            AttribPointer {
                buffer: HeadlessHandle(buffer),
                size,
                data_type,
                normalized,
                stride,
                offset,
            },
        );
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("enable_vertex_attrib_array");
        s.enabled_attribs.insert(index);
    }

    fn enable(&self, cap: Capability) {
        let mut s = self.state.borrow_mut();
        s.calls.push("enable");
        s.capabilities.insert(cap);
    }

    fn disable(&self, cap: Capability) {
        let mut s = self.state.borrow_mut();
        s.calls.push("disable");
        s.capabilities.remove(&cap);
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("polygon_offset");
        s.polygon_offset = (factor, units);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("viewport");
        s.viewport = [x, y, width, height];
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("clear_color");
        s.clear_color = [r, g, b, a];
    }

    fn clear(&self, mask: ClearMask) {
        let mut s = self.state.borrow_mut();
        s.calls.push("clear");
        s.clears.push(mask);
    }

    fn uniform_matrix4(&self, location: &Self::UniformLocation, transpose: bool, data: &[f32; 16]) {
        let mut s = self.state.borrow_mut();
        if transpose {
            s.calls.push("uniform_matrix4");
            s.error("uniform_matrix4: transpose must be false".to_owned());
            return;
        }
        s.set_uniform("uniform_matrix4", location, UniformValue::Matrix4(*data));
    }

    fn uniform_1i(&self, location: &Self::UniformLocation, x: i32) {
        self.state.borrow_mut().set_uniform("uniform_1i", location, UniformValue::Int(x));
    }

    fn uniform_1f(&self, location: &Self::UniformLocation, x: f32) {
        self.state
            .borrow_mut()
            .set_uniform("uniform_1f", location, UniformValue::Floats(vec![x]));
    }

    fn uniform_3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        self.state
            .borrow_mut()
            .set_uniform("uniform_3f", location, UniformValue::Floats(vec![x, y, z]));
    }

    fn uniform_4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.state
            .borrow_mut()
            .set_uniform("uniform_4f", location, UniformValue::Floats(vec![x, y, z, w]));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("draw_arrays");
        let Some(program) = s.linked_program("draw_arrays") else {
            return;
        };
        if first < 0 || count < 0 {
            s.error(format!("draw_arrays: negative range first={first} count={count}"));
            return;
        }
        let vertices = if count == 0 { 0 } else { first as usize + count as usize };
        if !s.check_fetch("draw_arrays", vertices) {
            return;
        }
        s.draws.push(DrawCall { mode, count, indexed: false, program: HeadlessHandle(program) });
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: i32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("draw_elements");
        let Some(program) = s.linked_program("draw_elements") else {
            return;
        };
        let Some(ebo) = s.element_binding else {
            s.error("draw_elements: no element array buffer bound".to_owned());
            return;
        };
        if count < 0 || offset < 0 || offset as usize % index_type.size_bytes() != 0 {
            s.error(format!("draw_elements: invalid count={count} offset={offset}"));
            return;
        }

        let width = index_type.size_bytes();
        let start = offset as usize;
        let end = start + count as usize * width;
        let indices = s.buffers.get(&ebo).map(Vec::as_slice).unwrap_or_default();
        if end > indices.len() {
            let len = indices.len();
            s.error(format!("draw_elements: reads {end} bytes from a {len} byte index buffer"));
            return;
        }
        let max_index = indices[start..end]
            .chunks_exact(width)
            .map(|c| match index_type {
                IndexType::UnsignedByte => c[0] as usize,
                IndexType::UnsignedShort => u16::from_ne_bytes([c[0], c[1]]) as usize,
            })
            .max();

        let vertices = max_index.map_or(0, |m| m + 1);
        if !s.check_fetch("draw_elements", vertices) {
            return;
        }
        s.draws.push(DrawCall { mode, count, indexed: true, program: HeadlessHandle(program) });
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_texture");
        let id = s.alloc("texture")?;
        s.textures.insert(id, TextureState::default());
        Ok(HeadlessHandle(id))
    }

    fn active_texture(&self, unit: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push("active_texture");
        s.active_unit = unit;
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        let mut s = self.state.borrow_mut();
        s.calls.push("bind_texture_2d");
        if let Some(t) = texture {
            if !s.textures.contains_key(&t.0) {
                s.error(format!("bind_texture_2d: unknown texture {}", t.0));
                return;
            }
        }
        s.texture_binding = texture.map(|t| t.0);
    }

    fn tex_min_filter_2d(&self, filter: TextureFilter) {
        let mut s = self.state.borrow_mut();
        s.calls.push("tex_min_filter_2d");
        let Some(id) = s.texture_binding else {
            s.error("tex_min_filter_2d: no texture bound".to_owned());
            return;
        };
        if let Some(t) = s.textures.get_mut(&id) {
            t.min_filter = Some(filter);
        }
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut s = self.state.borrow_mut();
        s.calls.push("tex_image_2d_rgba");
        let Some(id) = s.texture_binding else {
            s.error("tex_image_2d_rgba: no texture bound".to_owned());
            return;
        };
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            s.error(format!("tex_image_2d_rgba: expected {expected} bytes, got {}", pixels.len()));
            return;
        }
        if let Some(t) = s.textures.get_mut(&id) {
            t.size = Some((width, height));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "attribute vec4 a_Position;\nattribute vec4 a_Color;\nuniform mat4 u_MvpMatrix;\nvoid main() {}\n";
    const FS: &str = "precision mediump float;\nuniform vec4 u_Tint;\nvoid main() {}\n";

    fn linked(gl: &HeadlessGl) -> HeadlessHandle {
        let vs = gl.create_shader(ShaderKind::Vertex).unwrap();
        gl.shader_source(vs, VS);
        gl.compile_shader(vs);
        let fs = gl.create_shader(ShaderKind::Fragment).unwrap();
        gl.shader_source(fs, FS);
        gl.compile_shader(fs);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, vs);
        gl.attach_shader(p, fs);
        gl.link_program(p);
        p
    }

    #[test]
    fn declarations_get_locations_in_order() {
        let gl = HeadlessGl::new();
        let p = linked(&gl);
        assert!(gl.program_link_status(p));
        assert_eq!(gl.attrib_location(p, "a_Position"), Some(0));
        assert_eq!(gl.attrib_location(p, "a_Color"), Some(1));
        assert_eq!(gl.attrib_location(p, "a_Normal"), None);
        assert!(gl.uniform_location(p, "u_MvpMatrix").is_some());
        assert!(gl.uniform_location(p, "u_Tint").is_some());
    }

    #[test]
    fn source_without_main_fails_to_compile() {
        let gl = HeadlessGl::new();
        let sh = gl.create_shader(ShaderKind::Fragment).unwrap();
        gl.shader_source(sh, "precision mediump float;");
        gl.compile_shader(sh);
        assert!(!gl.shader_compile_status(sh));
        assert!(!gl.shader_info_log(sh).is_empty());
    }

    #[test]
    fn out_of_range_draw_is_rejected() {
        let gl = HeadlessGl::new();
        let p = linked(&gl);
        gl.use_program(Some(p));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::Array, Some(vbo));
        gl.buffer_data(BufferTarget::Array, &[0u8; 3 * 3 * 4], BufferUsage::StaticDraw);
        gl.vertex_attrib_pointer(0, 3, DataType::Float, false, 0, 0);
        gl.enable_vertex_attrib_array(0);

        gl.draw_arrays(DrawMode::Triangles, 0, 3);
        assert_eq!(gl.draw_count(), 1);
        assert!(gl.errors().is_empty());

        gl.draw_arrays(DrawMode::Triangles, 0, 4);
        assert_eq!(gl.draw_count(), 1);
        assert_eq!(gl.errors().len(), 1);
    }

    #[test]
    fn draw_range_past_i32_is_rejected_not_overflowed() {
        let gl = HeadlessGl::new();
        let p = linked(&gl);
        gl.use_program(Some(p));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::Array, Some(vbo));
        gl.buffer_data(BufferTarget::Array, &[0u8; 3 * 3 * 4], BufferUsage::StaticDraw);
        gl.vertex_attrib_pointer(0, 3, DataType::Float, false, 0, 0);
        gl.enable_vertex_attrib_array(0);

        gl.draw_arrays(DrawMode::Points, i32::MAX, 1);
        gl.draw_arrays(DrawMode::Points, i32::MAX, i32::MAX);
        gl.draw_arrays(DrawMode::Points, -1, 1);

        assert_eq!(gl.draw_count(), 0);
        assert_eq!(gl.errors().len(), 3);
        assert!(gl.errors().iter().all(|e| e.starts_with("draw_arrays")));
    }

    #[test]
    fn indexed_draw_checks_max_index() {
        let gl = HeadlessGl::new();
        let p = linked(&gl);
        gl.use_program(Some(p));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::Array, Some(vbo));
        gl.buffer_data(BufferTarget::Array, &[0u8; 4 * 3 * 4], BufferUsage::StaticDraw);
        gl.vertex_attrib_pointer(0, 3, DataType::Float, false, 0, 0);
        gl.enable_vertex_attrib_array(0);

        let ebo = gl.create_buffer().unwrap();
        gl.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        gl.buffer_data(BufferTarget::ElementArray, &[0, 1, 2, 0, 2, 4], BufferUsage::StaticDraw);

        gl.draw_elements(DrawMode::Triangles, 3, IndexType::UnsignedByte, 0);
        assert_eq!(gl.draw_count(), 1);

        // Second triangle references vertex 4 of 4.
        gl.draw_elements(DrawMode::Triangles, 6, IndexType::UnsignedByte, 0);
        assert_eq!(gl.draw_count(), 1);
        assert!(gl.errors()[0].contains("draw_elements"));
    }

    #[test]
    fn uniform_requires_owning_program() {
        let gl = HeadlessGl::new();
        let p = linked(&gl);
        let loc = gl.uniform_location(p, "u_Tint").unwrap();

        gl.uniform_4f(&loc, 1.0, 0.0, 0.0, 1.0);
        assert_eq!(gl.errors().len(), 1);

        gl.use_program(Some(p));
        gl.uniform_4f(&loc, 1.0, 0.0, 0.0, 1.0);
        assert_eq!(gl.uniform_value(&loc), Some(UniformValue::Floats(vec![1.0, 0.0, 0.0, 1.0])));
    }

    #[test]
    fn allocation_failure_is_reported() {
        let gl = HeadlessGl::new();
        gl.set_allocation_failure(true);
        assert!(gl.create_buffer().is_err());
        gl.set_allocation_failure(false);
        assert!(gl.create_buffer().is_ok());
    }
}
