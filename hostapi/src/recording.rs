//! Headless `GraphicsApi` that records every call.
//!
//! `RecordingGl` allocates object ids, keeps the state needed to answer
//! queries, and appends each mutating call to a log. It is the backend
//! used when no GPU context exists (tests, batch runs, trace capture).
//!
//! Shader compilation is a deterministic stand-in: a shader compiles iff its
//! source mentions `main`; a program links iff it has at least one vertex and
//! one fragment shader attached and all attached shaders compiled.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

use crate::gl;
use crate::traits::GraphicsApi;
use crate::types::{
    GlBuffer, GlProgram, GlShader, GlTexture, GlUniformLocation, GlVertexArray, ParamValue,
};

/// One recorded mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Enable(u32),
    Disable(u32),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    Scissor { x: i32, y: i32, width: i32, height: i32 },
    Clear(u32),
    ClearColor([f32; 4]),
    PixelStore { pname: u32, param: i32 },
    BlendEquation(u32),
    BlendEquationSeparate { mode_rgb: u32, mode_alpha: u32 },
    BlendFunc { src: u32, dst: u32 },
    BlendFuncSeparate { src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32 },
    CreateBuffer(GlBuffer),
    DeleteBuffer(GlBuffer),
    BindBuffer { target: u32, buffer: Option<GlBuffer> },
    BufferData { target: u32, size: usize, data: Option<Vec<u8>>, usage: u32 },
    BufferSubData { target: u32, offset: i32, data: Vec<u8> },
    CreateShader { shader: GlShader, kind: u32 },
    DeleteShader(GlShader),
    ShaderSource { shader: GlShader, source: String },
    CompileShader(GlShader),
    CreateProgram(GlProgram),
    DeleteProgram(GlProgram),
    AttachShader { program: GlProgram, shader: GlShader },
    DetachShader { program: GlProgram, shader: GlShader },
    LinkProgram(GlProgram),
    UseProgram(Option<GlProgram>),
    Uniform1i { location: Option<GlUniformLocation>, value: i32 },
    Uniform1f { location: Option<GlUniformLocation>, value: f32 },
    UniformMatrix4fv { location: Option<GlUniformLocation>, transpose: bool, values: Vec<f32> },
    CreateVertexArray(GlVertexArray),
    DeleteVertexArray(GlVertexArray),
    BindVertexArray(Option<GlVertexArray>),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, kind: u32, normalized: bool, stride: i32, offset: i32 },
    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements { mode: u32, count: i32, kind: u32, offset: i32 },
    CreateTexture(GlTexture),
    DeleteTexture(GlTexture),
    BindTexture { target: u32, texture: Option<GlTexture> },
    ActiveTexture(u32),
    TexParameter { target: u32, pname: u32, param: i32 },
    TexImage2D {
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        kind: u32,
        pixels: Option<Vec<u8>>,
    },
}

impl GlCall {
    /// Name of the guest import that produces this call.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enable(_) => "enable",
            Self::Disable(_) => "disable",
            Self::Viewport { .. } => "viewport",
            Self::Scissor { .. } => "scissor",
            Self::Clear(_) => "clear",
            Self::ClearColor(_) => "clearColor",
            Self::PixelStore { .. } => "pixelStorei",
            Self::BlendEquation(_) => "blendEquation",
            Self::BlendEquationSeparate { .. } => "blendEquationSeparate",
            Self::BlendFunc { .. } => "blendFunc",
            Self::BlendFuncSeparate { .. } => "blendFuncSeparate",
            Self::CreateBuffer(_) => "genBuffers",
            Self::DeleteBuffer(_) => "deleteBuffers",
            Self::BindBuffer { .. } => "bindBuffer",
            Self::BufferData { .. } => "bufferData",
            Self::BufferSubData { .. } => "bufferSubData",
            Self::CreateShader { .. } => "createShader",
            Self::DeleteShader(_) => "deleteShader",
            Self::ShaderSource { .. } => "shaderSource",
            Self::CompileShader(_) => "compileShader",
            Self::CreateProgram(_) => "createProgram",
            Self::DeleteProgram(_) => "deleteProgram",
            Self::AttachShader { .. } => "attachShader",
            Self::DetachShader { .. } => "detachShader",
            Self::LinkProgram(_) => "linkProgram",
            Self::UseProgram(_) => "useProgram",
            Self::Uniform1i { .. } => "uniform1i",
            Self::Uniform1f { .. } => "uniform1f",
            Self::UniformMatrix4fv { .. } => "uniformMatrix4fv",
            Self::CreateVertexArray(_) => "genVertexArrays",
            Self::DeleteVertexArray(_) => "deleteVertexArrays",
            Self::BindVertexArray(_) => "bindVertexArray",
            Self::EnableVertexAttribArray(_) => "enableVertexAttribArray",
            Self::DisableVertexAttribArray(_) => "disableVertexAttribArray",
            Self::VertexAttribPointer { .. } => "vertexAttribPointer",
            Self::DrawArrays { .. } => "drawArrays",
            Self::DrawElements { .. } => "drawElements",
            Self::CreateTexture(_) => "genTextures",
            Self::DeleteTexture(_) => "deleteTextures",
            Self::BindTexture { .. } => "bindTexture",
            Self::ActiveTexture(_) => "activeTexture",
            Self::TexParameter { .. } => "texParameteri",
            Self::TexImage2D { .. } => "texImage2D",
        }
    }
}

#[derive(Debug, Clone)]
struct ShaderRecord {
    kind: u32,
    source: String,
    compiled: bool,
    deleted: bool,
    info_log: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct ProgramRecord {
    shaders: Vec<GlShader>,
    linked: bool,
    deleted: bool,
    info_log: Option<String>,
    uniforms: Vec<(String, GlUniformLocation)>,
    attribs: Vec<String>,
}

/// In-memory graphics backend.
///
/// The call log keeps every mutating call, including full copies of
/// uploaded buffer and texture data, and only shrinks when
/// [`take_calls`](Self::take_calls) drains it. Long-running sessions should
/// drain it once per frame.
#[derive(Debug, Clone)]
pub struct RecordingGl {
    next_id: u32,
    calls: Vec<GlCall>,
    shaders: BTreeMap<GlShader, ShaderRecord>,
    programs: BTreeMap<GlProgram, ProgramRecord>,
    buffers: BTreeMap<GlBuffer, Vec<u8>>,
    deleted: BTreeSet<u32>,
    enabled: BTreeSet<u32>,
    array_buffer: Option<GlBuffer>,
    element_buffer: Option<GlBuffer>,
    current_program: Option<GlProgram>,
    texture_2d: Option<GlTexture>,
    vertex_array: Option<GlVertexArray>,
    active_texture: u32,
    viewport: [i32; 4],
    scissor: [i32; 4],
    // src_rgb, dst_rgb, src_alpha, dst_alpha
    blend_func: [u32; 4],
    // rgb, alpha
    blend_equation: [u32; 2],
    line_width: f32,
}

impl RecordingGl {
    /// Create a backend with GL default state.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            calls: Vec::new(),
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
            buffers: BTreeMap::new(),
            deleted: BTreeSet::new(),
            enabled: BTreeSet::new(),
            array_buffer: None,
            element_buffer: None,
            current_program: None,
            texture_2d: None,
            vertex_array: None,
            active_texture: gl::TEXTURE0,
            viewport: [0; 4],
            scissor: [0; 4],
            blend_func: [gl::ONE, gl::ZERO, gl::ONE, gl::ZERO],
            blend_equation: [gl::FUNC_ADD, gl::FUNC_ADD],
            line_width: 1.0,
        }
    }

    /// Width reported for `LINE_WIDTH` queries.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Every mutating call so far, in order.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Contents of `buffer` as last uploaded.
    pub fn buffer_contents(&self, buffer: GlBuffer) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Source last set on `shader`.
    pub fn shader_source_of(&self, shader: GlShader) -> Option<&str> {
        self.shaders.get(&shader).map(|s| s.source.as_str())
    }

    /// Returns true if the object with raw id `id` was deleted.
    pub fn is_deleted(&self, id: u32) -> bool {
        self.deleted.contains(&id)
            || self
                .shaders
                .iter()
                .any(|(shader, record)| shader.get() == id && record.deleted)
            || self
                .programs
                .iter()
                .any(|(program, record)| program.get() == id && record.deleted)
    }

    pub fn bound_array_buffer(&self) -> Option<GlBuffer> {
        self.array_buffer
    }

    pub fn current_program(&self) -> Option<GlProgram> {
        self.current_program
    }

    pub fn bound_vertex_array(&self) -> Option<GlVertexArray> {
        self.vertex_array
    }

    fn alloc(&mut self) -> NonZeroU32 {
        let id = NonZeroU32::MIN.saturating_add(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    fn bound_buffer_mut(&mut self, target: u32) -> Option<&mut Vec<u8>> {
        let buffer = match target {
            gl::ARRAY_BUFFER => self.array_buffer,
            gl::ELEMENT_ARRAY_BUFFER => self.element_buffer,
            _ => None,
        }?;
        self.buffers.get_mut(&buffer)
    }

    fn attached_sources(&self, program: GlProgram, kind: Option<u32>) -> Vec<&str> {
        let Some(record) = self.programs.get(&program) else {
            return Vec::new();
        };
        record
            .shaders
            .iter()
            .filter_map(|shader| self.shaders.get(shader))
            .filter(|shader| kind.map_or(true, |k| shader.kind == k))
            .map(|shader| shader.source.as_str())
            .collect()
    }
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

fn bool_param(value: bool) -> ParamValue {
    ParamValue::Bool(value)
}

fn log_length(log: &Option<String>) -> ParamValue {
    match log {
        Some(text) if !text.is_empty() => ParamValue::Int(text.len() as i32 + 1),
        _ => ParamValue::Int(0),
    }
}

impl GraphicsApi for RecordingGl {
    fn enable(&mut self, cap: u32) {
        self.enabled.insert(cap);
        self.record(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: u32) {
        self.enabled.remove(&cap);
        self.record(GlCall::Disable(cap));
    }

    fn is_enabled(&self, cap: u32) -> bool {
        self.enabled.contains(&cap)
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = [x, y, width, height];
        self.record(GlCall::Viewport { x, y, width, height });
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.scissor = [x, y, width, height];
        self.record(GlCall::Scissor { x, y, width, height });
    }

    fn clear(&mut self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GlCall::ClearColor([red, green, blue, alpha]));
    }

    fn pixel_store_i(&mut self, pname: u32, param: i32) {
        self.record(GlCall::PixelStore { pname, param });
    }

    fn blend_equation(&mut self, mode: u32) {
        self.blend_equation = [mode, mode];
        self.record(GlCall::BlendEquation(mode));
    }

    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32) {
        self.blend_equation = [mode_rgb, mode_alpha];
        self.record(GlCall::BlendEquationSeparate { mode_rgb, mode_alpha });
    }

    fn blend_func(&mut self, src: u32, dst: u32) {
        self.blend_func = [src, dst, src, dst];
        self.record(GlCall::BlendFunc { src, dst });
    }

    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.blend_func = [src_rgb, dst_rgb, src_alpha, dst_alpha];
        self.record(GlCall::BlendFuncSeparate {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        });
    }

    fn create_buffer(&mut self) -> GlBuffer {
        let buffer = GlBuffer(self.alloc());
        self.buffers.insert(buffer, Vec::new());
        self.record(GlCall::CreateBuffer(buffer));
        buffer
    }

    fn delete_buffer(&mut self, buffer: GlBuffer) {
        self.deleted.insert(buffer.get());
        if self.array_buffer == Some(buffer) {
            self.array_buffer = None;
        }
        if self.element_buffer == Some(buffer) {
            self.element_buffer = None;
        }
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: u32, buffer: Option<GlBuffer>) {
        match target {
            gl::ARRAY_BUFFER => self.array_buffer = buffer,
            gl::ELEMENT_ARRAY_BUFFER => self.element_buffer = buffer,
            _ => {}
        }
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: u32, size: usize, data: Option<&[u8]>, usage: u32) {
        if let Some(contents) = self.bound_buffer_mut(target) {
            *contents = match data {
                Some(bytes) => bytes.to_vec(),
                None => vec![0; size],
            };
        }
        self.record(GlCall::BufferData {
            target,
            size,
            data: data.map(<[u8]>::to_vec),
            usage,
        });
    }

    fn buffer_sub_data(&mut self, target: u32, offset: i32, data: &[u8]) {
        if let Some(contents) = self.bound_buffer_mut(target) {
            let start = offset.max(0) as usize;
            let end = start + data.len();
            if end <= contents.len() {
                contents[start..end].copy_from_slice(data);
            }
        }
        self.record(GlCall::BufferSubData {
            target,
            offset,
            data: data.to_vec(),
        });
    }

    fn create_shader(&mut self, kind: u32) -> GlShader {
        let shader = GlShader(self.alloc());
        self.shaders.insert(
            shader,
            ShaderRecord {
                kind,
                source: String::new(),
                compiled: false,
                deleted: false,
                info_log: None,
            },
        );
        self.record(GlCall::CreateShader { shader, kind });
        shader
    }

    fn delete_shader(&mut self, shader: GlShader) {
        if let Some(record) = self.shaders.get_mut(&shader) {
            record.deleted = true;
        }
        self.record(GlCall::DeleteShader(shader));
    }

    fn shader_source(&mut self, shader: GlShader, source: &str) {
        if let Some(record) = self.shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
        self.record(GlCall::ShaderSource {
            shader,
            source: source.to_string(),
        });
    }

    fn compile_shader(&mut self, shader: GlShader) {
        if let Some(record) = self.shaders.get_mut(&shader) {
            record.compiled = record.source.contains("main");
            record.info_log = Some(if record.compiled {
                String::new()
            } else {
                "ERROR: 0:1: 'main' : function not defined\n".to_string()
            });
        }
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_parameter(&self, shader: GlShader, pname: u32) -> ParamValue {
        let Some(record) = self.shaders.get(&shader) else {
            return ParamValue::Null;
        };
        match pname {
            gl::COMPILE_STATUS => bool_param(record.compiled),
            gl::DELETE_STATUS => bool_param(record.deleted),
            gl::SHADER_TYPE => ParamValue::Int(record.kind as i32),
            gl::INFO_LOG_LENGTH => log_length(&record.info_log),
            _ => ParamValue::Unsupported,
        }
    }

    fn shader_info_log(&self, shader: GlShader) -> Option<String> {
        self.shaders.get(&shader)?.info_log.clone()
    }

    fn create_program(&mut self) -> GlProgram {
        let program = GlProgram(self.alloc());
        self.programs.insert(program, ProgramRecord::default());
        self.record(GlCall::CreateProgram(program));
        program
    }

    fn delete_program(&mut self, program: GlProgram) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.deleted = true;
        }
        self.record(GlCall::DeleteProgram(program));
    }

    fn attach_shader(&mut self, program: GlProgram, shader: GlShader) {
        if let Some(record) = self.programs.get_mut(&program) {
            if !record.shaders.contains(&shader) {
                record.shaders.push(shader);
            }
        }
        self.record(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&mut self, program: GlProgram, shader: GlShader) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.shaders.retain(|s| *s != shader);
        }
        self.record(GlCall::DetachShader { program, shader });
    }

    fn link_program(&mut self, program: GlProgram) {
        let kinds: Vec<(u32, bool)> = self
            .programs
            .get(&program)
            .map(|record| {
                record
                    .shaders
                    .iter()
                    .filter_map(|shader| self.shaders.get(shader))
                    .map(|shader| (shader.kind, shader.compiled))
                    .collect()
            })
            .unwrap_or_default();
        let has_vertex = kinds.iter().any(|(kind, _)| *kind == gl::VERTEX_SHADER);
        let has_fragment = kinds.iter().any(|(kind, _)| *kind == gl::FRAGMENT_SHADER);
        let all_compiled = kinds.iter().all(|(_, compiled)| *compiled);

        if let Some(record) = self.programs.get_mut(&program) {
            record.linked = has_vertex && has_fragment && all_compiled;
            record.uniforms.clear();
            record.attribs.clear();
            record.info_log = Some(if record.linked {
                String::new()
            } else if !all_compiled {
                "ERROR: attached shader not compiled\n".to_string()
            } else {
                "ERROR: missing vertex or fragment shader\n".to_string()
            });
        }
        self.record(GlCall::LinkProgram(program));
    }

    fn program_parameter(&self, program: GlProgram, pname: u32) -> ParamValue {
        let Some(record) = self.programs.get(&program) else {
            return ParamValue::Null;
        };
        match pname {
            gl::LINK_STATUS => bool_param(record.linked),
            gl::DELETE_STATUS => bool_param(record.deleted),
            gl::ATTACHED_SHADERS => ParamValue::Int(record.shaders.len() as i32),
            gl::INFO_LOG_LENGTH => log_length(&record.info_log),
            _ => ParamValue::Unsupported,
        }
    }

    fn program_info_log(&self, program: GlProgram) -> Option<String> {
        self.programs.get(&program)?.info_log.clone()
    }

    fn use_program(&mut self, program: Option<GlProgram>) {
        self.current_program = program;
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: GlProgram, name: &str) -> Option<GlUniformLocation> {
        let linked = self.programs.get(&program).is_some_and(|p| p.linked);
        if !linked || name.is_empty() {
            return None;
        }
        if let Some((_, location)) = self
            .programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|(n, _)| n == name)
        {
            return Some(*location);
        }
        let declared = self
            .attached_sources(program, None)
            .iter()
            .any(|source| source.contains(name));
        if !declared {
            return None;
        }
        let location = GlUniformLocation(self.alloc());
        self.programs
            .get_mut(&program)?
            .uniforms
            .push((name.to_string(), location));
        Some(location)
    }

    fn attrib_location(&mut self, program: GlProgram, name: &str) -> i32 {
        let linked = self.programs.get(&program).is_some_and(|p| p.linked);
        if !linked || name.is_empty() {
            return -1;
        }
        let declared = self
            .attached_sources(program, Some(gl::VERTEX_SHADER))
            .iter()
            .any(|source| source.contains(name));
        if !declared {
            return -1;
        }
        let Some(record) = self.programs.get_mut(&program) else {
            return -1;
        };
        match record.attribs.iter().position(|a| a == name) {
            Some(index) => index as i32,
            None => {
                record.attribs.push(name.to_string());
                record.attribs.len() as i32 - 1
            }
        }
    }

    fn uniform_1i(&mut self, location: Option<GlUniformLocation>, value: i32) {
        self.record(GlCall::Uniform1i { location, value });
    }

    fn uniform_1f(&mut self, location: Option<GlUniformLocation>, value: f32) {
        self.record(GlCall::Uniform1f { location, value });
    }

    fn uniform_matrix_4fv(&mut self, location: Option<GlUniformLocation>, transpose: bool, values: &[f32]) {
        self.record(GlCall::UniformMatrix4fv {
            location,
            transpose,
            values: values.to_vec(),
        });
    }

    fn create_vertex_array(&mut self) -> GlVertexArray {
        let array = GlVertexArray(self.alloc());
        self.record(GlCall::CreateVertexArray(array));
        array
    }

    fn delete_vertex_array(&mut self, array: GlVertexArray) {
        self.deleted.insert(array.get());
        if self.vertex_array == Some(array) {
            self.vertex_array = None;
        }
        self.record(GlCall::DeleteVertexArray(array));
    }

    fn bind_vertex_array(&mut self, array: Option<GlVertexArray>) {
        self.vertex_array = array;
        self.record(GlCall::BindVertexArray(array));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        kind: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            kind,
            normalized,
            stride,
            offset,
        });
    }

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: u32, count: i32, kind: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            kind,
            offset,
        });
    }

    fn create_texture(&mut self) -> GlTexture {
        let texture = GlTexture(self.alloc());
        self.record(GlCall::CreateTexture(texture));
        texture
    }

    fn delete_texture(&mut self, texture: GlTexture) {
        self.deleted.insert(texture.get());
        if self.texture_2d == Some(texture) {
            self.texture_2d = None;
        }
        self.record(GlCall::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, target: u32, texture: Option<GlTexture>) {
        if target == gl::TEXTURE_2D {
            self.texture_2d = texture;
        }
        self.record(GlCall::BindTexture { target, texture });
    }

    fn active_texture(&mut self, unit: u32) {
        self.active_texture = unit;
        self.record(GlCall::ActiveTexture(unit));
    }

    fn tex_parameter_i(&mut self, target: u32, pname: u32, param: i32) {
        self.record(GlCall::TexParameter {
            target,
            pname,
            param,
        });
    }

    fn tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        kind: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            kind,
            pixels: pixels.map(<[u8]>::to_vec),
        });
    }

    fn parameter(&self, pname: u32) -> ParamValue {
        match pname {
            gl::VENDOR => ParamValue::Str("glbridge".to_string()),
            gl::RENDERER => ParamValue::Str("glbridge recording renderer".to_string()),
            gl::VERSION => ParamValue::Str("WebGL 2.0 (glbridge recording)".to_string()),
            gl::SHADING_LANGUAGE_VERSION => {
                ParamValue::Str("WebGL GLSL ES 3.00 (glbridge recording)".to_string())
            }
            gl::BLEND | gl::CULL_FACE | gl::DEPTH_TEST | gl::STENCIL_TEST | gl::SCISSOR_TEST => {
                bool_param(self.enabled.contains(&pname))
            }
            gl::VIEWPORT => ParamValue::IntArray(self.viewport.to_vec()),
            gl::SCISSOR_BOX => ParamValue::IntArray(self.scissor.to_vec()),
            gl::MAX_TEXTURE_SIZE => ParamValue::Int(4096),
            gl::LINE_WIDTH => ParamValue::Float(self.line_width),
            gl::ACTIVE_TEXTURE => ParamValue::Int(self.active_texture as i32),
            gl::BLEND_SRC_RGB => ParamValue::Int(self.blend_func[0] as i32),
            gl::BLEND_DST_RGB => ParamValue::Int(self.blend_func[1] as i32),
            gl::BLEND_SRC_ALPHA => ParamValue::Int(self.blend_func[2] as i32),
            gl::BLEND_DST_ALPHA => ParamValue::Int(self.blend_func[3] as i32),
            gl::BLEND_EQUATION_RGB => ParamValue::Int(self.blend_equation[0] as i32),
            gl::BLEND_EQUATION_ALPHA => ParamValue::Int(self.blend_equation[1] as i32),
            gl::ARRAY_BUFFER_BINDING => self.array_buffer.map_or(ParamValue::Null, ParamValue::Buffer),
            gl::ELEMENT_ARRAY_BUFFER_BINDING => {
                self.element_buffer.map_or(ParamValue::Null, ParamValue::Buffer)
            }
            gl::CURRENT_PROGRAM => self.current_program.map_or(ParamValue::Null, ParamValue::Program),
            gl::TEXTURE_BINDING_2D => self.texture_2d.map_or(ParamValue::Null, ParamValue::Texture),
            gl::VERTEX_ARRAY_BINDING => {
                self.vertex_array.map_or(ParamValue::Null, ParamValue::VertexArray)
            }
            _ => ParamValue::Unsupported,
        }
    }
}
