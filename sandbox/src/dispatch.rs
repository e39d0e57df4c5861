//! Graphics call dispatcher.
//!
//! One method per imported graphics call that needs more than a direct
//! forward: handle translation, guest buffer marshaling, or out-parameters.
//! Calls that take only scalars are forwarded straight to `GraphicsApi` by
//! the linker.
//!
//! Conventions shared by every method:
//!
//! - a handle `<= 0` means "none"; binds pass `None`, other calls are no-ops;
//! - a handle past the end of its table also resolves to "none";
//! - upload sizes are clamped to existing memory;
//! - out-parameters are written little-endian, 32-bit.

use glbridge_hostapi::{gl, GraphicsApi, HandleTable, HostError, ParamValue};

use crate::host_impl::HostState;
use crate::marshal;
use crate::memory::{self, ptr};

/// Text copied to the scratch slot when `getString` gets a non-string answer.
pub const NO_STRING: &str = "no getString";

/// Create `n` host objects and write their handles to `out`.
///
/// The whole output range is validated first, so a bad pointer creates
/// nothing.
fn gen_into<T: Copy + PartialEq>(
    mem: &mut [u8],
    n: i32,
    out: i32,
    table: &mut HandleTable<T>,
    mut create: impl FnMut() -> T,
) -> Result<(), HostError> {
    let len = memory::elements(n, 4);
    let slots = memory::view_mut(mem, ptr(out), len)?;
    for slot in slots.chunks_exact_mut(4) {
        let handle = table.insert(create());
        slot.copy_from_slice(&handle.to_le_bytes());
    }
    Ok(())
}

/// Read `n` handles from `src` and resolve each against `table`.
fn read_handles<T: Copy + PartialEq>(
    mem: &[u8],
    n: i32,
    src: i32,
    table: &HandleTable<T>,
) -> Result<Vec<T>, HostError> {
    let bytes = memory::view(mem, ptr(src), memory::elements(n, 4))?;
    Ok(bytes
        .chunks_exact(4)
        .filter_map(|c| table.resolve(i32::from_le_bytes([c[0], c[1], c[2], c[3]])))
        .collect())
}

/// Guest encoding of a status-like query result.
fn status_word(value: &ParamValue) -> i32 {
    match value {
        ParamValue::Bool(b) => *b as i32,
        ParamValue::Int(i) => (*i != 0) as i32,
        _ => 0,
    }
}

fn is_status_query(pname: u32) -> bool {
    matches!(pname, gl::COMPILE_STATUS | gl::LINK_STATUS | gl::DELETE_STATUS)
}

fn describe(pname: u32) -> String {
    match gl::name_of(pname) {
        Some(name) => format!("{name} ({pname:#06x})"),
        None => format!("{pname:#06x}"),
    }
}

/// Encode a shader/program parameter. `-1` for shapes the guest cannot use.
fn object_param_word(call: &str, pname: u32, value: &ParamValue) -> i32 {
    if is_status_query(pname) {
        return status_word(value);
    }
    match value {
        ParamValue::Int(i) => *i,
        ParamValue::Bool(b) => *b as i32,
        other => {
            log::warn!("{}: {} returned {}, writing -1", call, describe(pname), other.kind());
            -1
        }
    }
}

impl<G: GraphicsApi> HostState<G> {
    // ── Strings ──

    /// `getString(name)`: copy a string parameter into the scratch slot.
    pub fn get_string(&mut self, mem: &mut [u8], name: i32, scratch: u32) -> Result<i32, HostError> {
        let text = match self.gl.parameter(name as u32) {
            ParamValue::Str(s) => s,
            other => {
                log::debug!("getString: {} is {}", describe(name as u32), other.kind());
                NO_STRING.to_string()
            }
        };
        let p = marshal::write_outbound_string(mem, &text, scratch, self.config.scratch_capacity)?;
        Ok(p as i32)
    }

    // ── Buffers ──

    pub fn gen_buffers(&mut self, mem: &mut [u8], n: i32, out: i32) -> Result<(), HostError> {
        gen_into(mem, n, out, &mut self.buffers, || self.gl.create_buffer())
    }

    pub fn delete_buffers(&mut self, mem: &[u8], n: i32, src: i32) -> Result<(), HostError> {
        for buffer in read_handles(mem, n, src, &self.buffers)? {
            self.gl.delete_buffer(buffer);
        }
        Ok(())
    }

    pub fn bind_buffer(&mut self, target: i32, buffer: i32) {
        let buffer = self.buffers.resolve(buffer);
        self.gl.bind_buffer(target as u32, buffer);
    }

    /// `bufferData(target, size, data, usage)`. A null `data` allocates
    /// `size` bytes without contents.
    pub fn buffer_data(&mut self, mem: &[u8], target: i32, size: i32, data: i32, usage: i32) {
        let size = size.max(0) as usize;
        if data == 0 {
            self.gl.buffer_data(target as u32, size, None, usage as u32);
            return;
        }
        let bytes = memory::view_clamped(mem, ptr(data), size, "bufferData");
        self.gl
            .buffer_data(target as u32, bytes.len(), Some(bytes), usage as u32);
    }

    pub fn buffer_sub_data(&mut self, mem: &[u8], target: i32, offset: i32, size: i32, data: i32) {
        let bytes = memory::view_clamped(mem, ptr(data), size.max(0) as usize, "bufferSubData");
        self.gl.buffer_sub_data(target as u32, offset, bytes);
    }

    // ── Shaders ──

    pub fn create_shader(&mut self, kind: i32) -> i32 {
        let shader = self.gl.create_shader(kind as u32);
        self.shaders.insert(shader)
    }

    pub fn delete_shader(&mut self, shader: i32) {
        if let Some(shader) = self.shaders.resolve(shader) {
            self.gl.delete_shader(shader);
        }
    }

    /// `shaderSource(shader, count, strings, lengths)`: concatenate `count`
    /// guest strings. A null `lengths`, or a negative entry in it, means the
    /// string is zero-terminated.
    pub fn shader_source(
        &mut self,
        mem: &[u8],
        shader: i32,
        count: i32,
        strings: i32,
        lengths: i32,
    ) -> Result<(), HostError> {
        let Some(shader) = self.shaders.resolve(shader) else {
            return Ok(());
        };
        let mut source = String::new();
        for i in 0..count.max(0) as u32 {
            let p = memory::read_u32(mem, ptr(strings).wrapping_add(i * 4))?;
            let len = if lengths == 0 {
                None
            } else {
                let len = memory::read_i32(mem, ptr(lengths).wrapping_add(i * 4))?;
                (len >= 0).then_some(len as usize)
            };
            source.push_str(&marshal::decode_string(mem, p, len)?);
        }
        self.gl.shader_source(shader, &source);
        Ok(())
    }

    pub fn compile_shader(&mut self, shader: i32) {
        if let Some(shader) = self.shaders.resolve(shader) {
            self.gl.compile_shader(shader);
        }
    }

    pub fn get_shader_iv(&mut self, mem: &mut [u8], shader: i32, pname: i32, out: i32) -> Result<(), HostError> {
        let Some(shader) = self.shaders.resolve(shader) else {
            return Ok(());
        };
        let value = self.gl.shader_parameter(shader, pname as u32);
        let word = object_param_word("getShaderiv", pname as u32, &value);
        memory::write_i32(mem, ptr(out), word)
    }

    pub fn get_shader_info_log(
        &mut self,
        mem: &mut [u8],
        shader: i32,
        max_len: i32,
        length_out: i32,
        out: i32,
    ) -> Result<(), HostError> {
        let Some(shader) = self.shaders.resolve(shader) else {
            return Ok(());
        };
        let log = self.gl.shader_info_log(shader);
        write_info_log(mem, log.as_deref(), max_len, length_out, out)
    }

    // ── Programs ──

    pub fn create_program(&mut self) -> i32 {
        let program = self.gl.create_program();
        self.programs.insert(program)
    }

    pub fn delete_program(&mut self, program: i32) {
        if let Some(program) = self.programs.resolve(program) {
            self.gl.delete_program(program);
        }
    }

    pub fn attach_shader(&mut self, program: i32, shader: i32) {
        if let (Some(program), Some(shader)) =
            (self.programs.resolve(program), self.shaders.resolve(shader))
        {
            self.gl.attach_shader(program, shader);
        }
    }

    pub fn detach_shader(&mut self, program: i32, shader: i32) {
        if let (Some(program), Some(shader)) =
            (self.programs.resolve(program), self.shaders.resolve(shader))
        {
            self.gl.detach_shader(program, shader);
        }
    }

    pub fn link_program(&mut self, program: i32) {
        if let Some(program) = self.programs.resolve(program) {
            self.gl.link_program(program);
        }
    }

    pub fn get_program_iv(&mut self, mem: &mut [u8], program: i32, pname: i32, out: i32) -> Result<(), HostError> {
        let Some(program) = self.programs.resolve(program) else {
            return Ok(());
        };
        let value = self.gl.program_parameter(program, pname as u32);
        let word = object_param_word("getProgramiv", pname as u32, &value);
        memory::write_i32(mem, ptr(out), word)
    }

    pub fn get_program_info_log(
        &mut self,
        mem: &mut [u8],
        program: i32,
        max_len: i32,
        length_out: i32,
        out: i32,
    ) -> Result<(), HostError> {
        let Some(program) = self.programs.resolve(program) else {
            return Ok(());
        };
        let log = self.gl.program_info_log(program);
        write_info_log(mem, log.as_deref(), max_len, length_out, out)
    }

    /// `useProgram(0)` unbinds.
    pub fn use_program(&mut self, program: i32) {
        let program = self.programs.resolve(program);
        self.gl.use_program(program);
    }

    /// Returns a 1-origin uniform handle, or `-1` if the program has no such
    /// uniform. Misses do not grow the table.
    pub fn get_uniform_location(&mut self, mem: &[u8], program: i32, name: i32) -> Result<i32, HostError> {
        let Some(program) = self.programs.resolve(program) else {
            return Ok(-1);
        };
        let name = marshal::decode_string(mem, ptr(name), None)?;
        match self.gl.uniform_location(program, &name) {
            Some(location) => Ok(self.uniforms.insert(location)),
            None => {
                log::debug!("getUniformLocation: no uniform {:?}", name);
                Ok(-1)
            }
        }
    }

    pub fn get_attrib_location(&mut self, mem: &[u8], program: i32, name: i32) -> Result<i32, HostError> {
        let Some(program) = self.programs.resolve(program) else {
            return Ok(-1);
        };
        let name = marshal::decode_string(mem, ptr(name), None)?;
        Ok(self.gl.attrib_location(program, &name))
    }

    pub fn uniform_1i(&mut self, location: i32, value: i32) {
        let location = self.uniforms.resolve(location);
        self.gl.uniform_1i(location, value);
    }

    pub fn uniform_1f(&mut self, location: i32, value: f32) {
        let location = self.uniforms.resolve(location);
        self.gl.uniform_1f(location, value);
    }

    /// `uniformMatrix4fv(location, count, transpose, value)`: `count` whole
    /// 4x4 float matrices.
    pub fn uniform_matrix_4fv(&mut self, mem: &[u8], location: i32, count: i32, transpose: i32, value: i32) {
        let location = self.uniforms.resolve(location);
        let bytes = memory::view_clamped(mem, ptr(value), memory::elements(count, 64), "uniformMatrix4fv");
        let mut values = memory::f32s(bytes);
        values.truncate(values.len() / 16 * 16);
        self.gl.uniform_matrix_4fv(location, transpose != 0, &values);
    }

    // ── Queries ──

    /// `getIntegerv(pname, data)`: encode a global parameter for the guest.
    pub fn get_integerv(&mut self, mem: &mut [u8], pname: i32, out: i32) -> Result<(), HostError> {
        let pname = pname as u32;
        let words: Vec<i32> = match self.gl.parameter(pname) {
            ParamValue::Null => vec![0],
            ParamValue::Bool(b) => vec![b as i32],
            ParamValue::Int(i) => vec![i],
            ParamValue::IntArray(values) => values,
            ParamValue::Buffer(buffer) => vec![self.buffers.handle_of(&buffer)],
            ParamValue::Texture(texture) => vec![self.textures.handle_of(&texture)],
            ParamValue::Program(program) => vec![self.programs.handle_of(&program)],
            ParamValue::VertexArray(array) => vec![self.vertex_arrays.handle_of(&array)],
            ParamValue::Float(f) if f.is_finite() && f.fract() == 0.0 => vec![f as i32],
            other @ (ParamValue::Float(_) | ParamValue::Str(_)) => {
                log::warn!("getIntegerv: {} is a {}, writing -1", describe(pname), other.kind());
                vec![-1]
            }
            ParamValue::Unsupported => {
                log::warn!("getIntegerv: unsupported parameter {}, writing -1", describe(pname));
                vec![-1]
            }
        };
        let out = memory::view_mut(mem, ptr(out), words.len() * 4)?;
        for (slot, word) in out.chunks_exact_mut(4).zip(words) {
            slot.copy_from_slice(&word.to_le_bytes());
        }
        Ok(())
    }

    // ── Textures ──

    pub fn gen_textures(&mut self, mem: &mut [u8], n: i32, out: i32) -> Result<(), HostError> {
        gen_into(mem, n, out, &mut self.textures, || self.gl.create_texture())
    }

    pub fn delete_textures(&mut self, mem: &[u8], n: i32, src: i32) -> Result<(), HostError> {
        for texture in read_handles(mem, n, src, &self.textures)? {
            self.gl.delete_texture(texture);
        }
        Ok(())
    }

    pub fn bind_texture(&mut self, target: i32, texture: i32) {
        let texture = self.textures.resolve(texture);
        self.gl.bind_texture(target as u32, texture);
    }

    /// `texImage2D(...)`: pixel data is sized from the format; formats the
    /// bridge cannot size are passed without pixels.
    #[allow(clippy::too_many_arguments)]
    pub fn tex_image_2d(
        &mut self,
        mem: &[u8],
        target: i32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: i32,
        kind: i32,
        data: i32,
    ) {
        let (format, kind) = (format as u32, kind as u32);
        let pixels = if data == 0 {
            None
        } else {
            match gl::bytes_per_pixel(format, kind) {
                Some(bpp) => {
                    let len = memory::elements(width, bpp).saturating_mul(height.max(0) as usize);
                    Some(memory::view_clamped(mem, ptr(data), len, "texImage2D"))
                }
                None => {
                    log::error!(
                        "texImage2D: unknown format {} / type {:#06x}, uploading no pixels",
                        describe(format),
                        kind
                    );
                    None
                }
            }
        };
        self.gl.tex_image_2d(
            target as u32,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            kind,
            pixels,
        );
    }

    // ── Vertex arrays ──

    pub fn gen_vertex_arrays(&mut self, mem: &mut [u8], n: i32, out: i32) -> Result<(), HostError> {
        gen_into(mem, n, out, &mut self.vertex_arrays, || self.gl.create_vertex_array())
    }

    pub fn delete_vertex_arrays(&mut self, mem: &[u8], n: i32, src: i32) -> Result<(), HostError> {
        for array in read_handles(mem, n, src, &self.vertex_arrays)? {
            self.gl.delete_vertex_array(array);
        }
        Ok(())
    }

    pub fn bind_vertex_array(&mut self, array: i32) {
        let array = self.vertex_arrays.resolve(array);
        self.gl.bind_vertex_array(array);
    }
}

/// Shared tail of `getShaderInfoLog`/`getProgramInfoLog`.
fn write_info_log(
    mem: &mut [u8],
    log: Option<&str>,
    max_len: i32,
    length_out: i32,
    out: i32,
) -> Result<(), HostError> {
    match log {
        Some(text) => {
            marshal::encode_string_into(mem, text, ptr(out), max_len.max(0) as usize, ptr(length_out))?;
        }
        None if length_out != 0 => memory::write_u32(mem, ptr(length_out), 0)?,
        None => {}
    }
    Ok(())
}
