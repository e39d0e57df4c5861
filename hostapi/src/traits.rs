//! Graphics API trait: the host side of every imported graphics call.
//!
//! The sandbox owns one implementation per bridge instance. Each method
//! corresponds to one host graphics operation; the dispatcher has already
//! resolved guest handles to host objects and guest pointers to slices, so
//! this trait works with Rust types only.
//!
//! Binding methods take `Option<_>`: `None` is the host's null binding.
//! Host-side failures (a shader that does not compile) are state, not
//! errors, and are observed through the query methods.

use crate::types::{
    GlBuffer, GlProgram, GlShader, GlTexture, GlUniformLocation, GlVertexArray, ParamValue,
};

/// Host implementation of the graphics call surface.
pub trait GraphicsApi: Send + 'static {
    // ── Global state ──

    fn enable(&mut self, cap: u32);
    fn disable(&mut self, cap: u32);
    fn is_enabled(&self, cap: u32) -> bool;
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear(&mut self, mask: u32);
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    fn pixel_store_i(&mut self, pname: u32, param: i32);

    // ── Blending ──

    fn blend_equation(&mut self, mode: u32);
    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32);
    fn blend_func(&mut self, src: u32, dst: u32);
    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);

    // ── Buffers ──

    fn create_buffer(&mut self) -> GlBuffer;
    fn delete_buffer(&mut self, buffer: GlBuffer);
    fn bind_buffer(&mut self, target: u32, buffer: Option<GlBuffer>);

    /// Upload `data` to the buffer bound at `target`, or allocate `size`
    /// uninitialised bytes when `data` is `None`.
    fn buffer_data(&mut self, target: u32, size: usize, data: Option<&[u8]>, usage: u32);
    fn buffer_sub_data(&mut self, target: u32, offset: i32, data: &[u8]);

    // ── Shaders ──

    fn create_shader(&mut self, kind: u32) -> GlShader;
    fn delete_shader(&mut self, shader: GlShader);
    fn shader_source(&mut self, shader: GlShader, source: &str);
    fn compile_shader(&mut self, shader: GlShader);
    fn shader_parameter(&self, shader: GlShader, pname: u32) -> ParamValue;

    /// `None` when the host has no log for this shader.
    fn shader_info_log(&self, shader: GlShader) -> Option<String>;

    // ── Programs ──

    fn create_program(&mut self) -> GlProgram;
    fn delete_program(&mut self, program: GlProgram);
    fn attach_shader(&mut self, program: GlProgram, shader: GlShader);
    fn detach_shader(&mut self, program: GlProgram, shader: GlShader);
    fn link_program(&mut self, program: GlProgram);
    fn program_parameter(&self, program: GlProgram, pname: u32) -> ParamValue;
    fn program_info_log(&self, program: GlProgram) -> Option<String>;
    fn use_program(&mut self, program: Option<GlProgram>);

    /// `None` when the program has no active uniform called `name`.
    fn uniform_location(&mut self, program: GlProgram, name: &str) -> Option<GlUniformLocation>;

    /// `-1` when the program has no attribute called `name`.
    fn attrib_location(&mut self, program: GlProgram, name: &str) -> i32;

    fn uniform_1i(&mut self, location: Option<GlUniformLocation>, value: i32);
    fn uniform_1f(&mut self, location: Option<GlUniformLocation>, value: f32);

    /// `values` holds whole 4x4 matrices, column-major unless `transpose`.
    fn uniform_matrix_4fv(&mut self, location: Option<GlUniformLocation>, transpose: bool, values: &[f32]);

    // ── Vertex specification ──

    fn create_vertex_array(&mut self) -> GlVertexArray;
    fn delete_vertex_array(&mut self, array: GlVertexArray);
    fn bind_vertex_array(&mut self, array: Option<GlVertexArray>);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        kind: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    // ── Drawing ──

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32);

    /// `offset` is a byte offset into the bound element array buffer.
    fn draw_elements(&mut self, mode: u32, count: i32, kind: u32, offset: i32);

    // ── Textures ──

    fn create_texture(&mut self) -> GlTexture;
    fn delete_texture(&mut self, texture: GlTexture);
    fn bind_texture(&mut self, target: u32, texture: Option<GlTexture>);
    fn active_texture(&mut self, unit: u32);
    fn tex_parameter_i(&mut self, target: u32, pname: u32, param: i32);

    #[allow(clippy::too_many_arguments)]
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
    );

    // ── Queries ──

    /// Current value of a global parameter (`getParameter`).
    fn parameter(&self, pname: u32) -> ParamValue;
}
