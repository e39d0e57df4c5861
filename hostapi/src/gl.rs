//! GL enum values used by the bridge and the recording backend.
//!
//! Only the constants the dispatcher or `RecordingGl` inspects are listed.
//! Everything else passes through as a raw `u32`.

pub const NO_ERROR: u32 = 0;

// Clear bits
pub const DEPTH_BUFFER_BIT: u32 = 0x0000_0100;
pub const STENCIL_BUFFER_BIT: u32 = 0x0000_0400;
pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;

// Capabilities
pub const CULL_FACE: u32 = 0x0B44;
pub const DEPTH_TEST: u32 = 0x0B71;
pub const STENCIL_TEST: u32 = 0x0B90;
pub const BLEND: u32 = 0x0BE2;
pub const SCISSOR_TEST: u32 = 0x0C11;

// State queries
pub const VIEWPORT: u32 = 0x0BA2;
pub const SCISSOR_BOX: u32 = 0x0C10;
pub const LINE_WIDTH: u32 = 0x0B21;
pub const MAX_TEXTURE_SIZE: u32 = 0x0D33;
pub const BLEND_EQUATION_RGB: u32 = 0x8009;
pub const BLEND_DST_RGB: u32 = 0x80C8;
pub const BLEND_SRC_RGB: u32 = 0x80C9;
pub const BLEND_DST_ALPHA: u32 = 0x80CA;
pub const BLEND_SRC_ALPHA: u32 = 0x80CB;
pub const BLEND_EQUATION_ALPHA: u32 = 0x883D;
pub const ACTIVE_TEXTURE: u32 = 0x84E0;
pub const TEXTURE_BINDING_2D: u32 = 0x8069;
pub const ARRAY_BUFFER_BINDING: u32 = 0x8894;
pub const ELEMENT_ARRAY_BUFFER_BINDING: u32 = 0x8895;
pub const CURRENT_PROGRAM: u32 = 0x8B8D;
pub const VERTEX_ARRAY_BINDING: u32 = 0x85B5;

// Strings
pub const VENDOR: u32 = 0x1F00;
pub const RENDERER: u32 = 0x1F01;
pub const VERSION: u32 = 0x1F02;
pub const SHADING_LANGUAGE_VERSION: u32 = 0x8B8C;

// Buffers
pub const ARRAY_BUFFER: u32 = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
pub const STREAM_DRAW: u32 = 0x88E0;
pub const STATIC_DRAW: u32 = 0x88E4;
pub const DYNAMIC_DRAW: u32 = 0x88E8;

// Shaders and programs
pub const FRAGMENT_SHADER: u32 = 0x8B30;
pub const VERTEX_SHADER: u32 = 0x8B31;
pub const SHADER_TYPE: u32 = 0x8B4F;
pub const DELETE_STATUS: u32 = 0x8B80;
pub const COMPILE_STATUS: u32 = 0x8B81;
pub const LINK_STATUS: u32 = 0x8B82;
pub const INFO_LOG_LENGTH: u32 = 0x8B84;
pub const ATTACHED_SHADERS: u32 = 0x8B85;

// Textures
pub const TEXTURE_2D: u32 = 0x0DE1;
pub const TEXTURE0: u32 = 0x84C0;
pub const UNPACK_ALIGNMENT: u32 = 0x0CF5;

// Pixel formats and types
pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const RED: u32 = 0x1903;
pub const ALPHA: u32 = 0x1906;
pub const RGB: u32 = 0x1907;
pub const RGBA: u32 = 0x1908;
pub const LUMINANCE: u32 = 0x1909;
pub const LUMINANCE_ALPHA: u32 = 0x190A;

// Blend
pub const FUNC_ADD: u32 = 0x8006;
pub const ZERO: u32 = 0;
pub const ONE: u32 = 1;
pub const SRC_ALPHA: u32 = 0x0302;
pub const ONE_MINUS_SRC_ALPHA: u32 = 0x0303;

// Primitives
pub const TRIANGLES: u32 = 0x0004;

/// Name table for diagnostics, sorted by name.
const NAMES: &[(u32, &str)] = &[
    (ACTIVE_TEXTURE, "ACTIVE_TEXTURE"),
    (ARRAY_BUFFER, "ARRAY_BUFFER"),
    (ARRAY_BUFFER_BINDING, "ARRAY_BUFFER_BINDING"),
    (ATTACHED_SHADERS, "ATTACHED_SHADERS"),
    (BLEND, "BLEND"),
    (BLEND_DST_ALPHA, "BLEND_DST_ALPHA"),
    (BLEND_DST_RGB, "BLEND_DST_RGB"),
    (BLEND_EQUATION_ALPHA, "BLEND_EQUATION_ALPHA"),
    (BLEND_EQUATION_RGB, "BLEND_EQUATION_RGB"),
    (BLEND_SRC_ALPHA, "BLEND_SRC_ALPHA"),
    (BLEND_SRC_RGB, "BLEND_SRC_RGB"),
    (COMPILE_STATUS, "COMPILE_STATUS"),
    (CULL_FACE, "CULL_FACE"),
    (CURRENT_PROGRAM, "CURRENT_PROGRAM"),
    (DELETE_STATUS, "DELETE_STATUS"),
    (DEPTH_TEST, "DEPTH_TEST"),
    (ELEMENT_ARRAY_BUFFER, "ELEMENT_ARRAY_BUFFER"),
    (ELEMENT_ARRAY_BUFFER_BINDING, "ELEMENT_ARRAY_BUFFER_BINDING"),
    (FRAGMENT_SHADER, "FRAGMENT_SHADER"),
    (INFO_LOG_LENGTH, "INFO_LOG_LENGTH"),
    (LINE_WIDTH, "LINE_WIDTH"),
    (LINK_STATUS, "LINK_STATUS"),
    (MAX_TEXTURE_SIZE, "MAX_TEXTURE_SIZE"),
    (RENDERER, "RENDERER"),
    (SCISSOR_BOX, "SCISSOR_BOX"),
    (SCISSOR_TEST, "SCISSOR_TEST"),
    (SHADER_TYPE, "SHADER_TYPE"),
    (SHADING_LANGUAGE_VERSION, "SHADING_LANGUAGE_VERSION"),
    (STENCIL_TEST, "STENCIL_TEST"),
    (TEXTURE_2D, "TEXTURE_2D"),
    (TEXTURE_BINDING_2D, "TEXTURE_BINDING_2D"),
    (UNPACK_ALIGNMENT, "UNPACK_ALIGNMENT"),
    (VENDOR, "VENDOR"),
    (VERSION, "VERSION"),
    (VERTEX_ARRAY_BINDING, "VERTEX_ARRAY_BINDING"),
    (VERTEX_SHADER, "VERTEX_SHADER"),
    (VIEWPORT, "VIEWPORT"),
];

/// Symbolic name of a GL enum, if the bridge knows it.
pub fn name_of(value: u32) -> Option<&'static str> {
    NAMES.iter().find(|(v, _)| *v == value).map(|(_, name)| *name)
}

/// Bytes per pixel for an `UNSIGNED_BYTE` upload in `format`.
pub fn bytes_per_pixel(format: u32, kind: u32) -> Option<usize> {
    if kind != UNSIGNED_BYTE {
        return None;
    }
    match format {
        RGBA => Some(4),
        RGB => Some(3),
        LUMINANCE_ALPHA => Some(2),
        LUMINANCE | ALPHA | RED => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_of() {
        assert_eq!(name_of(0x8B81), Some("COMPILE_STATUS"));
        assert_eq!(name_of(VIEWPORT), Some("VIEWPORT"));
        assert_eq!(name_of(0xDEAD), None);
    }

    #[test]
    fn test_names_unique() {
        for (i, (a, _)) in NAMES.iter().enumerate() {
            for (b, name) in &NAMES[i + 1..] {
                assert_ne!(a, b, "duplicate value for {name}");
            }
        }
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(bytes_per_pixel(RGBA, UNSIGNED_BYTE), Some(4));
        assert_eq!(bytes_per_pixel(RGB, UNSIGNED_BYTE), Some(3));
        assert_eq!(bytes_per_pixel(ALPHA, UNSIGNED_BYTE), Some(1));
        assert_eq!(bytes_per_pixel(RGBA, 0x1406), None); // FLOAT
        assert_eq!(bytes_per_pixel(0x1234, UNSIGNED_BYTE), None);
    }
}
