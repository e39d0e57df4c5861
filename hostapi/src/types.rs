//! Host-side types shared by the graphics trait, the dispatcher and the
//! frame driver.
//!
//! - `HostConfig` bundles the limits of one bridge instance.
//! - `GlBuffer`, `GlTexture`, ... are opaque host object ids. The guest
//!   never sees them; it sees 1-origin handles into a `HandleTable`.
//! - `ParamValue` is the tagged result of a host parameter query.
//! - `GuestInput` is the fixed-layout per-frame record written into guest
//!   memory.

use std::num::NonZeroU32;

/// Configuration for a single bridge instance.
///
/// These limits are enforced by the host side. The guest cannot change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum number of flushed guest log lines kept in memory.
    pub max_log_lines: usize,
    /// Pending (unterminated) log bytes after which the line is flushed anyway.
    pub max_pending_log_bytes: usize,
    /// Usable bytes at the outbound-string scratch address, NUL included.
    pub scratch_capacity: u32,
    /// Text answered by the `vsnprintf`/`snprintf` shims.
    pub canned_format_response: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_log_lines: 256,
            max_pending_log_bytes: 64 * 1024, // 64 KiB
            scratch_capacity: 1024,
            canned_format_response: "ProggyClean.ttf, 15px".to_string(),
        }
    }
}

macro_rules! host_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw id as allocated by the host backend.
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

host_object!(
    /// Host buffer object.
    GlBuffer
);
host_object!(
    /// Host texture object.
    GlTexture
);
host_object!(
    /// Host shader object.
    GlShader
);
host_object!(
    /// Host program object.
    GlProgram
);
host_object!(
    /// Host vertex array object.
    GlVertexArray
);
host_object!(
    /// Host uniform location. Only meaningful for the program it came from.
    GlUniformLocation
);

/// Result of a host parameter query, tagged by shape.
///
/// The dispatcher pattern-matches on the tag to pick the guest encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// The query has no value (nothing bound).
    Null,
    Bool(bool),
    Int(i32),
    IntArray(Vec<i32>),
    Float(f32),
    Str(String),
    Buffer(GlBuffer),
    Texture(GlTexture),
    Program(GlProgram),
    VertexArray(GlVertexArray),
    /// The host does not recognise the parameter name.
    Unsupported,
}

impl ParamValue {
    /// Short tag name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::IntArray(_) => "int[]",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Buffer(_) => "buffer",
            Self::Texture(_) => "texture",
            Self::Program(_) => "program",
            Self::VertexArray(_) => "vertex array",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Pointer buttons tracked in `GuestInput::buttons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

impl MouseButton {
    /// Bit of this button in the guest button mask.
    pub fn bit(self) -> u32 {
        match self {
            Self::Primary => 1 << 0,
            Self::Secondary => 1 << 1,
            Self::Middle => 1 << 2,
        }
    }
}

/// Per-frame input record written into guest memory.
///
/// Layout (little-endian):
/// ```text
/// [0] i32 width  [4] i32 height  [8] f32 cursor_x  [12] f32 cursor_y
/// [16] i32 wheel  [20] u32 buttons
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuestInput {
    pub width: i32,
    pub height: i32,
    pub cursor_x: f32,
    pub cursor_y: f32,
    pub wheel: i32,
    pub buttons: u32,
}

impl GuestInput {
    /// Encoded size in bytes.
    pub const SIZE: usize = 24;

    /// Encode in the guest layout.
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.width.to_le_bytes());
        out[4..8].copy_from_slice(&self.height.to_le_bytes());
        out[8..12].copy_from_slice(&self.cursor_x.to_le_bytes());
        out[12..16].copy_from_slice(&self.cursor_y.to_le_bytes());
        out[16..20].copy_from_slice(&self.wheel.to_le_bytes());
        out[20..24].copy_from_slice(&self.buttons.to_le_bytes());
        out
    }

    /// Decode from the guest layout.
    pub fn from_le_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        Self {
            width: i32::from_le_bytes(word(0)),
            height: i32::from_le_bytes(word(4)),
            cursor_x: f32::from_le_bytes(word(8)),
            cursor_y: f32::from_le_bytes(word(12)),
            wheel: i32::from_le_bytes(word(16)),
            buttons: u32::from_le_bytes(word(20)),
        }
    }

    /// Returns true if `button` is held in this frame.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons & button.bit() != 0
    }
}
