//! `glbridge-hostapi`: host graphics traits and guest-facing types for the
//! glbridge WASM host.
//!
//! This crate defines what the sandbox needs from the host side, without
//! depending on any WASM engine. It provides:
//!
//! - `GraphicsApi` trait, the host graphics call surface
//! - `RecordingGl`, a headless `GraphicsApi` that records every call
//! - `HandleTable`, 1-origin guest handle tables
//! - `LineLogger`, partial-line aggregation for guest log output
//! - `HostConfig`, `GuestInput` and the host object id types
//! - `HostError` and the WASI `Errno` subset
//! - `gl`, the GL enum values the bridge inspects

pub mod error;
pub mod gl;
pub mod handles;
pub mod logger;
pub mod recording;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root.
pub use error::{Errno, HostError};
pub use handles::HandleTable;
pub use logger::{LineLogger, LogLine, Severity};
pub use recording::{GlCall, RecordingGl};
pub use traits::GraphicsApi;
pub use types::{
    GlBuffer, GlProgram, GlShader, GlTexture, GlUniformLocation, GlVertexArray, GuestInput,
    HostConfig, MouseButton, ParamValue,
};
