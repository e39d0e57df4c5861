//! Sandbox error types.

use glbridge_hostapi::HostError;

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Wasmtime engine, compilation, linking or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, bad imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A fatal host condition aborted the guest call.
    #[error("host error: {0}")]
    HostError(#[from] HostError),

    /// Memory operation failed (missing export, out-of-bounds input record).
    #[error("memory error: {0}")]
    MemoryError(String),

    /// Fuel exhausted during a guest entry call.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// The guest called `proc_exit`.
    #[error("guest exited with status {0}")]
    GuestExited(i32),

    /// WASM guest trapped.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}
