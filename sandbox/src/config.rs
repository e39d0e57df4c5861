//! Sandbox configuration.

use glbridge_hostapi::HostConfig;

/// Configuration for the WASM sandbox.
///
/// Controls memory limits, optional instruction fuel, import linking and the
/// host-side limits of each bridge.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum linear memory pages (1 page = 64 KiB).
    /// Default: 4096 pages = 256 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel per guest entry call. `None` disables metering.
    pub fuel_limit: Option<u64>,

    /// Link imports outside the known surface as traps instead of
    /// rejecting the module at load time.
    pub trap_unknown_imports: bool,

    /// Host-side limits (log history, scratch slot, canned responses).
    pub host: HostConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 4096, // 256 MiB
            fuel_limit: None,
            trap_unknown_imports: false,
            host: HostConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Maximum linear memory in bytes.
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_pages as usize * 65536
    }
}
