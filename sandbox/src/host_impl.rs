//! Per-bridge mutable state held in the Wasmtime Store.
//!
//! `HostState` owns the graphics backend, one handle table per resource
//! kind, the outbound-string scratch address, and the guest log aggregator.
//! It lives inside `Store<HostState<G>>` for the life of a `Bridge`, so
//! handles stay valid across frames.
//!
//! The graphics dispatcher (`dispatch.rs`) and the runtime shim
//! (`shim.rs`) add further `impl` blocks; everything here works on a plain
//! `&mut [u8]` so it can be exercised without a Wasmtime instance.

use std::collections::VecDeque;

use glbridge_hostapi::{
    GlBuffer, GlProgram, GlShader, GlTexture, GlUniformLocation, GlVertexArray, GraphicsApi,
    HandleTable, HostConfig, HostError, LineLogger, LogLine, Severity,
};
use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::marshal;
use crate::memory;

/// Per-bridge mutable state held in the Wasmtime `Store`.
pub struct HostState<G> {
    /// Host graphics backend.
    pub gl: G,
    pub buffers: HandleTable<GlBuffer>,
    pub textures: HandleTable<GlTexture>,
    pub shaders: HandleTable<GlShader>,
    pub programs: HandleTable<GlProgram>,
    pub vertex_arrays: HandleTable<GlVertexArray>,
    pub uniforms: HandleTable<GlUniformLocation>,
    /// Partial-line aggregator shared by `console_logger` and `fd_write`.
    pub logger: LineLogger,
    /// Most recent flushed guest lines, oldest first.
    pub logs: VecDeque<LogLine>,
    /// Guest address of the outbound-string slot, once known.
    pub scratch_ptr: Option<u32>,
    /// Host-side limits.
    pub config: HostConfig,
    /// Wasmtime resource limiter (memory growth cap).
    pub limits: StoreLimits,
    /// Set once `qsort` has warned about leaving an array unsorted.
    pub qsort_warned: bool,
}

impl<G: GraphicsApi> HostState<G> {
    /// Create host state with no memory cap beyond Wasmtime's own.
    pub fn new(gl: G, config: HostConfig) -> Self {
        Self::with_limits(gl, config, StoreLimitsBuilder::new().build())
    }

    /// Create host state with an explicit store limiter.
    pub fn with_limits(gl: G, config: HostConfig, limits: StoreLimits) -> Self {
        Self {
            gl,
            buffers: HandleTable::new("buffer"),
            textures: HandleTable::new("texture"),
            shaders: HandleTable::new("shader"),
            programs: HandleTable::new("program"),
            vertex_arrays: HandleTable::new("vertex array"),
            uniforms: HandleTable::new("uniform location"),
            logger: LineLogger::new(config.max_pending_log_bytes),
            logs: VecDeque::new(),
            scratch_ptr: None,
            config,
            limits,
            qsort_warned: false,
        }
    }

    /// Feed a guest log fragment through the aggregator. A completed line
    /// is emitted to the `log` sink and kept in the bounded history.
    pub fn log(&mut self, severity: Severity, fragment: &str) {
        if let Some(line) = self.logger.push(severity, fragment) {
            self.record_line(line);
        }
    }

    /// Flush an unterminated pending line, if any.
    pub fn flush_log(&mut self, severity: Severity) {
        if let Some(line) = self.logger.flush(severity) {
            self.record_line(line);
        }
    }

    fn record_line(&mut self, line: LogLine) {
        line.emit();
        if self.config.max_log_lines == 0 {
            return;
        }
        if self.logs.len() >= self.config.max_log_lines {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }

    /// Drain the flushed-line history.
    pub fn take_logs(&mut self) -> Vec<LogLine> {
        self.logs.drain(..).collect()
    }

    /// `console_logger(level, ptr, len)`: `len == 0` reads a zero-terminated
    /// string.
    pub fn console_log(&mut self, mem: &[u8], level: i32, ptr: i32, len: i32) -> Result<(), HostError> {
        let len = (len > 0).then_some(len as usize);
        let text = marshal::decode_string(mem, memory::ptr(ptr), len)?;
        self.log(Severity::from_code(level), &text);
        Ok(())
    }
}
