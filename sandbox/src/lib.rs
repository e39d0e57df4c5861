//! `glbridge-sandbox`: Wasmtime host bridge for WASM graphics guests.
//!
//! This crate loads, validates, and drives a guest module that renders
//! through a GL-shaped import surface. It provides:
//!
//! - **ABI validation:** `init`/`render`/`memory` exports and a known import surface
//! - **Graphics dispatch:** handle tables translating guest integers to host objects
//! - **Runtime shim:** the WASI and libc entry points a C toolchain links against
//! - **Guest logging:** partial-line aggregation routed to the `log` facade
//! - **Memory limits:** bounded linear memory growth, optional fuel per call
//!
//! The primary entry points are [`Sandbox::instantiate`] and
//! [`Bridge::render_frame`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host_impl;
pub mod input;
pub mod linker;
pub mod marshal;
pub mod memory;
pub mod runtime;
pub mod shim;
pub mod validation;

pub use config::SandboxConfig;
pub use error::SandboxError;
pub use host_impl::HostState;
pub use input::PointerState;
pub use runtime::{Bridge, Sandbox};
pub use validation::RenderAbi;
