//! Shared test helpers for integration tests.
//!
//! Provides logger setup, a complete WAT guest that draws one triangle,
//! and sandbox factory functions used across all integration test files.

#![allow(dead_code)]

use glbridge_hostapi::{GlCall, RecordingGl};
use glbridge_sandbox::{Bridge, Sandbox, SandboxConfig};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ── Guest Layout ──

/// Address the triangle guest reports through `getGlobalInput`.
pub const INPUT_PTR: usize = 1024;
/// Address the triangle guest reports through `getGlobalAddress`.
pub const SCRATCH_PTR: usize = 2048;
/// `genBuffers` output slot.
pub const VBO_SLOT: usize = 600;
/// `genVertexArrays` output slot.
pub const VAO_SLOT: usize = 604;
/// Vertex payload uploaded by `bufferData`.
pub const VERTEX_BYTES: &[u8] = b"abcdefghijklmnopqrstuvwx";

/// A guest that builds a shader program, a vertex buffer and a vertex
/// array in `init`, then clears and draws one triangle per frame using the
/// input record for the viewport and the cursor x for a uniform.
pub const TRIANGLE_GUEST: &str = r#"
(module
    (import "env" "createShader" (func $createShader (param i32) (result i32)))
    (import "env" "shaderSource" (func $shaderSource (param i32 i32 i32 i32)))
    (import "env" "compileShader" (func $compileShader (param i32)))
    (import "env" "createProgram" (func $createProgram (result i32)))
    (import "env" "attachShader" (func $attachShader (param i32 i32)))
    (import "env" "linkProgram" (func $linkProgram (param i32)))
    (import "env" "getUniformLocation" (func $getUniformLocation (param i32 i32) (result i32)))
    (import "env" "getAttribLocation" (func $getAttribLocation (param i32 i32) (result i32)))
    (import "env" "genBuffers" (func $genBuffers (param i32 i32)))
    (import "env" "bindBuffer" (func $bindBuffer (param i32 i32)))
    (import "env" "bufferData" (func $bufferData (param i32 i32 i32 i32)))
    (import "env" "genVertexArrays" (func $genVertexArrays (param i32 i32)))
    (import "env" "bindVertexArray" (func $bindVertexArray (param i32)))
    (import "env" "vertexAttribPointer" (func $vertexAttribPointer (param i32 i32 i32 i32 i32 i32)))
    (import "env" "viewport" (func $viewport (param i32 i32 i32 i32)))
    (import "env" "clearColor" (func $clearColor (param f32 f32 f32 f32)))
    (import "env" "clear" (func $clear (param i32)))
    (import "env" "useProgram" (func $useProgram (param i32)))
    (import "env" "uniform1f" (func $uniform1f (param i32 f32)))
    (import "env" "drawArrays" (func $drawArrays (param i32 i32 i32)))
    (import "env" "console_logger" (func $console_logger (param i32 i32 i32)))

    (memory (export "memory") 1)

    (data (i32.const 64) "attribute vec2 aPos; void main() { gl_Position = vec4(aPos, 0.0, 1.0); }\00")
    (data (i32.const 160) "uniform float uTime; void main() { gl_FragColor = vec4(uTime); }\00")
    (data (i32.const 256) "uTime\00")
    (data (i32.const 272) "aPos\00")
    (data (i32.const 288) "renderer ready\n\00")
    (data (i32.const 320) "abcdefghijklmnopqrstuvwx")
    (data (i32.const 512) "\40\00\00\00\a0\00\00\00")

    (global $vs (mut i32) (i32.const 0))
    (global $fs (mut i32) (i32.const 0))
    (global $prog (mut i32) (i32.const 0))
    (global $loc (mut i32) (i32.const 0))

    (func (export "getGlobalInput") (result i32) i32.const 1024)
    (func (export "getGlobalAddress") (result i32) i32.const 2048)

    (func (export "init")
        (global.set $vs (call $createShader (i32.const 0x8B31)))
        (call $shaderSource (global.get $vs) (i32.const 1) (i32.const 512) (i32.const 0))
        (call $compileShader (global.get $vs))
        (global.set $fs (call $createShader (i32.const 0x8B30)))
        (call $shaderSource (global.get $fs) (i32.const 1) (i32.const 516) (i32.const 0))
        (call $compileShader (global.get $fs))
        (global.set $prog (call $createProgram))
        (call $attachShader (global.get $prog) (global.get $vs))
        (call $attachShader (global.get $prog) (global.get $fs))
        (call $linkProgram (global.get $prog))
        (global.set $loc (call $getUniformLocation (global.get $prog) (i32.const 256)))
        (call $genBuffers (i32.const 1) (i32.const 600))
        (call $bindBuffer (i32.const 0x8892) (i32.load (i32.const 600)))
        (call $bufferData (i32.const 0x8892) (i32.const 24) (i32.const 320) (i32.const 0x88E4))
        (call $genVertexArrays (i32.const 1) (i32.const 604))
        (call $bindVertexArray (i32.load (i32.const 604)))
        (call $vertexAttribPointer
            (call $getAttribLocation (global.get $prog) (i32.const 272))
            (i32.const 2) (i32.const 0x1406) (i32.const 0) (i32.const 8) (i32.const 0))
        (call $console_logger (i32.const 2) (i32.const 288) (i32.const 0))
    )

    (func (export "render") (param $p i32)
        (call $viewport (i32.const 0) (i32.const 0)
            (i32.load (local.get $p))
            (i32.load offset=4 (local.get $p)))
        (call $clearColor (f32.const 0.25) (f32.const 0.5) (f32.const 0.75) (f32.const 1.0))
        (call $clear (i32.const 0x4000))
        (call $useProgram (global.get $prog))
        (call $uniform1f (global.get $loc) (f32.load offset=8 (local.get $p)))
        (call $bindVertexArray (i32.load (i32.const 604)))
        (call $drawArrays (i32.const 4) (i32.const 0) (i32.const 3))
    )
)
"#;

/// Wrap `imports` and `body` in a module exporting `memory`, `init` and a
/// no-argument `render`. `body` must define the `init` export itself.
pub fn guest(imports: &str, body: &str) -> String {
    format!(
        r#"(module
            {imports}
            (memory (export "memory") 1)
            {body}
            (func (export "render"))
        )"#
    )
}

// ── Sandbox Loaders ──

pub fn load(wat: &str) -> Sandbox {
    load_with_config(wat, SandboxConfig::default())
}

pub fn load_with_config(wat: &str, config: SandboxConfig) -> Sandbox {
    init_logging();
    Sandbox::new(wat.as_bytes(), config).expect("failed to load guest")
}

/// Instantiate `wat` against a fresh recording backend.
pub fn bridge(wat: &str) -> Bridge<RecordingGl> {
    load(wat)
        .instantiate(RecordingGl::new())
        .expect("failed to instantiate guest")
}

// ── Inspection ──

/// Import names of the recorded calls, in order.
pub fn call_names(calls: &[GlCall]) -> Vec<&'static str> {
    calls.iter().map(GlCall::name).collect()
}

pub fn read_u32(mem: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(mem[at..at + 4].try_into().unwrap())
}

pub fn read_i32(mem: &[u8], at: usize) -> i32 {
    read_u32(mem, at) as i32
}

/// Zero-terminated string at `at`.
pub fn read_cstr(mem: &[u8], at: usize) -> String {
    let end = mem[at..].iter().position(|&b| b == 0).map_or(mem.len(), |n| at + n);
    String::from_utf8_lossy(&mem[at..end]).into_owned()
}
