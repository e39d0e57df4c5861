//! Integration tests for the WASI and libc shim as seen from a guest.

mod common;

use glbridge_hostapi::{HostError, Severity};
use glbridge_sandbox::SandboxError;

use common::*;

// ── WASI ──

#[test]
fn test_fd_write_logs_each_iovec() {
    let wat = guest(
        r#"(import "wasi_snapshot_preview1" "fd_write"
               (func $fd_write (param i32 i32 i32 i32) (result i32)))"#,
        r#"(data (i32.const 16) "\40\00\00\00\06\00\00\00\50\00\00\00\07\00\00\00")
           (data (i32.const 64) "hello\n")
           (data (i32.const 80) "  world")
           (func (export "init")
               (i32.store (i32.const 36)
                   (call $fd_write (i32.const 1) (i32.const 16) (i32.const 2) (i32.const 32))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();

    let mem = bridge.guest_memory();
    assert_eq!(read_i32(mem, 36), 0);
    assert_eq!(read_u32(mem, 32), 13);

    let lines = bridge.host_state_mut().take_logs();
    let messages: Vec<&str> = lines.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(messages, vec!["hello\n", "world\n"]);
    assert!(lines.iter().all(|l| l.severity == Severity::Info));
}

#[test]
fn test_fd_write_bad_iovec_is_fault() {
    let wat = guest(
        r#"(import "wasi_snapshot_preview1" "fd_write"
               (func $fd_write (param i32 i32 i32 i32) (result i32)))"#,
        r#"(func (export "init")
               (i32.store (i32.const 0)
                   (call $fd_write (i32.const 1) (i32.const 65532) (i32.const 1) (i32.const 8))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();
    assert_eq!(read_i32(bridge.guest_memory(), 0), 21);
}

#[test]
fn test_wasi_stubs() {
    let wat = guest(
        r#"(import "wasi_snapshot_preview1" "args_sizes_get" (func $args_sizes_get (param i32 i32) (result i32)))
           (import "wasi_snapshot_preview1" "fd_prestat_get" (func $fd_prestat_get (param i32 i32) (result i32)))
           (import "wasi_snapshot_preview1" "fd_read" (func $fd_read (param i32 i32 i32 i32) (result i32)))
           (import "wasi_snapshot_preview1" "fd_close" (func $fd_close (param i32) (result i32)))"#,
        r#"(data (i32.const 100) "\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff\ff")
           (func (export "init")
               (i32.store (i32.const 0) (call $args_sizes_get (i32.const 100) (i32.const 104)))
               (i32.store (i32.const 4) (call $fd_prestat_get (i32.const 3) (i32.const 200)))
               (i32.store (i32.const 8) (call $fd_read (i32.const 0) (i32.const 0) (i32.const 0) (i32.const 108)))
               (i32.store (i32.const 12) (call $fd_close (i32.const 3))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();

    let mem = bridge.guest_memory();
    assert_eq!(read_i32(mem, 0), 0);
    assert_eq!(read_u32(mem, 100), 0);
    assert_eq!(read_u32(mem, 104), 0);
    // No preopened directories.
    assert_eq!(read_i32(mem, 4), 8);
    // End of file.
    assert_eq!(read_i32(mem, 8), 0);
    assert_eq!(read_u32(mem, 108), 0);
    assert_eq!(read_i32(mem, 12), 0);
}

#[test]
fn test_proc_exit_ends_the_call() {
    let wat = guest(
        r#"(import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))"#,
        r#"(func (export "init") (call $proc_exit (i32.const 7)))"#,
    );
    let mut bridge = bridge(&wat);
    let err = bridge.init().unwrap_err();
    assert!(matches!(err, SandboxError::GuestExited(7)), "{err}");
}

// ── Allocator forwarding ──

#[test]
fn test_malloc_and_free_forward_to_guest() {
    let wat = guest(
        r#"(import "env" "malloc" (func $malloc (param i32) (result i32)))
           (import "env" "free" (func $free (param i32)))"#,
        r#"(global $freed (mut i32) (i32.const 0))
           (func (export "my_malloc") (param $n i32) (result i32)
               (i32.add (i32.const 4096) (local.get $n)))
           (func (export "my_free") (param $p i32)
               (i32.store (i32.const 12) (local.get $p)))
           (func (export "init")
               (i32.store (i32.const 8) (call $malloc (i32.const 16)))
               (call $free (i32.const 4112)))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();
    let mem = bridge.guest_memory();
    assert_eq!(read_i32(mem, 8), 4112);
    assert_eq!(read_i32(mem, 12), 4112);
}

#[test]
fn test_malloc_without_guest_allocator_traps() {
    let wat = guest(
        r#"(import "env" "malloc" (func $malloc (param i32) (result i32)))"#,
        r#"(func (export "init") (drop (call $malloc (i32.const 16))))"#,
    );
    let mut bridge = bridge(&wat);
    let err = bridge.init().unwrap_err();
    assert!(matches!(
        err,
        SandboxError::HostError(HostError::MissingExport("my_malloc"))
    ));
}

// ── libc ──

#[test]
fn test_memory_and_string_functions() {
    let wat = guest(
        r#"(import "env" "memcpy" (func $memcpy (param i32 i32 i32) (result i32)))
           (import "env" "memset" (func $memset (param i32 i32 i32) (result i32)))
           (import "env" "strlen" (func $strlen (param i32) (result i32)))
           (import "env" "strcmp" (func $strcmp (param i32 i32) (result i32)))
           (import "env" "toupper" (func $toupper (param i32) (result i32)))"#,
        r#"(data (i32.const 64) "shader\00")
           (func (export "init")
               (drop (call $memset (i32.const 100) (i32.const 0x2a) (i32.const 16)))
               (drop (call $memcpy (i32.const 100) (i32.const 64) (i32.const 7)))
               (i32.store (i32.const 0) (call $strlen (i32.const 100)))
               (i32.store (i32.const 4) (call $strcmp (i32.const 64) (i32.const 100)))
               (i32.store (i32.const 8) (call $toupper (i32.const 0x61))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();

    let mem = bridge.guest_memory();
    assert_eq!(read_cstr(mem, 100), "shader");
    assert_eq!(mem[107], 0x2a);
    assert_eq!(read_i32(mem, 0), 6);
    assert_eq!(read_i32(mem, 4), 0);
    assert_eq!(read_i32(mem, 8), 0x41);
}

#[test]
fn test_snprintf_answers_canned_text() {
    let wat = guest(
        r#"(import "env" "snprintf" (func $snprintf (param i32 i32 i32 i32) (result i32)))"#,
        r#"(func (export "init")
               (i32.store (i32.const 0)
                   (call $snprintf (i32.const 200) (i32.const 8) (i32.const 0) (i32.const 0))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();

    let mem = bridge.guest_memory();
    assert_eq!(read_i32(mem, 0), "ProggyClean.ttf, 15px".len() as i32);
    assert_eq!(read_cstr(mem, 200), "ProggyC");
}

#[test]
fn test_math_imports() {
    let wat = guest(
        r#"(import "env" "powf" (func $powf (param f32 f32) (result f32)))
           (import "env" "pow" (func $pow (param f64 f64) (result f64)))"#,
        r#"(func (export "init")
               (f32.store (i32.const 0) (call $powf (f32.const 2) (f32.const 10)))
               (f64.store (i32.const 8) (call $pow (f64.const 3) (f64.const 2))))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();
    let mem = bridge.guest_memory();
    assert_eq!(f32::from_le_bytes(mem[0..4].try_into().unwrap()), 1024.0);
    assert_eq!(f64::from_le_bytes(mem[8..16].try_into().unwrap()), 9.0);
}

#[test]
fn test_qsort_returns_with_array_unchanged() {
    let wat = guest(
        r#"(import "env" "qsort" (func $qsort (param i32 i32 i32 i32)))"#,
        r#"(data (i32.const 64) "\03\00\00\00\01\00\00\00\02\00\00\00")
           (func (export "init")
               (call $qsort (i32.const 64) (i32.const 3) (i32.const 4) (i32.const 0)))"#,
    );
    let mut bridge = bridge(&wat);
    bridge.init().unwrap();

    let mem = bridge.guest_memory();
    assert_eq!(
        [read_i32(mem, 64), read_i32(mem, 68), read_i32(mem, 72)],
        [3, 1, 2]
    );
    assert!(bridge.host_state().qsort_warned);
}

// ── Fatal entry points ──

#[test]
fn test_unimplemented_libc_traps() {
    let wat = guest(
        r#"(import "env" "fopen" (func $fopen (param i32 i32) (result i32)))"#,
        r#"(func (export "init") (drop (call $fopen (i32.const 0) (i32.const 0))))"#,
    );
    let mut bridge = bridge(&wat);
    let err = bridge.init().unwrap_err();
    assert!(matches!(
        err,
        SandboxError::HostError(HostError::Unimplemented("fopen"))
    ));
}

#[test]
fn test_assert_fail_reports_expression() {
    let wat = guest(
        r#"(import "env" "__assert_fail" (func $assert_fail (param i32 i32 i32 i32)))"#,
        r#"(data (i32.const 64) "count > 0\00")
           (data (i32.const 80) "mesh.c\00")
           (data (i32.const 96) "draw\00")
           (func (export "init")
               (call $assert_fail (i32.const 64) (i32.const 80) (i32.const 42) (i32.const 96)))"#,
    );
    let mut bridge = bridge(&wat);
    match bridge.init().unwrap_err() {
        SandboxError::HostError(HostError::GuestAbort(message)) => {
            assert!(message.contains("count > 0"), "{message}");
            assert!(message.contains("mesh.c:42"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
