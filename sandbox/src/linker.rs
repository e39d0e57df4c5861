//! Host function registration via Wasmtime linker.
//!
//! Registers every import the guest links against: the
//! `wasi_snapshot_preview1` shim and the `env` runtime and graphics
//! surfaces. Each function that touches guest memory:
//! 1. Fetches the `memory` export from the Caller (a fresh view per call)
//! 2. Hands memory and `HostState` to the shim or dispatcher method
//! 3. Maps the outcome: WASI calls return an errno; `env` calls trap on a
//!    fatal `HostError` and log-and-default on anything else
//!
//! Calls that re-enter the guest (`malloc`, `free`, the scratch address)
//! never hold a memory view across the re-entry.

use wasmtime::{Caller, Linker, Memory, WasmParams, WasmResults};

use glbridge_hostapi::{Errno, GraphicsApi, HostError};

use crate::error::SandboxError;
use crate::host_impl::HostState;
use crate::memory;
use crate::shim;

pub const WASI_MODULE: &str = "wasi_snapshot_preview1";
pub const ENV_MODULE: &str = "env";

/// Every `wasi_snapshot_preview1` function the linker provides.
pub const WASI_IMPORTS: &[&str] = &[
    "args_get",
    "args_sizes_get",
    "environ_get",
    "environ_sizes_get",
    "fd_write",
    "fd_read",
    "fd_seek",
    "fd_close",
    "fd_fdstat_get",
    "fd_fdstat_set_flags",
    "fd_prestat_get",
    "fd_prestat_dir_name",
    "path_open",
    "proc_exit",
];

/// Every `env` function the linker provides.
pub const ENV_IMPORTS: &[&str] = &[
    // runtime
    "console_logger",
    "malloc",
    "free",
    "memset",
    "memcpy",
    "memmove",
    "memcmp",
    "memchr",
    "strlen",
    "strcmp",
    "strncmp",
    "strchr",
    "strstr",
    "strcpy",
    "strncpy",
    "toupper",
    "acosf",
    "atan2f",
    "powf",
    "pow",
    "atof",
    "__cxa_atexit",
    "vsnprintf",
    "snprintf",
    "qsort",
    "sprintf",
    "printf",
    "sscanf",
    "fopen",
    "fclose",
    "ftell",
    "fseek",
    "fread",
    "fwrite",
    "fflush",
    "__stack_chk_fail",
    "__assert_fail",
    // graphics
    "getString",
    "isEnabled",
    "enable",
    "disable",
    "viewport",
    "scissor",
    "clear",
    "clearColor",
    "pixelStorei",
    "blendEquation",
    "blendEquationSeparate",
    "blendFunc",
    "blendFuncSeparate",
    "genBuffers",
    "deleteBuffers",
    "bindBuffer",
    "bufferData",
    "bufferSubData",
    "createShader",
    "deleteShader",
    "shaderSource",
    "compileShader",
    "getShaderiv",
    "getShaderInfoLog",
    "createProgram",
    "deleteProgram",
    "attachShader",
    "detachShader",
    "linkProgram",
    "getProgramiv",
    "getProgramInfoLog",
    "useProgram",
    "getUniformLocation",
    "getAttribLocation",
    "uniform1i",
    "uniform1f",
    "uniformMatrix4fv",
    "enableVertexAttribArray",
    "disableVertexAttribArray",
    "vertexAttribPointer",
    "drawArrays",
    "drawElements",
    "getIntegerv",
    "genTextures",
    "deleteTextures",
    "bindTexture",
    "activeTexture",
    "texParameteri",
    "texImage2D",
    "genVertexArrays",
    "deleteVertexArrays",
    "bindVertexArray",
];

/// Returns true if the linker provides `module::name`.
pub fn is_provided(module: &str, name: &str) -> bool {
    match module {
        WASI_MODULE => WASI_IMPORTS.contains(&name),
        ENV_MODULE => ENV_IMPORTS.contains(&name),
        _ => false,
    }
}

/// Get the guest's exported memory from a Caller.
fn get_memory<G>(caller: &mut Caller<'_, HostState<G>>) -> Result<Memory, HostError> {
    caller
        .get_export("memory")
        .and_then(|e| e.into_memory())
        .ok_or(HostError::MissingExport("memory"))
}

/// Run `f` on fresh guest memory and the host state.
///
/// A fatal error traps; any other error is logged and `fallback` returned
/// to the guest.
fn dispatch_or<G, R, F>(
    caller: &mut Caller<'_, HostState<G>>,
    name: &'static str,
    fallback: R,
    f: F,
) -> wasmtime::Result<R>
where
    G: GraphicsApi,
    F: FnOnce(&mut [u8], &mut HostState<G>) -> Result<R, HostError>,
{
    let memory = get_memory(caller)?;
    let (mem, state) = memory.data_and_store_mut(&mut *caller);
    match f(mem, state) {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            log::warn!("{}: {}", name, e);
            Ok(fallback)
        }
    }
}

fn dispatch<G, R, F>(caller: &mut Caller<'_, HostState<G>>, name: &'static str, f: F) -> wasmtime::Result<R>
where
    G: GraphicsApi,
    R: Default,
    F: FnOnce(&mut [u8], &mut HostState<G>) -> Result<R, HostError>,
{
    dispatch_or(caller, name, R::default(), f)
}

/// Like [`dispatch`], for WASI calls: every error becomes an errno.
fn wasi<G, F>(caller: &mut Caller<'_, HostState<G>>, name: &'static str, f: F) -> wasmtime::Result<i32>
where
    G: GraphicsApi,
    F: FnOnce(&mut [u8], &mut HostState<G>) -> Result<Errno, HostError>,
{
    let memory = get_memory(caller)?;
    let (mem, state) = memory.data_and_store_mut(&mut *caller);
    let errno = f(mem, state).unwrap_or_else(|e| {
        log::debug!("{}: {}", name, e);
        e.to_errno()
    });
    Ok(errno.as_i32())
}

/// Call a guest export from inside a host function.
fn call_export<G, P, R>(caller: &mut Caller<'_, HostState<G>>, name: &'static str, params: P) -> wasmtime::Result<R>
where
    G: GraphicsApi,
    P: WasmParams,
    R: WasmResults,
{
    let func = caller
        .get_export(name)
        .and_then(|e| e.into_func())
        .ok_or(HostError::MissingExport(name))?;
    func.typed::<P, R>(&*caller)?.call(&mut *caller, params)
}

/// Guest address of the outbound-string slot, asked once and cached.
fn scratch_address<G: GraphicsApi>(caller: &mut Caller<'_, HostState<G>>) -> wasmtime::Result<u32> {
    if let Some(p) = caller.data().scratch_ptr {
        return Ok(p);
    }
    let p = memory::ptr(call_export::<G, (), i32>(caller, "getGlobalAddress", ())?);
    caller.data_mut().scratch_ptr = Some(p);
    Ok(p)
}

fn unsupported(name: &'static str) -> wasmtime::Error {
    HostError::Unimplemented(name).into()
}

/// Register every provided import with the linker.
pub fn register_host_functions<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    register_wasi(linker)?;
    register_runtime(linker)?;
    register_unimplemented(linker)?;
    register_state(linker)?;
    register_buffers(linker)?;
    register_shaders(linker)?;
    register_programs(linker)?;
    register_vertex_specification(linker)?;
    register_textures(linker)?;
    Ok(())
}

// ── WASI ──

fn register_wasi<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(WASI_MODULE, "args_get", |_argv: i32, _argv_buf: i32| {
        Errno::Success.as_i32()
    })?;
    linker.func_wrap(
        WASI_MODULE,
        "args_sizes_get",
        |mut caller: Caller<'_, HostState<G>>, argc: i32, buf_size: i32| {
            wasi(&mut caller, "args_sizes_get", |mem, _| shim::sizes_get(mem, argc, buf_size))
        },
    )?;
    linker.func_wrap(WASI_MODULE, "environ_get", |_environ: i32, _environ_buf: i32| {
        Errno::Success.as_i32()
    })?;
    linker.func_wrap(
        WASI_MODULE,
        "environ_sizes_get",
        |mut caller: Caller<'_, HostState<G>>, count: i32, buf_size: i32| {
            wasi(&mut caller, "environ_sizes_get", |mem, _| shim::sizes_get(mem, count, buf_size))
        },
    )?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_write",
        |mut caller: Caller<'_, HostState<G>>, fd: i32, iovs: i32, iovs_len: i32, nwritten: i32| {
            wasi(&mut caller, "fd_write", |mem, state| {
                state.fd_write(mem, fd, iovs, iovs_len, nwritten)
            })
        },
    )?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_read",
        |mut caller: Caller<'_, HostState<G>>, _fd: i32, _iovs: i32, _iovs_len: i32, nread: i32| {
            wasi(&mut caller, "fd_read", |mem, _| shim::fd_read(mem, nread))
        },
    )?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_seek",
        |mut caller: Caller<'_, HostState<G>>, _fd: i32, _offset: i64, _whence: i32, new_offset: i32| {
            wasi(&mut caller, "fd_seek", |mem, _| shim::fd_seek(mem, new_offset))
        },
    )?;
    linker.func_wrap(WASI_MODULE, "fd_close", |_fd: i32| Errno::Success.as_i32())?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_fdstat_get",
        |mut caller: Caller<'_, HostState<G>>, _fd: i32, buf: i32| {
            wasi(&mut caller, "fd_fdstat_get", |mem, _| shim::fd_fdstat_get(mem, buf))
        },
    )?;
    linker.func_wrap(WASI_MODULE, "fd_fdstat_set_flags", |_fd: i32, _flags: i32| {
        Errno::Success.as_i32()
    })?;
    // No preopened directories: BADF ends libc's preopen scan.
    linker.func_wrap(WASI_MODULE, "fd_prestat_get", |_fd: i32, _buf: i32| {
        Errno::Badf.as_i32()
    })?;
    linker.func_wrap(
        WASI_MODULE,
        "fd_prestat_dir_name",
        |_fd: i32, _path: i32, _path_len: i32| Errno::Badf.as_i32(),
    )?;
    linker.func_wrap(
        WASI_MODULE,
        "path_open",
        |_fd: i32,
         _dirflags: i32,
         _path: i32,
         _path_len: i32,
         _oflags: i32,
         _rights_base: i64,
         _rights_inheriting: i64,
         _fdflags: i32,
         _opened_fd: i32| Errno::Success.as_i32(),
    )?;
    linker.func_wrap(WASI_MODULE, "proc_exit", |code: i32| -> wasmtime::Result<()> {
        Err(HostError::Exit(code).into())
    })?;
    Ok(())
}

// ── Runtime: logging, allocator, libc ──

fn register_runtime<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "console_logger",
        |mut caller: Caller<'_, HostState<G>>, level: i32, ptr: i32, len: i32| {
            dispatch(&mut caller, "console_logger", |mem, state| {
                state.console_log(mem, level, ptr, len)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "malloc",
        |mut caller: Caller<'_, HostState<G>>, size: i32| {
            call_export::<G, i32, i32>(&mut caller, "my_malloc", size)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "free",
        |mut caller: Caller<'_, HostState<G>>, ptr: i32| {
            call_export::<G, i32, ()>(&mut caller, "my_free", ptr)
        },
    )?;

    linker.func_wrap(
        ENV_MODULE,
        "memset",
        |mut caller: Caller<'_, HostState<G>>, dst: i32, ch: i32, n: i32| {
            dispatch(&mut caller, "memset", |mem, _| shim::memset(mem, dst, ch, n))
        },
    )?;
    for name in ["memcpy", "memmove"] {
        linker.func_wrap(
            ENV_MODULE,
            name,
            move |mut caller: Caller<'_, HostState<G>>, dst: i32, src: i32, n: i32| {
                dispatch(&mut caller, name, |mem, _| shim::memmove(mem, dst, src, n))
            },
        )?;
    }
    linker.func_wrap(
        ENV_MODULE,
        "memcmp",
        |mut caller: Caller<'_, HostState<G>>, a: i32, b: i32, n: i32| {
            dispatch(&mut caller, "memcmp", |mem, _| shim::memcmp(mem, a, b, n))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "memchr",
        |mut caller: Caller<'_, HostState<G>>, s: i32, c: i32, n: i32| {
            dispatch(&mut caller, "memchr", |mem, _| shim::memchr(mem, s, c, n))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strlen",
        |mut caller: Caller<'_, HostState<G>>, s: i32| {
            dispatch(&mut caller, "strlen", |mem, _| shim::strlen(mem, s))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strcmp",
        |mut caller: Caller<'_, HostState<G>>, a: i32, b: i32| {
            dispatch(&mut caller, "strcmp", |mem, _| shim::strcmp(mem, a, b))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strncmp",
        |mut caller: Caller<'_, HostState<G>>, a: i32, b: i32, n: i32| {
            dispatch(&mut caller, "strncmp", |mem, _| shim::strncmp(mem, a, b, n))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strchr",
        |mut caller: Caller<'_, HostState<G>>, s: i32, c: i32| {
            dispatch(&mut caller, "strchr", |mem, _| shim::strchr(mem, s, c))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strstr",
        |mut caller: Caller<'_, HostState<G>>, haystack: i32, needle: i32| {
            dispatch(&mut caller, "strstr", |mem, _| shim::strstr(mem, haystack, needle))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strcpy",
        |mut caller: Caller<'_, HostState<G>>, dst: i32, src: i32| {
            dispatch(&mut caller, "strcpy", |mem, _| shim::strcpy(mem, dst, src))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "strncpy",
        |mut caller: Caller<'_, HostState<G>>, dst: i32, src: i32, n: i32| {
            dispatch(&mut caller, "strncpy", |mem, _| shim::strncpy(mem, dst, src, n))
        },
    )?;
    linker.func_wrap(ENV_MODULE, "toupper", shim::toupper)?;
    linker.func_wrap(ENV_MODULE, "acosf", |x: f32| x.acos())?;
    linker.func_wrap(ENV_MODULE, "atan2f", |y: f32, x: f32| y.atan2(x))?;
    linker.func_wrap(ENV_MODULE, "powf", |x: f32, y: f32| x.powf(y))?;
    linker.func_wrap(ENV_MODULE, "pow", |x: f64, y: f64| x.powf(y))?;
    linker.func_wrap(
        ENV_MODULE,
        "atof",
        |mut caller: Caller<'_, HostState<G>>, s: i32| {
            dispatch(&mut caller, "atof", |mem, _| shim::atof(mem, s))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "__cxa_atexit",
        |_func: i32, _arg: i32, _dso: i32| 0i32,
    )?;
    for name in ["vsnprintf", "snprintf"] {
        linker.func_wrap(
            ENV_MODULE,
            name,
            move |mut caller: Caller<'_, HostState<G>>, s: i32, n: i32, _format: i32, _args: i32| {
                dispatch(&mut caller, name, |mem, state| {
                    shim::canned_format(mem, &state.config.canned_format_response, s, n)
                })
            },
        )?;
    }
    linker.func_wrap(
        ENV_MODULE,
        "qsort",
        |mut caller: Caller<'_, HostState<G>>, _base: i32, num: i32, _size: i32, _compar: i32| {
            caller.data_mut().qsort(num)
        },
    )?;
    Ok(())
}

/// Entry points that would need real I/O or a formatter. Reaching one
/// means the guest depends on something the bridge does not provide.
fn register_unimplemented<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(ENV_MODULE, "sprintf", |_: i32, _: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("sprintf"))
    })?;
    linker.func_wrap(ENV_MODULE, "printf", |_: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("printf"))
    })?;
    linker.func_wrap(ENV_MODULE, "sscanf", |_: i32, _: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("sscanf"))
    })?;
    linker.func_wrap(ENV_MODULE, "fopen", |_: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fopen"))
    })?;
    linker.func_wrap(ENV_MODULE, "fclose", |_: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fclose"))
    })?;
    linker.func_wrap(ENV_MODULE, "ftell", |_: i32| -> wasmtime::Result<i32> {
        Err(unsupported("ftell"))
    })?;
    linker.func_wrap(ENV_MODULE, "fseek", |_: i32, _: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fseek"))
    })?;
    linker.func_wrap(ENV_MODULE, "fread", |_: i32, _: i32, _: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fread"))
    })?;
    linker.func_wrap(ENV_MODULE, "fwrite", |_: i32, _: i32, _: i32, _: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fwrite"))
    })?;
    linker.func_wrap(ENV_MODULE, "fflush", |_: i32| -> wasmtime::Result<i32> {
        Err(unsupported("fflush"))
    })?;
    linker.func_wrap(ENV_MODULE, "__stack_chk_fail", || -> wasmtime::Result<()> {
        Err(HostError::GuestAbort("stack smashing detected".into()).into())
    })?;
    linker.func_wrap(
        ENV_MODULE,
        "__assert_fail",
        |mut caller: Caller<'_, HostState<G>>, expr: i32, file: i32, line: i32, func: i32| -> wasmtime::Result<()> {
            let memory = get_memory(&mut caller)?;
            Err(shim::assert_fail(memory.data(&caller), expr, file, line, func).into())
        },
    )?;
    Ok(())
}

// ── Graphics: global state ──

fn register_state<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "getString",
        |mut caller: Caller<'_, HostState<G>>, name: i32| -> wasmtime::Result<i32> {
            let scratch = scratch_address(&mut caller)?;
            dispatch(&mut caller, "getString", |mem, state| state.get_string(mem, name, scratch))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "isEnabled",
        |caller: Caller<'_, HostState<G>>, cap: i32| caller.data().gl.is_enabled(cap as u32) as i32,
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "enable",
        |mut caller: Caller<'_, HostState<G>>, cap: i32| caller.data_mut().gl.enable(cap as u32),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "disable",
        |mut caller: Caller<'_, HostState<G>>, cap: i32| caller.data_mut().gl.disable(cap as u32),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "viewport",
        |mut caller: Caller<'_, HostState<G>>, x: i32, y: i32, width: i32, height: i32| {
            caller.data_mut().gl.viewport(x, y, width, height)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "scissor",
        |mut caller: Caller<'_, HostState<G>>, x: i32, y: i32, width: i32, height: i32| {
            caller.data_mut().gl.scissor(x, y, width, height)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "clear",
        |mut caller: Caller<'_, HostState<G>>, mask: i32| caller.data_mut().gl.clear(mask as u32),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "clearColor",
        |mut caller: Caller<'_, HostState<G>>, r: f32, g: f32, b: f32, a: f32| {
            caller.data_mut().gl.clear_color(r, g, b, a)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "pixelStorei",
        |mut caller: Caller<'_, HostState<G>>, pname: i32, param: i32| {
            caller.data_mut().gl.pixel_store_i(pname as u32, param)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "blendEquation",
        |mut caller: Caller<'_, HostState<G>>, mode: i32| {
            caller.data_mut().gl.blend_equation(mode as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "blendEquationSeparate",
        |mut caller: Caller<'_, HostState<G>>, mode_rgb: i32, mode_alpha: i32| {
            caller
                .data_mut()
                .gl
                .blend_equation_separate(mode_rgb as u32, mode_alpha as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "blendFunc",
        |mut caller: Caller<'_, HostState<G>>, src: i32, dst: i32| {
            caller.data_mut().gl.blend_func(src as u32, dst as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "blendFuncSeparate",
        |mut caller: Caller<'_, HostState<G>>, src_rgb: i32, dst_rgb: i32, src_alpha: i32, dst_alpha: i32| {
            caller.data_mut().gl.blend_func_separate(
                src_rgb as u32,
                dst_rgb as u32,
                src_alpha as u32,
                dst_alpha as u32,
            )
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getIntegerv",
        |mut caller: Caller<'_, HostState<G>>, pname: i32, data: i32| {
            dispatch(&mut caller, "getIntegerv", |mem, state| state.get_integerv(mem, pname, data))
        },
    )?;
    Ok(())
}

// ── Graphics: buffers ──

fn register_buffers<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "genBuffers",
        |mut caller: Caller<'_, HostState<G>>, n: i32, out: i32| {
            dispatch(&mut caller, "genBuffers", |mem, state| state.gen_buffers(mem, n, out))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "deleteBuffers",
        |mut caller: Caller<'_, HostState<G>>, n: i32, src: i32| {
            dispatch(&mut caller, "deleteBuffers", |mem, state| state.delete_buffers(mem, n, src))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "bindBuffer",
        |mut caller: Caller<'_, HostState<G>>, target: i32, buffer: i32| {
            caller.data_mut().bind_buffer(target, buffer)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "bufferData",
        |mut caller: Caller<'_, HostState<G>>, target: i32, size: i32, data: i32, usage: i32| {
            dispatch(&mut caller, "bufferData", |mem, state| {
                state.buffer_data(mem, target, size, data, usage);
                Ok(())
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "bufferSubData",
        |mut caller: Caller<'_, HostState<G>>, target: i32, offset: i32, size: i32, data: i32| {
            dispatch(&mut caller, "bufferSubData", |mem, state| {
                state.buffer_sub_data(mem, target, offset, size, data);
                Ok(())
            })
        },
    )?;
    Ok(())
}

// ── Graphics: shaders ──

fn register_shaders<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "createShader",
        |mut caller: Caller<'_, HostState<G>>, kind: i32| caller.data_mut().create_shader(kind),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "deleteShader",
        |mut caller: Caller<'_, HostState<G>>, shader: i32| caller.data_mut().delete_shader(shader),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "shaderSource",
        |mut caller: Caller<'_, HostState<G>>, shader: i32, count: i32, strings: i32, lengths: i32| {
            dispatch(&mut caller, "shaderSource", |mem, state| {
                state.shader_source(mem, shader, count, strings, lengths)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "compileShader",
        |mut caller: Caller<'_, HostState<G>>, shader: i32| caller.data_mut().compile_shader(shader),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getShaderiv",
        |mut caller: Caller<'_, HostState<G>>, shader: i32, pname: i32, out: i32| {
            dispatch(&mut caller, "getShaderiv", |mem, state| {
                state.get_shader_iv(mem, shader, pname, out)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getShaderInfoLog",
        |mut caller: Caller<'_, HostState<G>>, shader: i32, max_len: i32, length: i32, info_log: i32| {
            dispatch(&mut caller, "getShaderInfoLog", |mem, state| {
                state.get_shader_info_log(mem, shader, max_len, length, info_log)
            })
        },
    )?;
    Ok(())
}

// ── Graphics: programs and uniforms ──

fn register_programs<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "createProgram",
        |mut caller: Caller<'_, HostState<G>>| caller.data_mut().create_program(),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "deleteProgram",
        |mut caller: Caller<'_, HostState<G>>, program: i32| caller.data_mut().delete_program(program),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "attachShader",
        |mut caller: Caller<'_, HostState<G>>, program: i32, shader: i32| {
            caller.data_mut().attach_shader(program, shader)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "detachShader",
        |mut caller: Caller<'_, HostState<G>>, program: i32, shader: i32| {
            caller.data_mut().detach_shader(program, shader)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "linkProgram",
        |mut caller: Caller<'_, HostState<G>>, program: i32| caller.data_mut().link_program(program),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getProgramiv",
        |mut caller: Caller<'_, HostState<G>>, program: i32, pname: i32, out: i32| {
            dispatch(&mut caller, "getProgramiv", |mem, state| {
                state.get_program_iv(mem, program, pname, out)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getProgramInfoLog",
        |mut caller: Caller<'_, HostState<G>>, program: i32, max_len: i32, length: i32, info_log: i32| {
            dispatch(&mut caller, "getProgramInfoLog", |mem, state| {
                state.get_program_info_log(mem, program, max_len, length, info_log)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "useProgram",
        |mut caller: Caller<'_, HostState<G>>, program: i32| caller.data_mut().use_program(program),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getUniformLocation",
        |mut caller: Caller<'_, HostState<G>>, program: i32, name: i32| {
            dispatch_or(&mut caller, "getUniformLocation", -1, |mem, state| {
                state.get_uniform_location(mem, program, name)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "getAttribLocation",
        |mut caller: Caller<'_, HostState<G>>, program: i32, name: i32| {
            dispatch_or(&mut caller, "getAttribLocation", -1, |mem, state| {
                state.get_attrib_location(mem, program, name)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "uniform1i",
        |mut caller: Caller<'_, HostState<G>>, location: i32, value: i32| {
            caller.data_mut().uniform_1i(location, value)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "uniform1f",
        |mut caller: Caller<'_, HostState<G>>, location: i32, value: f32| {
            caller.data_mut().uniform_1f(location, value)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "uniformMatrix4fv",
        |mut caller: Caller<'_, HostState<G>>, location: i32, count: i32, transpose: i32, value: i32| {
            dispatch(&mut caller, "uniformMatrix4fv", |mem, state| {
                state.uniform_matrix_4fv(mem, location, count, transpose, value);
                Ok(())
            })
        },
    )?;
    Ok(())
}

// ── Graphics: vertex arrays and drawing ──

fn register_vertex_specification<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "genVertexArrays",
        |mut caller: Caller<'_, HostState<G>>, n: i32, out: i32| {
            dispatch(&mut caller, "genVertexArrays", |mem, state| {
                state.gen_vertex_arrays(mem, n, out)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "deleteVertexArrays",
        |mut caller: Caller<'_, HostState<G>>, n: i32, src: i32| {
            dispatch(&mut caller, "deleteVertexArrays", |mem, state| {
                state.delete_vertex_arrays(mem, n, src)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "bindVertexArray",
        |mut caller: Caller<'_, HostState<G>>, array: i32| caller.data_mut().bind_vertex_array(array),
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "enableVertexAttribArray",
        |mut caller: Caller<'_, HostState<G>>, index: i32| {
            caller.data_mut().gl.enable_vertex_attrib_array(index as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "disableVertexAttribArray",
        |mut caller: Caller<'_, HostState<G>>, index: i32| {
            caller.data_mut().gl.disable_vertex_attrib_array(index as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "vertexAttribPointer",
        |mut caller: Caller<'_, HostState<G>>,
         index: i32,
         size: i32,
         kind: i32,
         normalized: i32,
         stride: i32,
         offset: i32| {
            caller.data_mut().gl.vertex_attrib_pointer(
                index as u32,
                size,
                kind as u32,
                normalized != 0,
                stride,
                offset,
            )
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "drawArrays",
        |mut caller: Caller<'_, HostState<G>>, mode: i32, first: i32, count: i32| {
            caller.data_mut().gl.draw_arrays(mode as u32, first, count)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "drawElements",
        |mut caller: Caller<'_, HostState<G>>, mode: i32, count: i32, kind: i32, offset: i32| {
            caller
                .data_mut()
                .gl
                .draw_elements(mode as u32, count, kind as u32, offset)
        },
    )?;
    Ok(())
}

// ── Graphics: textures ──

fn register_textures<G: GraphicsApi>(linker: &mut Linker<HostState<G>>) -> Result<(), SandboxError> {
    linker.func_wrap(
        ENV_MODULE,
        "genTextures",
        |mut caller: Caller<'_, HostState<G>>, n: i32, out: i32| {
            dispatch(&mut caller, "genTextures", |mem, state| state.gen_textures(mem, n, out))
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "deleteTextures",
        |mut caller: Caller<'_, HostState<G>>, n: i32, src: i32| {
            dispatch(&mut caller, "deleteTextures", |mem, state| {
                state.delete_textures(mem, n, src)
            })
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "bindTexture",
        |mut caller: Caller<'_, HostState<G>>, target: i32, texture: i32| {
            caller.data_mut().bind_texture(target, texture)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "activeTexture",
        |mut caller: Caller<'_, HostState<G>>, unit: i32| {
            caller.data_mut().gl.active_texture(unit as u32)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "texParameteri",
        |mut caller: Caller<'_, HostState<G>>, target: i32, pname: i32, param: i32| {
            caller
                .data_mut()
                .gl
                .tex_parameter_i(target as u32, pname as u32, param)
        },
    )?;
    linker.func_wrap(
        ENV_MODULE,
        "texImage2D",
        |mut caller: Caller<'_, HostState<G>>,
         target: i32,
         level: i32,
         internal_format: i32,
         width: i32,
         height: i32,
         border: i32,
         format: i32,
         kind: i32,
         data: i32| {
            dispatch(&mut caller, "texImage2D", |mem, state| {
                state.tex_image_2d(
                    mem,
                    target,
                    level,
                    internal_format,
                    width,
                    height,
                    border,
                    format,
                    kind,
                    data,
                );
                Ok(())
            })
        },
    )?;
    Ok(())
}
