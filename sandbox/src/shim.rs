//! Runtime shim: the `wasi_snapshot_preview1` calls and the libc-shaped
//! `env` helpers the guest's startup code links against.
//!
//! WASI calls report failure as an errno, never a trap (except
//! `proc_exit`). Only `fd_write` does real work; the rest answer "success,
//! no data" so the guest's libc initialises.
//!
//! The libc helpers operate directly on guest memory with C semantics.
//! Entry points that would need real I/O or a formatter are fatal and live
//! in the linker.

use std::cmp::Ordering;

use glbridge_hostapi::{Errno, GraphicsApi, HostError, Severity};

use crate::host_impl::HostState;
use crate::marshal;
use crate::memory::{self, ptr};

/// Size of a preview1 `fdstat` record.
pub const FDSTAT_SIZE: usize = 24;

impl<G: GraphicsApi> HostState<G> {
    /// `fd_write(fd, iovs, iovs_len, nwritten)`.
    ///
    /// Each 8-byte iovec (u32 pointer, u32 length) is decoded as text,
    /// trimmed, and logged as one info line when non-empty. The reported
    /// count includes every iovec's length, logged or not.
    pub fn fd_write(
        &mut self,
        mem: &mut [u8],
        fd: i32,
        iovs: i32,
        iovs_len: i32,
        nwritten: i32,
    ) -> Result<Errno, HostError> {
        let mut total: u32 = 0;
        for i in 0..iovs_len.max(0) as u32 {
            let iov = ptr(iovs).wrapping_add(i * 8);
            let base = memory::read_u32(mem, iov)?;
            let len = memory::read_u32(mem, iov.wrapping_add(4))?;
            if len == 0 {
                continue;
            }
            let text = marshal::decode_string(mem, base, Some(len as usize))?;
            let text = text.trim();
            if !text.is_empty() {
                log::trace!("fd_write: fd {} wrote {} bytes", fd, len);
                self.log(Severity::Info, &format!("{text}\n"));
            }
            total = total.saturating_add(len);
        }
        memory::write_u32(mem, ptr(nwritten), total)?;
        Ok(Errno::Success)
    }
}

// ── WASI stubs ──

/// `fd_read`: always end of file.
pub fn fd_read(mem: &mut [u8], nread: i32) -> Result<Errno, HostError> {
    memory::write_u32(mem, ptr(nread), 0)?;
    Ok(Errno::Success)
}

/// `fd_seek`: every descriptor is positioned at 0.
pub fn fd_seek(mem: &mut [u8], new_offset: i32) -> Result<Errno, HostError> {
    memory::write_u64(mem, ptr(new_offset), 0)?;
    Ok(Errno::Success)
}

/// `fd_fdstat_get`: an all-zero stat record.
pub fn fd_fdstat_get(mem: &mut [u8], buf: i32) -> Result<Errno, HostError> {
    memory::view_mut(mem, ptr(buf), FDSTAT_SIZE)?.fill(0);
    Ok(Errno::Success)
}

/// `args_sizes_get` / `environ_sizes_get`: no entries, no bytes.
pub fn sizes_get(mem: &mut [u8], count: i32, buf_size: i32) -> Result<Errno, HostError> {
    memory::write_u32(mem, ptr(count), 0)?;
    memory::write_u32(mem, ptr(buf_size), 0)?;
    Ok(Errno::Success)
}

// ── libc: memory ──

/// `memset(dst, ch, n)`.
pub fn memset(mem: &mut [u8], dst: i32, ch: i32, n: i32) -> Result<i32, HostError> {
    memory::view_mut(mem, ptr(dst), n.max(0) as usize)?.fill(ch as u8);
    Ok(dst)
}

/// `memcpy`/`memmove`: overlapping ranges are handled for both.
pub fn memmove(mem: &mut [u8], dst: i32, src: i32, n: i32) -> Result<i32, HostError> {
    let n = n.max(0) as usize;
    memory::validate_range(mem.len(), ptr(src), n)?;
    memory::validate_range(mem.len(), ptr(dst), n)?;
    let start = ptr(src) as usize;
    mem.copy_within(start..start + n, ptr(dst) as usize);
    Ok(dst)
}

fn sign(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// `memcmp(a, b, n)`.
pub fn memcmp(mem: &[u8], a: i32, b: i32, n: i32) -> Result<i32, HostError> {
    let n = n.max(0) as usize;
    let a = memory::view(mem, ptr(a), n)?;
    let b = memory::view(mem, ptr(b), n)?;
    Ok(sign(a.cmp(b)))
}

/// `memchr(s, c, n)`: address of the first match, or 0.
pub fn memchr(mem: &[u8], s: i32, c: i32, n: i32) -> Result<i32, HostError> {
    let bytes = memory::view(mem, ptr(s), n.max(0) as usize)?;
    Ok(bytes
        .iter()
        .position(|&b| b == c as u8)
        .map_or(0, |i| s.wrapping_add(i as i32)))
}

// ── libc: strings ──

/// `strlen(s)`.
pub fn strlen(mem: &[u8], s: i32) -> Result<i32, HostError> {
    Ok(memory::view_cstr(mem, ptr(s))?.len() as i32)
}

/// `strcmp(a, b)`.
pub fn strcmp(mem: &[u8], a: i32, b: i32) -> Result<i32, HostError> {
    let a = memory::view_cstr(mem, ptr(a))?;
    let b = memory::view_cstr(mem, ptr(b))?;
    Ok(sign(a.cmp(b)))
}

/// `strncmp(a, b, n)`.
pub fn strncmp(mem: &[u8], a: i32, b: i32, n: i32) -> Result<i32, HostError> {
    let n = n.max(0) as usize;
    let a = memory::view_cstr(mem, ptr(a))?;
    let b = memory::view_cstr(mem, ptr(b))?;
    Ok(sign(a[..a.len().min(n)].cmp(&b[..b.len().min(n)])))
}

/// `strchr(s, c)`: searching for 0 finds the terminator.
pub fn strchr(mem: &[u8], s: i32, c: i32) -> Result<i32, HostError> {
    let bytes = memory::view_cstr(mem, ptr(s))?;
    let c = c as u8;
    if c == 0 {
        return Ok(s.wrapping_add(bytes.len() as i32));
    }
    Ok(bytes
        .iter()
        .position(|&b| b == c)
        .map_or(0, |i| s.wrapping_add(i as i32)))
}

/// `strstr(haystack, needle)`.
pub fn strstr(mem: &[u8], haystack: i32, needle: i32) -> Result<i32, HostError> {
    let h = memory::view_cstr(mem, ptr(haystack))?;
    let n = memory::view_cstr(mem, ptr(needle))?;
    if n.is_empty() {
        return Ok(haystack);
    }
    Ok(h.windows(n.len())
        .position(|w| w == n)
        .map_or(0, |i| haystack.wrapping_add(i as i32)))
}

/// `strcpy(dst, src)`.
pub fn strcpy(mem: &mut [u8], dst: i32, src: i32) -> Result<i32, HostError> {
    let len = memory::view_cstr(mem, ptr(src))?.len();
    memmove(mem, dst, src, len as i32)?;
    memory::view_mut(mem, ptr(dst).wrapping_add(len as u32), 1)?[0] = 0;
    Ok(dst)
}

/// `strncpy(dst, src, n)`: copies at most `n` bytes and zero-pads the rest.
pub fn strncpy(mem: &mut [u8], dst: i32, src: i32, n: i32) -> Result<i32, HostError> {
    let n = n.max(0) as usize;
    let len = memory::view_cstr(mem, ptr(src))?.len().min(n);
    memory::validate_range(mem.len(), ptr(dst), n)?;
    memmove(mem, dst, src, len as i32)?;
    let start = ptr(dst) as usize;
    mem[start + len..start + n].fill(0);
    Ok(dst)
}

/// `toupper(c)` for the C locale.
pub fn toupper(c: i32) -> i32 {
    match u8::try_from(c) {
        Ok(b) if b.is_ascii_lowercase() => b.to_ascii_uppercase() as i32,
        _ => c,
    }
}

/// `atof(s)`: parse the longest numeric prefix after leading whitespace.
/// No numeric prefix yields 0.0.
pub fn atof(mem: &[u8], s: i32) -> Result<f64, HostError> {
    let text = marshal::decode_string(mem, ptr(s), None)?;
    let text = text.trim_start();
    let candidate_len = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    Ok((1..=candidate_len)
        .rev()
        .find_map(|end| text[..end].parse::<f64>().ok())
        .unwrap_or(0.0))
}

/// `vsnprintf(s, n, format, args)` / `snprintf`: the formatter is not
/// implemented; the canned response is written with C truncation rules and
/// its full length returned.
pub fn canned_format(mem: &mut [u8], canned: &str, s: i32, n: i32) -> Result<i32, HostError> {
    if n > 0 {
        let max = n as usize - 1;
        let len = marshal::fit(canned, max).len();
        memory::validate_range(mem.len(), ptr(s), len + 1)?;
        let written = marshal::encode_string_into(mem, canned, ptr(s), max, 0)?;
        memory::view_mut(mem, ptr(s).wrapping_add(written), 1)?[0] = 0;
    }
    Ok(canned.len() as i32)
}

impl<G: GraphicsApi> HostState<G> {
    /// `qsort(base, num, size, compar)`: the array is left as it is.
    ///
    /// Sorting through the guest comparator is not supported. Callers such
    /// as rectangle packers still work on unsorted input, so this warns once
    /// per bridge and returns.
    pub fn qsort(&mut self, num: i32) {
        if num > 1 && !self.qsort_warned {
            log::warn!("qsort: {} elements left unsorted", num);
            self.qsort_warned = true;
        }
    }
}

/// `__assert_fail(expr, file, line, func)`.
pub fn assert_fail(mem: &[u8], expr: i32, file: i32, line: i32, func: i32) -> HostError {
    let text = |p: i32| {
        marshal::decode_string(mem, ptr(p), None).unwrap_or_else(|_| "<invalid>".to_string())
    };
    HostError::GuestAbort(format!(
        "assertion `{}` failed at {}:{} in {}",
        text(expr),
        text(file),
        line,
        text(func)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glbridge_hostapi::{HostConfig, RecordingGl};

    fn put_str(mem: &mut [u8], at: usize, text: &str) {
        mem[at..at + text.len()].copy_from_slice(text.as_bytes());
        mem[at + text.len()] = 0;
    }

    fn put_iovec(mem: &mut [u8], at: u32, base: u32, len: u32) {
        memory::write_u32(mem, at, base).unwrap();
        memory::write_u32(mem, at + 4, len).unwrap();
    }

    #[test]
    fn test_fd_write_counts_every_iovec() {
        let mut state = HostState::new(RecordingGl::new(), HostConfig::default());
        let mut mem = vec![0u8; 128];
        mem[64..69].copy_from_slice(b"hello");
        put_iovec(&mut mem, 0, 64, 5);
        put_iovec(&mut mem, 8, 80, 0);

        let errno = state.fd_write(&mut mem, 1, 0, 2, 32).unwrap();
        assert_eq!(errno, Errno::Success);
        assert_eq!(memory::read_u32(&mem, 32).unwrap(), 5);

        let logs = state.take_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "hello\n");
        assert_eq!(logs[0].severity, Severity::Info);
    }

    #[test]
    fn test_fd_write_skips_blank_text() {
        let mut state = HostState::new(RecordingGl::new(), HostConfig::default());
        let mut mem = vec![0u8; 128];
        mem[64..67].copy_from_slice(b" \n ");
        put_iovec(&mut mem, 0, 64, 3);
        state.fd_write(&mut mem, 2, 0, 1, 32).unwrap();
        assert_eq!(memory::read_u32(&mem, 32).unwrap(), 3);
        assert!(state.take_logs().is_empty());
    }

    #[test]
    fn test_fd_write_bad_iovec_is_fault() {
        let mut state = HostState::new(RecordingGl::new(), HostConfig::default());
        let mut mem = vec![0u8; 32];
        put_iovec(&mut mem, 0, 1000, 5);
        let err = state.fd_write(&mut mem, 1, 0, 1, 16).unwrap_err();
        assert_eq!(err.to_errno(), Errno::Fault);
    }

    #[test]
    fn test_wasi_stubs() {
        let mut mem = vec![0xFFu8; 64];
        assert_eq!(fd_read(&mut mem, 0).unwrap(), Errno::Success);
        assert_eq!(memory::read_u32(&mem, 0).unwrap(), 0);

        assert_eq!(fd_seek(&mut mem, 8).unwrap(), Errno::Success);
        assert_eq!(&mem[8..16], &[0; 8]);

        fd_fdstat_get(&mut mem, 16).unwrap();
        assert!(mem[16..40].iter().all(|&b| b == 0));
        assert_eq!(mem[40], 0xFF);

        mem.fill(0xFF);
        sizes_get(&mut mem, 0, 4).unwrap();
        assert_eq!(&mem[0..8], &[0; 8]);

        assert!(fd_fdstat_get(&mut mem, 50).is_err());
    }

    #[test]
    fn test_memset_and_memmove() {
        let mut mem = vec![0u8; 16];
        assert_eq!(memset(&mut mem, 2, 0x41, 3).unwrap(), 2);
        assert_eq!(&mem[2..5], b"AAA");

        mem[0..4].copy_from_slice(b"abcd");
        memmove(&mut mem, 1, 0, 4).unwrap();
        assert_eq!(&mem[0..5], b"aabcd");

        assert!(memmove(&mut mem, 14, 0, 4).is_err());
        assert!(memset(&mut mem, 15, 0, 2).is_err());
    }

    #[test]
    fn test_memcmp_and_memchr() {
        let mut mem = vec![0u8; 32];
        mem[0..3].copy_from_slice(b"abc");
        mem[8..11].copy_from_slice(b"abd");
        assert_eq!(memcmp(&mem, 0, 8, 2).unwrap(), 0);
        assert_eq!(memcmp(&mem, 0, 8, 3).unwrap(), -1);
        assert_eq!(memcmp(&mem, 8, 0, 3).unwrap(), 1);
        assert_eq!(memchr(&mem, 0, b'c' as i32, 3).unwrap(), 2);
        assert_eq!(memchr(&mem, 0, b'z' as i32, 3).unwrap(), 0);
    }

    #[test]
    fn test_string_functions() {
        let mut mem = vec![0u8; 64];
        put_str(&mut mem, 0, "ProggyClean");
        put_str(&mut mem, 16, "Proggy");
        put_str(&mut mem, 32, "Clean");

        assert_eq!(strlen(&mem, 0).unwrap(), 11);
        assert_eq!(strcmp(&mem, 0, 0).unwrap(), 0);
        assert_eq!(strcmp(&mem, 16, 0).unwrap(), -1);
        assert_eq!(strcmp(&mem, 0, 16).unwrap(), 1);
        assert_eq!(strncmp(&mem, 0, 16, 6).unwrap(), 0);
        assert_eq!(strchr(&mem, 0, b'C' as i32).unwrap(), 6);
        assert_eq!(strchr(&mem, 0, 0).unwrap(), 11);
        assert_eq!(strchr(&mem, 0, b'z' as i32).unwrap(), 0);
        assert_eq!(strstr(&mem, 0, 32).unwrap(), 6);
        assert_eq!(strstr(&mem, 16, 32).unwrap(), 0);
    }

    #[test]
    fn test_strcpy_and_strncpy() {
        let mut mem = vec![0xFFu8; 64];
        put_str(&mut mem, 0, "font");
        assert_eq!(strcpy(&mut mem, 16, 0).unwrap(), 16);
        assert_eq!(&mem[16..21], b"font\0");

        strncpy(&mut mem, 32, 0, 8).unwrap();
        assert_eq!(&mem[32..40], b"font\0\0\0\0");
        assert_eq!(mem[40], 0xFF);

        strncpy(&mut mem, 48, 0, 2).unwrap();
        assert_eq!(&mem[48..50], b"fo");
        assert_eq!(mem[50], 0xFF);
    }

    #[test]
    fn test_toupper() {
        assert_eq!(toupper(b'a' as i32), b'A' as i32);
        assert_eq!(toupper(b'Z' as i32), b'Z' as i32);
        assert_eq!(toupper(b'1' as i32), b'1' as i32);
        assert_eq!(toupper(-1), -1);
    }

    #[test]
    fn test_atof() {
        let mut mem = vec![0u8; 64];
        put_str(&mut mem, 0, "  15.5px");
        put_str(&mut mem, 16, "-2e3");
        put_str(&mut mem, 32, "px");
        put_str(&mut mem, 48, "1e");
        assert_eq!(atof(&mem, 0).unwrap(), 15.5);
        assert_eq!(atof(&mem, 16).unwrap(), -2000.0);
        assert_eq!(atof(&mem, 32).unwrap(), 0.0);
        assert_eq!(atof(&mem, 48).unwrap(), 1.0);
    }

    #[test]
    fn test_canned_format() {
        let canned = "ProggyClean.ttf, 15px";
        let mut mem = vec![0xFFu8; 64];
        assert_eq!(canned_format(&mut mem, canned, 0, 64).unwrap(), 21);
        assert_eq!(marshal::decode_string(&mem, 0, None).unwrap(), canned);

        mem.fill(0xFF);
        assert_eq!(canned_format(&mut mem, canned, 0, 7).unwrap(), 21);
        assert_eq!(&mem[0..7], b"Proggy\0");
        assert_eq!(mem[7], 0xFF);

        mem.fill(0xFF);
        canned_format(&mut mem, canned, 0, 0).unwrap();
        assert_eq!(mem[0], 0xFF);
    }

    #[test]
    fn test_canned_format_no_partial_write() {
        let mut mem = vec![0xFFu8; 32];
        // Text fits, terminator would not.
        assert!(canned_format(&mut mem, "ProggyClean.ttf, 15px", 11, 64).is_err());
        assert!(mem.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_qsort_leaves_array_untouched() {
        let mut state = HostState::new(RecordingGl::new(), HostConfig::default());
        state.qsort(0);
        state.qsort(1);
        assert!(!state.qsort_warned);

        state.qsort(3);
        assert!(state.qsort_warned);
        state.qsort(64);
        assert!(state.qsort_warned);
    }

    #[test]
    fn test_assert_fail_message() {
        let mut mem = vec![0u8; 64];
        put_str(&mut mem, 0, "x > 0");
        put_str(&mut mem, 16, "main.c");
        put_str(&mut mem, 32, "render");
        match assert_fail(&mem, 0, 16, 42, 32) {
            HostError::GuestAbort(msg) => {
                assert_eq!(msg, "assertion `x > 0` failed at main.c:42 in render")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
