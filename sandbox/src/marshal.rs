//! String marshaling between guest memory and host strings.
//!
//! Decoding never fails on bad UTF-8 (invalid sequences become U+FFFD);
//! it only fails when the pointer range itself is out of bounds.

use glbridge_hostapi::HostError;

use crate::memory;

/// Decode a guest string.
///
/// With `len`, exactly `len` bytes are decoded. Without it, the bytes up to
/// the first zero byte are decoded.
pub fn decode_string(mem: &[u8], ptr: u32, len: Option<usize>) -> Result<String, HostError> {
    let bytes = match len {
        Some(len) => memory::view(mem, ptr, len)?,
        None => memory::view_cstr(mem, ptr)?,
    };
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Largest prefix of `text` that fits in `max` bytes without splitting a
/// character.
pub(crate) fn fit(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Write `text` at `dst`, at most `max_len` bytes, no terminator.
///
/// When `length_out` is non-zero the number of bytes written is stored
/// there as a u32. Truncation is not signalled beyond that length. Both
/// ranges are checked before anything is written.
pub fn encode_string_into(
    mem: &mut [u8],
    text: &str,
    dst: u32,
    max_len: usize,
    length_out: u32,
) -> Result<u32, HostError> {
    let bytes = fit(text, max_len).as_bytes();
    memory::validate_range(mem.len(), dst, bytes.len())?;
    if length_out != 0 {
        memory::validate_range(mem.len(), length_out, 4)?;
    }
    memory::view_mut(mem, dst, bytes.len())?.copy_from_slice(bytes);
    let written = bytes.len() as u32;
    if length_out != 0 {
        memory::write_u32(mem, length_out, written)?;
    }
    Ok(written)
}

/// Copy `text` into the single outbound-string slot at `scratch`.
///
/// The copy is NUL-terminated and truncated to `capacity - 1` bytes. The
/// slot is overwritten by the next outbound string, so the returned pointer
/// is only good until then.
pub fn write_outbound_string(
    mem: &mut [u8],
    text: &str,
    scratch: u32,
    capacity: u32,
) -> Result<u32, HostError> {
    if capacity == 0 {
        return Err(HostError::Internal("outbound string slot has no capacity".into()));
    }
    let bytes = fit(text, capacity as usize - 1).as_bytes();
    let slot = memory::view_mut(mem, scratch, bytes.len() + 1)?;
    slot[..bytes.len()].copy_from_slice(bytes);
    slot[bytes.len()] = 0;
    Ok(scratch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_explicit_length() {
        let mem = b"hello world\0".to_vec();
        assert_eq!(decode_string(&mem, 0, Some(5)).unwrap(), "hello");
        assert_eq!(decode_string(&mem, 6, Some(0)).unwrap(), "");
        assert!(decode_string(&mem, 6, Some(100)).is_err());
    }

    #[test]
    fn test_decode_zero_terminated() {
        let mem = b"abc\0xyz".to_vec();
        assert_eq!(decode_string(&mem, 0, None).unwrap(), "abc");
        assert_eq!(decode_string(&mem, 4, None).unwrap(), "xyz");
    }

    #[test]
    fn test_decode_replaces_invalid_utf8() {
        let mem = vec![b'a', 0xFF, b'b'];
        assert_eq!(decode_string(&mem, 0, Some(3)).unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn test_encode_reports_length() {
        let mut mem = vec![0xEE; 32];
        let written = encode_string_into(&mut mem, "shader ok", 0, 16, 20).unwrap();
        assert_eq!(written, 9);
        assert_eq!(&mem[..9], b"shader ok");
        // No terminator.
        assert_eq!(mem[9], 0xEE);
        assert_eq!(memory::read_u32(&mem, 20).unwrap(), 9);
    }

    #[test]
    fn test_encode_never_exceeds_max_len() {
        let mut mem = vec![0; 32];
        for text in ["", "abc", "abcdefgh", "ééé", "日本語テキスト"] {
            for max in 0..10 {
                mem.fill(0xAA);
                let written = encode_string_into(&mut mem, text, 0, max, 0).unwrap();
                assert!(written as usize <= max, "{text:?} max {max}");
                assert!(mem[written as usize..].iter().all(|&b| b == 0xAA));
            }
        }
    }

    #[test]
    fn test_encode_round_trip() {
        let mut mem = vec![0; 64];
        for text in ["x", "compile error: line 3", "größe", "🦀 ok"] {
            let written = encode_string_into(&mut mem, text, 8, 64 - 8, 0).unwrap();
            assert_eq!(decode_string(&mem, 8, Some(written as usize)).unwrap(), text);
        }
    }

    #[test]
    fn test_encode_truncates_on_char_boundary() {
        let mut mem = vec![0; 8];
        // "é" is two bytes; three bytes fit one "é" plus nothing.
        let written = encode_string_into(&mut mem, "éé", 0, 3, 0).unwrap();
        assert_eq!(written, 2);
        assert_eq!(decode_string(&mem, 0, Some(2)).unwrap(), "é");
    }

    #[test]
    fn test_encode_bad_length_pointer() {
        let mut mem = vec![0; 8];
        assert!(encode_string_into(&mut mem, "a", 0, 4, 6).is_err());
        // Nothing is written when the length slot is out of range.
        assert_eq!(mem, vec![0; 8]);
    }

    #[test]
    fn test_outbound_string_is_terminated() {
        let mut mem = vec![0xFF; 16];
        let p = write_outbound_string(&mut mem, "WebGL", 4, 8).unwrap();
        assert_eq!(p, 4);
        assert_eq!(decode_string(&mem, p, None).unwrap(), "WebGL");
        assert_eq!(mem[9], 0);
    }

    #[test]
    fn test_outbound_string_truncates_to_capacity() {
        let mut mem = vec![0xFF; 16];
        write_outbound_string(&mut mem, "0123456789", 0, 4).unwrap();
        assert_eq!(&mem[..4], b"012\0");
        assert_eq!(mem[4], 0xFF);
        assert!(write_outbound_string(&mut mem, "x", 0, 0).is_err());
    }
}
