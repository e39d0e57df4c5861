//! Bounds-checked views over guest linear memory.
//!
//! Every function takes the memory slice freshly obtained for the current
//! host call. Nothing here keeps a view: the guest may grow (and move) its
//! memory on any call that re-enters it, so callers re-derive the slice
//! after such a call.
//!
//! Guest pointers are 32-bit. Imports receive them as `i32` and reinterpret
//! the bits with [`ptr`]; a negative `i32` is simply a high address.

use glbridge_hostapi::HostError;

/// Reinterpret a guest `i32` argument as a 32-bit address.
pub fn ptr(raw: i32) -> u32 {
    raw as u32
}

/// Byte length of `count` elements of `size` bytes. Negative counts are 0.
pub fn elements(count: i32, size: usize) -> usize {
    (count.max(0) as usize).saturating_mul(size)
}

/// Check that `[ptr, ptr + len)` lies inside memory of `mem_size` bytes.
pub fn validate_range(mem_size: usize, ptr: u32, len: usize) -> Result<(), HostError> {
    let end = (ptr as usize)
        .checked_add(len)
        .ok_or_else(|| HostError::bad_pointer(ptr, len as u64))?;
    if end > mem_size {
        return Err(HostError::bad_pointer(ptr, len as u64));
    }
    Ok(())
}

/// Borrow `len` bytes at `ptr`.
pub fn view(mem: &[u8], ptr: u32, len: usize) -> Result<&[u8], HostError> {
    validate_range(mem.len(), ptr, len)?;
    let start = ptr as usize;
    Ok(&mem[start..start + len])
}

/// Mutably borrow `len` bytes at `ptr`.
pub fn view_mut(mem: &mut [u8], ptr: u32, len: usize) -> Result<&mut [u8], HostError> {
    validate_range(mem.len(), ptr, len)?;
    let start = ptr as usize;
    Ok(&mut mem[start..start + len])
}

/// Borrow the bytes at `ptr` up to, not including, the first zero byte.
///
/// The scan stops at the end of memory; an unterminated string yields
/// everything up to the end.
pub fn view_cstr(mem: &[u8], ptr: u32) -> Result<&[u8], HostError> {
    let start = ptr as usize;
    if start > mem.len() {
        return Err(HostError::bad_pointer(ptr, 1));
    }
    let tail = &mem[start..];
    let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Ok(&tail[..len])
}

/// Borrow up to `len` bytes at `ptr`, clamped to the memory that exists.
///
/// Guest-supplied sizes are untrusted; an upload that runs past the end of
/// memory is cut short (and logged) instead of failing the whole call.
pub fn view_clamped<'a>(mem: &'a [u8], ptr: u32, len: usize, what: &str) -> &'a [u8] {
    let start = (ptr as usize).min(mem.len());
    let available = mem.len() - start;
    if len > available {
        log::warn!(
            "{}: {} bytes at {:#x} exceed guest memory, clamped to {}",
            what,
            len,
            ptr,
            available
        );
    }
    &mem[start..start + len.min(available)]
}

/// Read a little-endian u32 at `ptr`.
pub fn read_u32(mem: &[u8], ptr: u32) -> Result<u32, HostError> {
    let bytes = view(mem, ptr, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a little-endian i32 at `ptr`.
pub fn read_i32(mem: &[u8], ptr: u32) -> Result<i32, HostError> {
    read_u32(mem, ptr).map(|v| v as i32)
}

/// Write a little-endian u32 at `ptr`.
pub fn write_u32(mem: &mut [u8], ptr: u32, value: u32) -> Result<(), HostError> {
    view_mut(mem, ptr, 4)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Write a little-endian i32 at `ptr`.
pub fn write_i32(mem: &mut [u8], ptr: u32, value: i32) -> Result<(), HostError> {
    write_u32(mem, ptr, value as u32)
}

/// Write a little-endian u64 at `ptr`.
pub fn write_u64(mem: &mut [u8], ptr: u32, value: u64) -> Result<(), HostError> {
    view_mut(mem, ptr, 8)?.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Decode little-endian f32 values from `bytes`. A trailing partial value
/// is ignored.
pub fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ptr_reinterprets_bits() {
        assert_eq!(ptr(16), 16);
        assert_eq!(ptr(-1), u32::MAX);
    }

    #[test]
    fn test_elements() {
        assert_eq!(elements(3, 4), 12);
        assert_eq!(elements(-5, 4), 0);
        assert_eq!(elements(i32::MAX, usize::MAX), usize::MAX);
    }

    #[test]
    fn test_view_basic() {
        let mem = vec![10, 20, 30, 40, 50];
        assert_eq!(view(&mem, 1, 3).unwrap(), &[20, 30, 40]);
        assert_eq!(view(&mem, 5, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_view_out_of_bounds() {
        let mem = vec![10, 20, 30];
        assert!(view(&mem, 1, 3).is_err());
        assert!(view(&mem, ptr(-1), 1).is_err());
        assert!(view(&mem, 4, 0).is_err());
        assert_eq!(
            view(&mem, 2, 2).unwrap_err(),
            HostError::bad_pointer(2, 2)
        );
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut mem = vec![0; 8];
        view_mut(&mut mem, 2, 2).unwrap().copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(mem[2], 0xAA);
        assert_eq!(mem[3], 0xBB);
        assert!(view_mut(&mut mem, 7, 2).is_err());
    }

    #[test]
    fn test_view_cstr() {
        let mem = b"abc\0def".to_vec();
        assert_eq!(view_cstr(&mem, 0).unwrap(), b"abc");
        assert_eq!(view_cstr(&mem, 3).unwrap(), b"");
        // Unterminated: runs to the end of memory.
        assert_eq!(view_cstr(&mem, 4).unwrap(), b"def");
        assert_eq!(view_cstr(&mem, 7).unwrap(), b"");
        assert!(view_cstr(&mem, 8).is_err());
    }

    #[test]
    fn test_view_clamped() {
        let mem = vec![1, 2, 3, 4];
        assert_eq!(view_clamped(&mem, 1, 2, "test"), &[2, 3]);
        assert_eq!(view_clamped(&mem, 2, 100, "test"), &[3, 4]);
        assert!(view_clamped(&mem, 100, 4, "test").is_empty());
    }

    #[test]
    fn test_read_write_words() {
        let mut mem = vec![0; 16];
        write_u32(&mut mem, 4, 0x1234_5678).unwrap();
        assert_eq!(&mem[4..8], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(read_u32(&mem, 4).unwrap(), 0x1234_5678);

        write_i32(&mut mem, 0, -1).unwrap();
        assert_eq!(read_i32(&mem, 0).unwrap(), -1);

        write_u64(&mut mem, 8, 7).unwrap();
        assert_eq!(&mem[8..16], &7u64.to_le_bytes());

        assert!(write_u32(&mut mem, 14, 0).is_err());
        assert!(read_u32(&mem, 13).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(100, 0, 100).is_ok());
        assert!(validate_range(100, 0, 101).is_err());
        assert!(validate_range(100, u32::MAX, 1).is_err());
        assert!(validate_range(100, 50, usize::MAX).is_err());
    }

    #[test]
    fn test_f32s() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&(-0.5f32).to_le_bytes());
        bytes.push(0xFF);
        assert_eq!(f32s(&bytes), vec![1.0, -0.5]);
    }
}
