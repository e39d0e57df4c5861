//! Host-side error types for the glbridge host.
//!
//! `HostError` is returned by every host-side operation that touches guest
//! memory or guest exports. The sandbox decides, per error, whether the
//! guest keeps running (protocol violations degrade to a default value) or
//! the current guest call is aborted with a trap ([`HostError::is_fatal`]).
//!
//! `Errno` is the WASI preview1 error number subset returned by the
//! `wasi_snapshot_preview1` shims, which report failure as data instead of
//! trapping.

use std::fmt;

/// WASI preview1 error numbers used by the runtime shim.
///
/// All WASI shims return `i32` errno values. `0` = success.
/// These repr values MUST match `wasi_snapshot_preview1` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Errno {
    Success = 0,
    Badf = 8,
    Fault = 21,
    Inval = 28,
    Nosys = 52,
}

impl Errno {
    /// Return the i32 representation handed back to the guest.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Success` variant.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "ERRNO_SUCCESS"),
            Self::Badf => write!(f, "ERRNO_BADF"),
            Self::Fault => write!(f, "ERRNO_FAULT"),
            Self::Inval => write!(f, "ERRNO_INVAL"),
            Self::Nosys => write!(f, "ERRNO_NOSYS"),
        }
    }
}

/// Host-side error type.
///
/// Variants split into two classes:
///
/// - protocol violations (`BadPointer`, `Internal`): the guest handed the
///   bridge something it cannot honour. The call is skipped and the guest
///   continues.
/// - fatal conditions (`Unimplemented`, `GuestAbort`, `Exit`,
///   `MissingExport`): continuing would silently produce wrong results, so
///   the current guest call traps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The range `[ptr, ptr + len)` is not inside guest memory.
    #[error("guest pointer out of bounds: {ptr:#x}+{len}")]
    BadPointer { ptr: u32, len: u64 },

    /// The guest invoked a runtime primitive the bridge deliberately does
    /// not provide.
    #[error("unimplemented host import: {0}")]
    Unimplemented(&'static str),

    /// The guest reported an unrecoverable condition of its own
    /// (failed assertion, stack smashing).
    #[error("guest aborted: {0}")]
    GuestAbort(String),

    /// The guest called `proc_exit`.
    #[error("guest exited with status {0}")]
    Exit(i32),

    /// A host import needed a guest export that the module does not provide.
    #[error("missing guest export: {0}")]
    MissingExport(&'static str),

    /// An internal host error not caused by the guest.
    #[error("internal host error: {0}")]
    Internal(String),
}

impl HostError {
    /// Create a bad-pointer error for the range `[ptr, ptr + len)`.
    pub fn bad_pointer(ptr: u32, len: u64) -> Self {
        Self::BadPointer { ptr, len }
    }

    /// Returns true if the error must abort the current guest call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unimplemented(_) | Self::GuestAbort(_) | Self::Exit(_) | Self::MissingExport(_)
        )
    }

    /// Convert to the WASI errno returned by `wasi_snapshot_preview1` shims.
    pub fn to_errno(&self) -> Errno {
        match self {
            Self::BadPointer { .. } => Errno::Fault,
            Self::Unimplemented(_) => Errno::Nosys,
            _ => Errno::Inval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_values() {
        let cases: &[(Errno, i32)] = &[
            (Errno::Success, 0),
            (Errno::Badf, 8),
            (Errno::Fault, 21),
            (Errno::Inval, 28),
            (Errno::Nosys, 52),
        ];
        for &(errno, expected) in cases {
            assert_eq!(errno.as_i32(), expected);
        }
        assert!(Errno::Success.is_success());
        assert!(!Errno::Fault.is_success());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!HostError::bad_pointer(0x10, 4).is_fatal());
        assert!(!HostError::Internal("x".into()).is_fatal());
        assert!(HostError::Unimplemented("fopen").is_fatal());
        assert!(HostError::GuestAbort("assert".into()).is_fatal());
        assert!(HostError::Exit(0).is_fatal());
        assert!(HostError::MissingExport("my_malloc").is_fatal());
    }

    #[test]
    fn test_to_errno() {
        assert_eq!(HostError::bad_pointer(0, 1).to_errno(), Errno::Fault);
        assert_eq!(HostError::Unimplemented("fread").to_errno(), Errno::Nosys);
        assert_eq!(HostError::Internal("x".into()).to_errno(), Errno::Inval);
    }

    #[test]
    fn test_display() {
        let s = format!("{}", HostError::bad_pointer(0x100, 8));
        assert!(s.contains("0x100"));
        assert!(s.contains("+8"));

        let s = format!("{}", HostError::Unimplemented("fopen"));
        assert!(s.contains("fopen"));

        assert_eq!(format!("{}", Errno::Badf), "ERRNO_BADF");
    }
}
