//! Partial-line log aggregation for guest output.
//!
//! The guest logs in fragments. `LineLogger` buffers fragments and yields a
//! complete line once a fragment ends in `'\n'`. All fragments share one
//! buffer regardless of severity; the flushed line carries the severity of
//! the fragment that completed it.

use std::fmt;

/// Guest log severity, decoded from the integer the guest passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Debug,
}

impl Severity {
    /// `0` = error, `1` = warn, `2` = info, anything else = debug.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// The `log` crate level this severity is routed to.
    pub fn level(self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

/// A flushed guest log line. `message` keeps its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

impl LogLine {
    /// Route the line to the `log` sink matching its severity.
    pub fn emit(&self) {
        log::log!(
            target: "guest",
            self.severity.level(),
            "{}",
            self.message.trim_end_matches(['\n', '\r'])
        );
    }
}

/// Buffers guest log fragments until a line terminator arrives.
#[derive(Debug, Clone)]
pub struct LineLogger {
    fragments: Vec<String>,
    pending_bytes: usize,
    max_pending_bytes: usize,
}

impl LineLogger {
    /// Create an idle logger. A pending line longer than
    /// `max_pending_bytes` is flushed without waiting for a terminator.
    pub fn new(max_pending_bytes: usize) -> Self {
        Self {
            fragments: Vec::new(),
            pending_bytes: 0,
            max_pending_bytes,
        }
    }

    /// Append a fragment. Returns the completed line when `fragment` ends
    /// in `'\n'`, leaving the logger idle again.
    pub fn push(&mut self, severity: Severity, fragment: &str) -> Option<LogLine> {
        self.pending_bytes += fragment.len();
        self.fragments.push(fragment.to_string());
        if fragment.ends_with('\n') || self.pending_bytes > self.max_pending_bytes {
            return Some(self.take(severity));
        }
        None
    }

    /// Flush whatever is pending, terminated or not.
    pub fn flush(&mut self, severity: Severity) -> Option<LogLine> {
        if self.fragments.is_empty() {
            return None;
        }
        Some(self.take(severity))
    }

    /// Returns true while a partial line is buffered.
    pub fn is_accumulating(&self) -> bool {
        !self.fragments.is_empty()
    }

    fn take(&mut self, severity: Severity) -> LogLine {
        let message = self.fragments.concat();
        self.fragments.clear();
        self.pending_bytes = 0;
        LogLine { severity, message }
    }
}

impl Default for LineLogger {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}
