//! Log severities.
//!
//! Ordering defines filtering: a line passes when `level >= threshold`.
//! `Disabled` as a threshold lets only `Disabled` lines through, which
//! nothing emits in practice.

use crate::error::LogError;

/// Log severity, lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Critical = 5,
    Test = 6,
    Disabled = 7,
}

/// ANSI reset, appended after a colored line.
pub const COLOR_NONE: &str = "\x1b[0m";

impl Severity {
    /// Number of valid severities. Raw values at or above this are invalid.
    pub const COUNT: u8 = 8;

    /// All severities in ascending order.
    pub const ALL: [Severity; 8] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Critical,
        Severity::Test,
        Severity::Disabled,
    ];

    /// Convert from raw u8 value.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Trace),
            1 => Some(Severity::Debug),
            2 => Some(Severity::Info),
            3 => Some(Severity::Warn),
            4 => Some(Severity::Error),
            5 => Some(Severity::Critical),
            6 => Some(Severity::Test),
            7 => Some(Severity::Disabled),
            _ => None,
        }
    }

    /// Single-character tag used in the rendered line.
    pub const fn glyph(self) -> char {
        match self {
            Severity::Trace => 'T',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
            Severity::Critical => 'C',
            Severity::Test => 'S',
            Severity::Disabled => 'Y',
        }
    }

    /// ANSI foreground color for this severity.
    pub const fn color(self) -> &'static str {
        match self {
            Severity::Trace => "\x1b[34m",    // Blue
            Severity::Debug => "\x1b[37m",    // White
            Severity::Info => "\x1b[32m",     // Green
            Severity::Warn => "\x1b[33m",     // Yellow
            Severity::Error => "\x1b[31m",    // Red
            Severity::Critical => "\x1b[91m", // Bright red
            Severity::Test => "\x1b[36m",     // Cyan
            Severity::Disabled => "\x1b[90m", // Dark grey
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self, LogError> {
        Severity::from_u8(value).ok_or(LogError::InvalidArgument)
    }
}

/// Glyph for a raw level value; `X` for anything out of range.
pub fn glyph_for(raw: u8) -> char {
    match Severity::from_u8(raw) {
        Some(level) => level.glyph(),
        None => 'X',
    }
}
