//! Module: config
//!
//! Purpose: Sizing constants and runtime configuration for the logger.
//!
//! Architecture:
//! - Constants: compile-time sizing of the channel and scratch buffers
//! - [`LoggerConfig`]: values applied by `Logger::init`
//! - [`UartLoggerConfig`]: serial transport settings
//!
//! Safety: plain data, no shared state.

use crate::level::Severity;

/// Max ticks a producer waits for the logger lock before giving up with `Busy`.
pub const LOG_MAX_WAIT: u32 = 100;

/// Ticks a producer waits for the channel write slot. Effectively non-blocking.
pub const LOG_PUSH_WAIT: u32 = 1;

/// Channel capacity in bytes (must be a power of 2).
pub const LOG_BUFFER_SIZE: usize = 4096;

/// Largest single rendered line, terminator included.
pub const LOG_MAX_LINE_SIZE: usize = 224;

/// Source bytes rendered per hex dump line.
pub const DUMP_BYTES_PER_LINE: usize = 16;

/// Threshold applied at init unless the config says otherwise.
pub const DEFAULT_LOG_LEVEL: Severity = Severity::Info;

/// Upper bound on registered sinks (one fault-latch bit each).
pub const MAX_SINKS: usize = 32;

/// Component name used for the logger's own diagnostics.
pub const CMP_NAME: &str = "Logger";

/// Runtime logger settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Threshold installed at init.
    pub default_level: Severity,
    /// Wrap each line in ANSI color escapes.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LOG_LEVEL,
            use_color: true,
        }
    }
}

/// UART configuration for the serial sink.
///
/// The UART instance and TX pin are chosen by the peripherals handed to the
/// driver (UART1 on GPIO6 in the demo).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    /// Driver TX ring size; also the largest chunk the sink will ask for.
    pub tx_buffer_size: usize,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_buffer_size: 1024,
        }
    }
}
