//! # zLogger
//!
//! Level-filtered logging pipeline for ESP32 firmware.
//!
//! ## Architecture
//!
//! Producers render lines under a bounded-wait lock and push the bytes into
//! a fixed-size [`ByteChannel`]. A dedicated drain task pulls chunks sized to
//! the smallest sink's preference and fans them out to every [`LogSink`].
//! - Producers never stall: a busy lock returns `Busy`, a full channel drops
//! - Nothing allocates; all buffers are sized at compile time
//! - Platform services (lock, ISR probe, clocks) come in through [`LogPort`]

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod macros;

pub mod channel;
pub mod config;
pub mod error;
pub mod facade;
pub mod format;
pub mod level;
pub mod logger;
pub mod port;
pub mod sink;

pub use channel::ByteChannel;
pub use config::{LoggerConfig, UartLoggerConfig};
pub use error::{LogError, LogResult};
pub use level::Severity;
pub use logger::{Logger, LoggerStats};
pub use port::{LogPort, TickLock};
pub use sink::LogSink;
