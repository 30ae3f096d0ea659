//! Bridge from the `log` crate.
//!
//! Lets drivers and third-party crates that use `log::info!` and friends
//! write through the same pipeline. The record target becomes the component
//! and the module path stands in for the function.

use crate::level::Severity;
use crate::logger::Logger;
use crate::port::LogPort;

/// Map a `log` level onto a severity.
pub fn severity_from(level: log::Level) -> Severity {
    match level {
        log::Level::Error => Severity::Error,
        log::Level::Warn => Severity::Warn,
        log::Level::Info => Severity::Info,
        log::Level::Debug => Severity::Debug,
        log::Level::Trace => Severity::Trace,
    }
}

impl<P: LogPort + Send, const N: usize> log::Log for Logger<'static, P, N> {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.enabled(severity_from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        // Nowhere to report a failure to; the status is dropped like a full channel would.
        let _ = Logger::log(
            self,
            severity_from(record.level()),
            record.target(),
            record.module_path().unwrap_or("?"),
            *record.args(),
        );
    }

    fn flush(&self) {}
}

/// Install `logger` as the global `log` backend.
///
/// Filtering stays with the logger's own threshold, so the `log` max level
/// is opened all the way up.
pub fn install<P: LogPort + Send, const N: usize>(
    logger: &'static Logger<'static, P, N>,
) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
