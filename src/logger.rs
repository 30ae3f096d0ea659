//! Logger context: producer, level filter, hex dumps and the drain step.
//!
//! # Architecture
//!
//! ```text
//! Producer tasks              ByteChannel            Drain task
//! ──────────────              ───────────            ──────────
//!
//! log() ─▶ filter ─▶ lock ─▶ render ─▶ send ─▶ [....] ─▶ drain_once() ─▶ sinks
//!          (no work below     (scratch                    (chunk = smallest
//!           threshold)         buffer)                     preferred size)
//! ```
//!
//! # Rules
//!
//! - A producer never blocks beyond [`LOG_MAX_WAIT`] ticks; a full channel
//!   drops bytes instead of stalling the caller.
//! - The write scratch buffer is only touched while holding the port lock.
//! - The read scratch buffer is only touched by the (single) drain step.
//! - Nothing is rendered or queued before init, in interrupt context, or
//!   below the threshold.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::channel::ByteChannel;
use crate::config::{
    LoggerConfig, CMP_NAME, DEFAULT_LOG_LEVEL, DUMP_BYTES_PER_LINE, LOG_BUFFER_SIZE, LOG_MAX_LINE_SIZE,
    LOG_MAX_WAIT, LOG_PUSH_WAIT, MAX_SINKS,
};
use crate::error::{LogError, LogResult};
use crate::format::{render_line, HexRow, LineHeader};
use crate::level::Severity;
use crate::port::{LogPort, PortGuard};
use crate::sink::{smallest_chunk, LogSink};

/// Counters for monitoring the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoggerStats {
    /// Bytes waiting in the channel.
    pub queued_bytes: usize,
    /// Bytes lost to a full channel.
    pub dropped_bytes: usize,
    /// Lines cut at the scratch buffer size.
    pub truncated_lines: u32,
    /// Sink writes that returned a different count than requested.
    pub short_writes: u32,
}

/// Logging pipeline context.
///
/// Construct once (usually as a `static`), call [`init`](Self::init), then
/// share by reference with every producer and the drain task.
pub struct Logger<'a, P: LogPort, const N: usize = LOG_BUFFER_SIZE> {
    port: P,
    sinks: &'a [&'a dyn LogSink],
    channel: ByteChannel<N>,

    level: AtomicU8,
    initialized: AtomicBool,
    use_color: AtomicBool,

    /// Guarded by the port lock.
    write_buf: UnsafeCell<[u8; LOG_MAX_LINE_SIZE]>,
    /// Guarded by `draining`.
    read_buf: UnsafeCell<[u8; LOG_MAX_LINE_SIZE]>,
    draining: AtomicBool,

    /// One bit per sink that short-wrote and has been reported already.
    sink_faults: AtomicU32,
    /// Set while a logger diagnostic is being produced.
    reporting: AtomicBool,

    truncated_lines: AtomicU32,
    short_writes: AtomicU32,
}

// SAFETY: write_buf is only accessed under the port lock, which `LogPort`
// implementors guarantee is exclusive. read_buf is only accessed by the
// thread that won the `draining` flag. Everything else is atomic or
// shared immutably (sinks are Sync, P: Sync).
unsafe impl<P: LogPort, const N: usize> Sync for Logger<'_, P, N> {}
unsafe impl<P: LogPort + Send, const N: usize> Send for Logger<'_, P, N> {}

impl<'a, P: LogPort, const N: usize> Logger<'a, P, N> {
    /// Create an uninitialized logger over a fixed sink list.
    pub const fn new(port: P, sinks: &'a [&'a dyn LogSink]) -> Self {
        Self {
            port,
            sinks,
            channel: ByteChannel::new(),
            level: AtomicU8::new(DEFAULT_LOG_LEVEL as u8),
            initialized: AtomicBool::new(false),
            use_color: AtomicBool::new(true),
            write_buf: UnsafeCell::new([0; LOG_MAX_LINE_SIZE]),
            read_buf: UnsafeCell::new([0; LOG_MAX_LINE_SIZE]),
            draining: AtomicBool::new(false),
            sink_faults: AtomicU32::new(0),
            reporting: AtomicBool::new(false),
            truncated_lines: AtomicU32::new(0),
            short_writes: AtomicU32::new(0),
        }
    }

    /// Bring up the port and every sink.
    ///
    /// Succeeds when the port is up and at least one sink initialized.
    /// Sinks that failed are reported once the logger is live. A failed init
    /// leaves the threshold and color setting untouched and the logger
    /// unusable until a later init succeeds.
    pub fn init(&self, config: &LoggerConfig) -> LogResult {
        self.port.init()?;

        if self.sinks.len() > MAX_SINKS {
            return Err(LogError::InvalidArgument);
        }

        let mut failed: u32 = 0;
        for (i, sink) in self.sinks.iter().enumerate() {
            if sink.init().is_err() {
                failed |= 1 << i;
            }
        }

        let all = if self.sinks.len() == MAX_SINKS {
            u32::MAX
        } else {
            (1u32 << self.sinks.len()) - 1
        };
        if failed == all {
            return Err(LogError::Failed);
        }

        self.level.store(config.default_level as u8, Ordering::Relaxed);
        self.use_color.store(config.use_color, Ordering::Relaxed);
        self.sink_faults.store(0, Ordering::Relaxed);
        self.initialized.store(true, Ordering::Release);

        for (i, sink) in self.sinks.iter().enumerate() {
            if failed & (1 << i) != 0 {
                self.report(
                    "init",
                    format_args!("Error initializing {} sink", sink.name()),
                );
            }
        }

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Current threshold.
    pub fn level(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Replace the threshold.
    pub fn set_level(&self, level: Severity) -> LogResult {
        self.set_level_raw(level as u8)
    }

    /// Replace the threshold from an untyped value.
    ///
    /// Invalid values leave the threshold unchanged and are reported at Warn.
    pub fn set_level_raw(&self, raw: u8) -> LogResult {
        if Severity::from_u8(raw).is_some() {
            self.level.store(raw, Ordering::Relaxed);
            Ok(())
        } else {
            self.report("set_level", format_args!("Invalid log level: {}", raw));
            Err(LogError::InvalidArgument)
        }
    }

    /// Toggle ANSI color markup at runtime.
    pub fn set_color(&self, use_color: bool) {
        self.use_color.store(use_color, Ordering::Relaxed);
    }

    /// Whether a line at `level` would currently be rendered.
    #[inline]
    pub fn enabled(&self, level: Severity) -> bool {
        level as u8 >= self.level.load(Ordering::Relaxed)
    }

    /// Render one line and queue it for the sinks.
    pub fn log(
        &self,
        level: Severity,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
    ) -> LogResult {
        self.log_raw(level as u8, component, function, args)
    }

    /// [`log`](Self::log) with an untyped level.
    pub fn log_raw(
        &self,
        level: u8,
        component: &str,
        function: &str,
        args: fmt::Arguments<'_>,
    ) -> LogResult {
        if self.port.in_isr() {
            return Err(LogError::Unsupported);
        }
        if !self.initialized.load(Ordering::Acquire) {
            return Err(LogError::NotInitialized);
        }
        if level >= Severity::COUNT {
            return Err(LogError::InvalidArgument);
        }
        if level < self.level.load(Ordering::Relaxed) {
            return Ok(());
        }

        let _guard = PortGuard::acquire(&self.port, LOG_MAX_WAIT).ok_or(LogError::Busy)?;

        // SAFETY: the port lock is held for the lifetime of this borrow
        let buf = unsafe { &mut *self.write_buf.get() };
        let header = LineHeader {
            level,
            component,
            function,
            use_color: self.use_color.load(Ordering::Relaxed),
        };
        let rendered =
            render_line(&mut buf[..], &self.port, &header, args).map_err(|_| LogError::Failed)?;
        if rendered.truncated {
            self.truncated_lines.fetch_add(1, Ordering::Relaxed);
        }

        self.channel.send(&buf[..rendered.len], LOG_PUSH_WAIT);
        Ok(())
    }

    /// Log `bytes` as rows of 16 uppercase hex groups.
    ///
    /// Stops at the first row that fails to log.
    pub fn dump_buffer(
        &self,
        level: Severity,
        component: &str,
        function: &str,
        bytes: &[u8],
    ) -> LogResult {
        self.dump_buffer_raw(level as u8, component, function, bytes)
    }

    /// [`dump_buffer`](Self::dump_buffer) with an untyped level.
    pub fn dump_buffer_raw(
        &self,
        level: u8,
        component: &str,
        function: &str,
        bytes: &[u8],
    ) -> LogResult {
        for row in bytes.chunks(DUMP_BYTES_PER_LINE) {
            self.log_raw(level, component, function, format_args!("{}", HexRow(row)))?;
        }
        Ok(())
    }

    /// One drain cycle: move a chunk from the channel to every sink.
    ///
    /// Blocks (via [`LogPort::idle`]) until data is queued, unless no sink
    /// is ready. Meant to be called forever from a dedicated task; always
    /// returns `Ok`.
    pub fn drain_once(&self) -> LogResult {
        if !self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Ok(());
        }

        let chunk = smallest_chunk(self.sinks).min(LOG_MAX_LINE_SIZE);
        if chunk > 0 {
            // SAFETY: exclusive via the `draining` flag
            let buf = unsafe { &mut *self.read_buf.get() };
            let received = loop {
                let n = self.channel.receive(&mut buf[..chunk]);
                if n > 0 {
                    break n;
                }
                self.port.idle();
            };
            self.fan_out(&buf[..received]);
        }

        self.draining.store(false, Ordering::Release);
        Ok(())
    }

    /// Snapshot of pipeline counters.
    pub fn stats(&self) -> LoggerStats {
        LoggerStats {
            queued_bytes: self.channel.len(),
            dropped_bytes: self.channel.dropped(),
            truncated_lines: self.truncated_lines.load(Ordering::Relaxed),
            short_writes: self.short_writes.load(Ordering::Relaxed),
        }
    }

    /// Bytes waiting in the channel.
    pub fn pending_bytes(&self) -> usize {
        self.channel.len()
    }

    pub fn sinks(&self) -> &'a [&'a dyn LogSink] {
        self.sinks
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    fn fan_out(&self, chunk: &[u8]) {
        for (i, sink) in self.sinks.iter().enumerate() {
            let written = sink.write(chunk);
            let bit = 1u32 << i;
            if written == chunk.len() {
                self.sink_faults.fetch_and(!bit, Ordering::Relaxed);
                continue;
            }

            self.short_writes.fetch_add(1, Ordering::Relaxed);
            // Report once per failure episode so a dead sink cannot keep
            // feeding its own warnings back through the channel. The latch
            // is only set once the report went out.
            if self.sink_faults.load(Ordering::Relaxed) & bit != 0 {
                continue;
            }
            let reported = self.report(
                "drain",
                format_args!(
                    "Failure writing to sink {}: tried to write: {}, written: {}",
                    sink.name(),
                    chunk.len(),
                    written
                ),
            );
            if reported {
                self.sink_faults.fetch_or(bit, Ordering::Relaxed);
            }
        }
    }

    /// Emit a Warn line about the logger itself. Reports raised while
    /// another one is in flight are dropped.
    ///
    /// Returns false when the report was suppressed by one in flight.
    fn report(&self, function: &str, args: fmt::Arguments<'_>) -> bool {
        if self.reporting.swap(true, Ordering::Acquire) {
            return false;
        }
        let _ = self.log(Severity::Warn, CMP_NAME, function, args);
        self.reporting.store(false, Ordering::Release);
        true
    }
}
