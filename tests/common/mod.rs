//! Shared mocks for logger integration tests

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use zlogger::error::{LogError, LogResult};
use zlogger::{LogPort, LogSink, Logger, TickLock};

pub const TIME: &str = "12:34:56.789";
pub const UPTIME: &str = "4242";

/// Port with a real spin lock, a settable ISR flag and call counters.
pub struct MockPort {
    lock: TickLock,
    pub isr: AtomicBool,
    pub refuse_lock: AtomicBool,
    pub fail_init: AtomicBool,
    pub lock_calls: AtomicUsize,
    pub unlock_calls: AtomicUsize,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            lock: TickLock::new(),
            isr: AtomicBool::new(false),
            refuse_lock: AtomicBool::new(false),
            fail_init: AtomicBool::new(false),
            lock_calls: AtomicUsize::new(0),
            unlock_calls: AtomicUsize::new(0),
        }
    }

    pub fn lock_calls(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }

    pub fn unlock_calls(&self) -> usize {
        self.unlock_calls.load(Ordering::SeqCst)
    }

    pub fn set_isr(&self, isr: bool) {
        self.isr.store(isr, Ordering::SeqCst);
    }
}

// SAFETY: TickLock admits a single holder; `refuse_lock` only ever denies
unsafe impl LogPort for MockPort {
    fn init(&self) -> LogResult {
        if self.fail_init.load(Ordering::SeqCst) {
            Err(LogError::Failed)
        } else {
            Ok(())
        }
    }

    fn lock(&self, timeout_ticks: u32) -> bool {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse_lock.load(Ordering::SeqCst) {
            return false;
        }
        self.lock.acquire(timeout_ticks)
    }

    fn unlock(&self) {
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        self.lock.release();
    }

    fn in_isr(&self) -> bool {
        self.isr.load(Ordering::SeqCst)
    }

    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        assert!(self.lock.is_locked(), "line rendered without the port lock");
        out.write_str(TIME)
    }

    fn write_uptime(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(UPTIME)
    }

    fn idle(&self) {
        std::thread::yield_now();
    }
}

/// Sink that records everything it is given.
pub struct MockSink {
    name: &'static str,
    pub chunk: AtomicUsize,
    pub fail_init: bool,
    /// When set, accept at most this many bytes per write.
    pub accept_limit: AtomicUsize,
    pub received: Mutex<Vec<u8>>,
    pub writes: Mutex<Vec<usize>>,
}

impl MockSink {
    pub fn new(name: &'static str, chunk: usize) -> Self {
        Self {
            name,
            chunk: AtomicUsize::new(chunk),
            fail_init: false,
            accept_limit: AtomicUsize::new(usize::MAX),
            received: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            fail_init: true,
            ..Self::new(name, 64)
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.received.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text()
            .split_terminator("\r\n")
            .map(str::to_string)
            .collect()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes.lock().unwrap().clone()
    }

    pub fn set_accept_limit(&self, limit: usize) {
        self.accept_limit.store(limit, Ordering::SeqCst);
    }
}

impl LogSink for MockSink {
    fn name(&self) -> &str {
        self.name
    }

    fn init(&self) -> LogResult {
        if self.fail_init {
            Err(LogError::Failed)
        } else {
            Ok(())
        }
    }

    fn preferred_chunk_size(&self) -> usize {
        self.chunk.load(Ordering::SeqCst)
    }

    fn write(&self, bytes: &[u8]) -> usize {
        let accepted = bytes.len().min(self.accept_limit.load(Ordering::SeqCst));
        self.received
            .lock()
            .unwrap()
            .extend_from_slice(&bytes[..accepted]);
        self.writes.lock().unwrap().push(bytes.len());
        accepted
    }
}

/// Drain until the channel is empty. Never blocks on an empty channel.
pub fn drain_all<P: LogPort, const N: usize>(logger: &Logger<'_, P, N>) {
    while logger.pending_bytes() > 0 {
        logger.drain_once().unwrap();
    }
}

/// Plain (uncolored) rendering of one line, without the terminator.
pub fn plain_line(glyph: char, component: &str, function: &str, message: &str) -> String {
    format!("{TIME}|{UPTIME}|{glyph}|{component}|{function}:{message}")
}

/// Config without color markup.
pub fn plain_config(level: zlogger::Severity) -> zlogger::LoggerConfig {
    zlogger::LoggerConfig {
        default_level: level,
        use_color: false,
    }
}
