//! Platform collaborators the logger core depends on.
//!
//! The core never calls the RTOS directly. Everything platform specific goes
//! through [`LogPort`]: the bounded-wait lock, the interrupt-context probe
//! and the time source.

use core::fmt;
use core::hint;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::LogResult;

#[cfg(target_os = "espidf")]
pub mod esp;

/// Platform services consumed by the logger.
///
/// # Safety
///
/// The logger renders into a shared scratch buffer while it holds this lock,
/// so the lock must be a real mutual exclusion:
///
/// - After [`lock`](Self::lock) returns `true`, no other caller may get
///   `true` from `lock` until the holder calls [`unlock`](Self::unlock).
/// - `unlock` is only called by the current holder.
/// - The lock must order memory (acquire on `lock`, release on `unlock`) so
///   writes made by one holder are visible to the next.
pub unsafe trait LogPort: Sync {
    /// One-time platform setup, run first thing in `Logger::init`.
    fn init(&self) -> LogResult {
        Ok(())
    }

    /// Acquire the producer lock, waiting at most `timeout_ticks`.
    fn lock(&self, timeout_ticks: u32) -> bool;

    /// Release the producer lock. Only called after a successful [`lock`](Self::lock).
    fn unlock(&self);

    /// True when running in interrupt context.
    fn in_isr(&self) -> bool;

    /// Wall-clock time as text.
    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Monotonic uptime as text.
    fn write_uptime(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Called while the drain step waits for data.
    fn idle(&self) {
        hint::spin_loop();
    }
}

/// Scoped hold on the port lock. Releases on drop.
pub struct PortGuard<'p, P: LogPort + ?Sized> {
    port: &'p P,
}

impl<'p, P: LogPort + ?Sized> PortGuard<'p, P> {
    /// Try to take the port lock within `timeout_ticks`.
    pub fn acquire(port: &'p P, timeout_ticks: u32) -> Option<Self> {
        if port.lock(timeout_ticks) {
            Some(Self { port })
        } else {
            None
        }
    }
}

impl<P: LogPort + ?Sized> Drop for PortGuard<'_, P> {
    fn drop(&mut self) {
        self.port.unlock();
    }
}

/// Spin lock with a bounded number of attempts.
///
/// Suitable as the [`LogPort::lock`] backend on hosts and in tests, where a
/// "tick" is one acquisition attempt. Not reentrant.
#[derive(Debug)]
pub struct TickLock {
    locked: AtomicBool,
}

impl TickLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Try up to `timeout_ticks + 1` times to take the lock.
    pub fn acquire(&self, timeout_ticks: u32) -> bool {
        let mut attempts = 0u32;
        loop {
            if self
                .locked
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
            if attempts >= timeout_ticks {
                return false;
            }
            attempts += 1;
            hint::spin_loop();
        }
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for TickLock {
    fn default() -> Self {
        Self::new()
    }
}
