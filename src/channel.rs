//! Bounded byte FIFO between producers and the drain step.
//!
//! # Architecture
//!
//! ```text
//! Producers (under logger lock)     ByteChannel        Drain step
//! ─────────────────────────────     ───────────        ──────────
//!
//! send(line bytes) ───────────────▶ [b0 b1 b2 ..] ───▶ receive(chunk)
//! bounded wait                       byte stream        single consumer
//! drops what does not fit            no framing
//! ```
//!
//! # Rules
//!
//! - Lines are concatenated into one byte stream; there are no message
//!   boundaries. A line that does not fit is cut at the free-space boundary.
//! - `send` never blocks beyond its tick budget; excess bytes are dropped.
//! - `receive` is single-consumer and never blocks; blocking is the drain
//!   step's job.

use core::cell::UnsafeCell;
use core::hint;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::LOG_BUFFER_SIZE;

/// Fixed-capacity byte ring.
pub struct ByteChannel<const N: usize = LOG_BUFFER_SIZE> {
    storage: UnsafeCell<[u8; N]>,
    /// Total bytes ever written (wraps via mask).
    write_idx: AtomicUsize,
    /// Total bytes ever read (wraps via mask).
    read_idx: AtomicUsize,
    /// Writer slot; one sender copies at a time.
    writer: AtomicBool,
    dropped: AtomicUsize,
}

// SAFETY: writers are serialized by the `writer` flag, the reader only
// touches bytes between read_idx and write_idx, and indices are published
// with Release/Acquire.
unsafe impl<const N: usize> Sync for ByteChannel<N> {}
unsafe impl<const N: usize> Send for ByteChannel<N> {}

impl<const N: usize> ByteChannel<N> {
    const MASK: usize = N - 1;

    /// Create a new empty channel.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Channel size must be power of 2");

        Self {
            storage: UnsafeCell::new([0; N]),
            write_idx: AtomicUsize::new(0),
            read_idx: AtomicUsize::new(0),
            writer: AtomicBool::new(false),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Append `bytes`, waiting at most `timeout_ticks` attempts for the writer slot.
    ///
    /// Returns how many bytes were queued. Bytes that do not fit are dropped
    /// and counted; the queued part is always a prefix of `bytes`.
    pub fn send(&self, bytes: &[u8], timeout_ticks: u32) -> usize {
        if bytes.is_empty() {
            return 0;
        }

        if !self.claim_writer(timeout_ticks) {
            self.dropped.fetch_add(bytes.len(), Ordering::Relaxed);
            return 0;
        }

        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);
        let free = N - write.wrapping_sub(read);
        let count = bytes.len().min(free);

        let start = write & Self::MASK;
        let first = count.min(N - start);

        // SAFETY: we hold the writer slot, and [write, write + count) is free
        // space the reader will not touch until write_idx is published.
        unsafe {
            let base = self.storage.get() as *mut u8;
            ptr::copy_nonoverlapping(bytes.as_ptr(), base.add(start), first);
            ptr::copy_nonoverlapping(bytes.as_ptr().add(first), base, count - first);
        }

        self.write_idx
            .store(write.wrapping_add(count), Ordering::Release);
        self.writer.store(false, Ordering::Release);

        if count < bytes.len() {
            self.dropped.fetch_add(bytes.len() - count, Ordering::Relaxed);
        }
        count
    }

    /// Move up to `buf.len()` queued bytes into `buf`.
    ///
    /// Single consumer only. Returns 0 when empty.
    pub fn receive(&self, buf: &mut [u8]) -> usize {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        let count = write.wrapping_sub(read).min(buf.len());
        if count == 0 {
            return 0;
        }

        let start = read & Self::MASK;
        let first = count.min(N - start);

        // SAFETY: [read, read + count) was published by a sender and is not
        // reused until read_idx moves past it.
        unsafe {
            let base = self.storage.get() as *const u8;
            ptr::copy_nonoverlapping(base.add(start), buf.as_mut_ptr(), first);
            ptr::copy_nonoverlapping(base, buf.as_mut_ptr().add(first), count - first);
        }

        self.read_idx
            .store(read.wrapping_add(count), Ordering::Release);
        count
    }

    /// Bytes waiting to be received.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read_idx.load(Ordering::Acquire);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes dropped since creation or the last [`reset_dropped`](Self::reset_dropped).
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    fn claim_writer(&self, timeout_ticks: u32) -> bool {
        let mut attempts = 0u32;
        loop {
            if self
                .writer
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
}

impl<const N: usize> Default for ByteChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}
