//! ESP-IDF / FreeRTOS port.
//!
//! - Lock: FreeRTOS mutex, created in [`LogPort::init`]
//! - ISR probe: `xPortInIsrContext()`
//! - Wall clock: `gettimeofday`, rendered as `HH:MM:SS.mmm` (UTC)
//! - Uptime: `esp_timer_get_time()` in milliseconds

use core::fmt;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use esp_idf_svc::sys;

use super::LogPort;
use crate::error::{LogError, LogResult};

const QUEUE_TYPE_MUTEX: u8 = 1;
const QUEUE_SEND_TO_BACK: sys::BaseType_t = 0;
const PD_TRUE: sys::BaseType_t = 1;

/// FreeRTOS-backed [`LogPort`].
pub struct EspPort {
    mutex: AtomicPtr<sys::QueueDefinition>,
}

impl EspPort {
    pub const fn new() -> Self {
        Self {
            mutex: AtomicPtr::new(ptr::null_mut()),
        }
    }
}

impl Default for EspPort {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: lock and unlock take and give one FreeRTOS mutex, which admits a
// single holder. Without a mutex (before init) `lock` always fails.
unsafe impl LogPort for EspPort {
    fn init(&self) -> LogResult {
        if !self.mutex.load(Ordering::Acquire).is_null() {
            return Ok(());
        }

        // SAFETY: plain FreeRTOS allocation, handle checked below
        let handle = unsafe { sys::xQueueCreateMutex(QUEUE_TYPE_MUTEX) };
        if handle.is_null() {
            return Err(LogError::Failed);
        }
        self.mutex.store(handle, Ordering::Release);
        Ok(())
    }

    fn lock(&self, timeout_ticks: u32) -> bool {
        let handle = self.mutex.load(Ordering::Acquire);
        if handle.is_null() {
            return false;
        }
        // SAFETY: handle was created by xQueueCreateMutex and is never freed
        unsafe { sys::xQueueSemaphoreTake(handle, timeout_ticks as sys::TickType_t) == PD_TRUE }
    }

    fn unlock(&self) {
        let handle = self.mutex.load(Ordering::Acquire);
        if handle.is_null() {
            return;
        }
        // SAFETY: giving a mutex we hold; a mutex give carries no payload
        unsafe {
            sys::xQueueGenericSend(handle, ptr::null(), 0, QUEUE_SEND_TO_BACK);
        }
    }

    fn in_isr(&self) -> bool {
        // SAFETY: xPortInIsrContext only reads the current core's state
        unsafe { sys::xPortInIsrContext() != 0 }
    }

    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let mut tv = sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer, timezone is unused
        unsafe {
            sys::gettimeofday(&mut tv, ptr::null_mut());
        }

        let day_secs = (tv.tv_sec as i64).rem_euclid(86_400);
        write!(
            out,
            "{:02}:{:02}:{:02}.{:03}",
            day_secs / 3600,
            (day_secs / 60) % 60,
            day_secs % 60,
            tv.tv_usec as i64 / 1000
        )
    }

    fn write_uptime(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        // SAFETY: esp_timer_get_time is always safe to call
        let now_us = unsafe { sys::esp_timer_get_time() };
        write!(out, "{}", now_us / 1000)
    }

    fn idle(&self) {
        // SAFETY: plain task delay, drain task only
        unsafe {
            sys::vTaskDelay(1);
        }
    }
}
