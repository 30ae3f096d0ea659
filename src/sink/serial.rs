//! Serial log sink.
//!
//! Wraps any [`SerialPort`] transport. The preferred chunk is whatever the
//! transport can take without blocking, capped by its TX buffer size.
//!
//! # Hardware Setup (ESP32-S3, UART1 as wired by the demo)
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! **WARNING**: GPIO6 conflicts with Octal PSRAM. Only use on Quad flash boards!

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use super::LogSink;
use crate::config::UartLoggerConfig;
use crate::error::{LogError, LogResult};

/// Minimal TX-side serial transport.
pub trait SerialPort: Sync {
    /// Install/configure the driver.
    fn open(&self, config: &UartLoggerConfig) -> LogResult;

    /// Bytes that can be queued without blocking.
    fn tx_free(&self) -> usize;

    /// Queue `bytes`, returning how many were accepted.
    fn write(&self, bytes: &[u8]) -> usize;
}

/// [`LogSink`] over a serial transport.
pub struct SerialSink<U: SerialPort> {
    port: U,
    config: UartLoggerConfig,
}

impl<U: SerialPort> SerialSink<U> {
    pub const fn new(port: U, config: UartLoggerConfig) -> Self {
        Self { port, config }
    }

    pub fn port(&self) -> &U {
        &self.port
    }
}

impl<U: SerialPort> LogSink for SerialSink<U> {
    fn name(&self) -> &str {
        "Serial"
    }

    fn init(&self) -> LogResult {
        if self.config.tx_buffer_size == 0 {
            return Err(LogError::InvalidArgument);
        }
        self.port.open(&self.config)
    }

    fn preferred_chunk_size(&self) -> usize {
        self.port.tx_free().min(self.config.tx_buffer_size)
    }

    fn write(&self, bytes: &[u8]) -> usize {
        self.port.write(bytes)
    }
}

const SLOT_EMPTY: u8 = 0;
const SLOT_READY: u8 = 1;
const SLOT_BUSY: u8 = 2;

/// Holds a transport driver that is attached once and then borrowed by one
/// caller at a time.
pub struct DriverSlot<T> {
    driver: UnsafeCell<Option<T>>,
    state: AtomicU8,
}

// SAFETY: the driver is only touched by whoever moved `state` to SLOT_BUSY,
// so at most one thread holds it at a time; T: Send lets it change threads.
unsafe impl<T: Send> Sync for DriverSlot<T> {}

impl<T> DriverSlot<T> {
    pub const fn new() -> Self {
        Self {
            driver: UnsafeCell::new(None),
            state: AtomicU8::new(SLOT_EMPTY),
        }
    }

    /// Install the driver. Fails if one is already attached.
    pub fn attach(&self, driver: T) -> LogResult {
        if self
            .state
            .compare_exchange(SLOT_EMPTY, SLOT_BUSY, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(LogError::Failed);
        }
        // SAFETY: SLOT_BUSY held
        unsafe {
            *self.driver.get() = Some(driver);
        }
        self.state.store(SLOT_READY, Ordering::Release);
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.state.load(Ordering::Acquire) != SLOT_EMPTY
    }

    /// Run `f` on the driver. `None` when nothing is attached or another
    /// caller has it.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.state
            .compare_exchange(SLOT_READY, SLOT_BUSY, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        // SAFETY: SLOT_BUSY held, and SLOT_READY implies the slot is filled
        let result = unsafe { (*self.driver.get()).as_mut().map(f) };
        self.state.store(SLOT_READY, Ordering::Release);
        result
    }
}

impl<T> Default for DriverSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
pub use esp::EspUart;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::uart::{self, Uart, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::{self, EspError};

    use super::{DriverSlot, SerialPort};
    use crate::config::UartLoggerConfig;
    use crate::error::{LogError, LogResult};

    /// ESP-IDF UART transport, TX only.
    ///
    /// The HAL driver is built from peripherals with [`EspUart::driver`] and
    /// handed over once with [`EspUart::attach`], before the logger is
    /// initialized. `open` only checks that it is there.
    pub struct EspUart {
        slot: DriverSlot<UartTxDriver<'static>>,
    }

    impl EspUart {
        pub const fn new() -> Self {
            Self {
                slot: DriverSlot::new(),
            }
        }

        /// Configure a TX-only driver on `uart`, no flow control.
        pub fn driver<UART: Uart>(
            uart: impl Peripheral<P = UART> + 'static,
            tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'static,
            config: &UartLoggerConfig,
        ) -> Result<UartTxDriver<'static>, EspError> {
            let uart_config = uart::config::Config::default()
                .baudrate(Hertz(config.baud_rate))
                .tx_fifo_size(config.tx_buffer_size);

            UartTxDriver::new(
                uart,
                tx_pin,
                Option::<gpio::AnyIOPin>::None, // CTS
                Option::<gpio::AnyIOPin>::None, // RTS
                &uart_config,
            )
        }

        pub fn attach(&self, driver: UartTxDriver<'static>) -> LogResult {
            self.slot.attach(driver)
        }
    }

    impl Default for EspUart {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SerialPort for EspUart {
        fn open(&self, _config: &UartLoggerConfig) -> LogResult {
            if self.slot.is_attached() {
                Ok(())
            } else {
                Err(LogError::NotInitialized)
            }
        }

        fn tx_free(&self) -> usize {
            self.slot
                .with(|driver| {
                    let mut free: usize = 0;
                    // SAFETY: the port belongs to an installed driver, free is a valid out-pointer
                    let err = unsafe { sys::uart_get_tx_buffer_free_size(driver.port(), &mut free) };
                    if err == sys::ESP_OK {
                        free
                    } else {
                        0
                    }
                })
                .unwrap_or(0)
        }

        fn write(&self, bytes: &[u8]) -> usize {
            self.slot
                .with(|driver| driver.write(bytes).unwrap_or(0))
                .unwrap_or(0)
        }
    }
}
