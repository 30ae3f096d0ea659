//! zLogger demo firmware
//!
//! Wires the logger to a platform port and its sinks, starts the drain task
//! and logs from a few producer threads.
//! - ESP-IDF: FreeRTOS port, UART sink on GPIO6
//! - Host: std clock port, stdout sink

use std::thread;
use std::time::Duration;

use zlogger::{
    zlog_dump, zlog_info, zlog_warn, LogPort, LogSink, Logger, LoggerConfig, Severity,
};

const CMP_NAME: &str = "Demo";

#[cfg(target_os = "espidf")]
mod platform {
    use esp_idf_svc::hal::peripherals::Peripherals;
    use zlogger::port::esp::EspPort;
    use zlogger::sink::serial::{EspUart, SerialSink};
    use zlogger::{LogSink, UartLoggerConfig};

    pub type Port = EspPort;

    const UART_CONFIG: UartLoggerConfig = UartLoggerConfig {
        baud_rate: 115200,
        tx_buffer_size: 1024,
    };

    static SERIAL: SerialSink<EspUart> = SerialSink::new(EspUart::new(), UART_CONFIG);
    pub static SINKS: [&dyn LogSink; 1] = [&SERIAL];

    /// UART1 TX on GPIO6. Without a driver the serial sink fails its init.
    pub fn setup() {
        esp_idf_svc::sys::link_patches();

        let Ok(peripherals) = Peripherals::take() else {
            return;
        };
        if let Ok(driver) = EspUart::driver(peripherals.uart1, peripherals.pins.gpio6, &UART_CONFIG) {
            let _ = SERIAL.port().attach(driver);
        }
    }

    pub fn port() -> Port {
        EspPort::new()
    }
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use std::fmt;
    use std::io::Write;
    use std::time::{Instant, SystemTime, UNIX_EPOCH};

    use zlogger::error::LogResult;
    use zlogger::{LogPort, LogSink, TickLock};

    /// Host stand-in for the RTOS: spin lock, std clocks.
    pub struct Port {
        lock: TickLock,
        boot: Instant,
    }

    // SAFETY: TickLock grants the lock to one caller at a time
    unsafe impl LogPort for Port {
        fn lock(&self, timeout_ticks: u32) -> bool {
            self.lock.acquire(timeout_ticks)
        }

        fn unlock(&self) {
            self.lock.release();
        }

        fn in_isr(&self) -> bool {
            false
        }

        fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            let day_secs = now.as_secs() % 86_400;
            write!(
                out,
                "{:02}:{:02}:{:02}.{:03}",
                day_secs / 3600,
                (day_secs / 60) % 60,
                day_secs % 60,
                now.subsec_millis()
            )
        }

        fn write_uptime(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "{}", self.boot.elapsed().as_millis())
        }

        fn idle(&self) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    pub struct StdoutSink;

    impl LogSink for StdoutSink {
        fn name(&self) -> &str {
            "Stdout"
        }

        fn init(&self) -> LogResult {
            Ok(())
        }

        fn preferred_chunk_size(&self) -> usize {
            128
        }

        fn write(&self, bytes: &[u8]) -> usize {
            let mut out = std::io::stdout().lock();
            match out.write_all(bytes).and_then(|_| out.flush()) {
                Ok(()) => bytes.len(),
                Err(_) => 0,
            }
        }
    }

    static STDOUT: StdoutSink = StdoutSink;
    pub static SINKS: [&dyn LogSink; 1] = [&STDOUT];

    pub fn setup() {}

    pub fn port() -> Port {
        Port {
            lock: TickLock::new(),
            boot: Instant::now(),
        }
    }
}

fn main() {
    platform::setup();

    let logger: &'static Logger<'static, platform::Port> =
        Box::leak(Box::new(Logger::<platform::Port>::new(
            platform::port(),
            &platform::SINKS,
        )));

    if logger.init(&LoggerConfig::default()).is_err() {
        // No sink came up; nothing can be reported.
        return;
    }
    let _ = zlogger::facade::install(logger);

    thread::spawn(move || loop {
        let _ = logger.drain_once();
    });

    let _ = zlog_info!(logger, CMP_NAME, "{}", env!("VERSION_STRING"));
    let _ = zlog_info!(logger, CMP_NAME, "sinks: {}", sink_names(logger.sinks()));
    log::info!("log facade routed through zLogger");

    let workers: Vec<_> = (0..3)
        .map(|id| {
            thread::spawn(move || {
                for n in 0..5 {
                    if zlog_info!(logger, CMP_NAME, "worker {} tick {}", id, n).is_err() {
                        let _ = zlog_warn!(logger, CMP_NAME, "worker {} lost a line", id);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    let frame: Vec<u8> = (0u8..40).collect();
    let _ = zlog_dump!(logger, Severity::Debug, CMP_NAME, &frame);
    let _ = logger.set_level(Severity::Debug);
    let _ = zlog_dump!(logger, Severity::Debug, CMP_NAME, &frame);

    let stats = logger.stats();
    let _ = zlog_info!(
        logger,
        CMP_NAME,
        "dropped={} truncated={} short_writes={}",
        stats.dropped_bytes,
        stats.truncated_lines,
        stats.short_writes
    );

    // Let the drain task flush before exit
    while logger.pending_bytes() > 0 {
        logger.port().idle();
    }
    thread::sleep(Duration::from_millis(20));
}

fn sink_names(sinks: &[&dyn LogSink]) -> String {
    sinks
        .iter()
        .map(|sink| sink.name())
        .collect::<Vec<_>>()
        .join(",")
}
