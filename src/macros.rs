//! Call-site logging macros.
//!
//! These fill in the enclosing function name so call sites only name the
//! logger, level and component.
//!
//! # Example
//!
//! ```ignore
//! const CMP_NAME: &str = "Radio";
//!
//! fn tune(freq: u32) {
//!     let _ = zlog_info!(LOGGER, CMP_NAME, "tuning to {} Hz", freq);
//!     // → "...|I|Radio|tune:tuning to 7030000 Hz"
//! }
//! ```

/// Name of the enclosing function, without its module path.
///
/// Closures report the function they are defined in.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Log a formatted line. Evaluates to a [`LogResult`](crate::LogResult).
#[macro_export]
macro_rules! zlog {
    ($logger:expr, $level:expr, $component:expr, $($arg:tt)+) => {
        $logger.log($level, $component, $crate::function_name!(), format_args!($($arg)+))
    };
}

/// Hex dump a byte slice, 16 bytes per line.
#[macro_export]
macro_rules! zlog_dump {
    ($logger:expr, $level:expr, $component:expr, $bytes:expr) => {
        $logger.dump_buffer($level, $component, $crate::function_name!(), $bytes)
    };
}

/// Critical log.
#[macro_export]
macro_rules! zlog_crit {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Critical, $component, $($arg)+)
    };
}

/// Error log.
#[macro_export]
macro_rules! zlog_error {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Error, $component, $($arg)+)
    };
}

/// Warning log.
#[macro_export]
macro_rules! zlog_warn {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Warn, $component, $($arg)+)
    };
}

/// Info log.
#[macro_export]
macro_rules! zlog_info {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Info, $component, $($arg)+)
    };
}

/// Debug log.
#[macro_export]
macro_rules! zlog_debug {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Debug, $component, $($arg)+)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! zlog_trace {
    ($logger:expr, $component:expr, $($arg:tt)+) => {
        $crate::zlog!($logger, $crate::Severity::Trace, $component, $($arg)+)
    };
}
