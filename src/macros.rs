//! Logging macros with `format!`-style messages and `key = value` context.
//!
//! Context fields follow the message after a `;`, in the order they are
//! written, which is the order every sink renders them in.
//!
//! # Examples
//!
//! ```
//! use fastlog::prelude::*;
//! use fastlog::{error, info};
//!
//! let logger = Logger::builder().build().unwrap();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! error!(logger, "request failed"; user = "client", error_code = 404);
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use fastlog::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use fastlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warning, "slow query"; table = "users", millis = 1200);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:ident = $value:expr),+ $(,)?) => {
        $logger.emit(
            $level,
            format!($fmt $(, $arg)*),
            $crate::LogContext::new()$(.with_field(stringify!($key), $value))+,
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.emit($level, format!($($arg)+), $crate::LogContext::new())
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use fastlog::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use fastlog::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use fastlog::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use fastlog::warning;
/// warning!(logger, "Low disk space");
/// warning!(logger, "Retry attempt {} of {}", 3, 5; host = "db-1");
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
