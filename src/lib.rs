//! # fastlog
//!
//! Structured, leveled logging with per-sink formats, rotating files and an
//! optional asynchronous drain worker.
//!
//! ## Features
//!
//! - **Per-sink configuration**: every sink has its own threshold, format
//!   (plain text or JSON) and timestamp pattern
//! - **Rotating files**: by size (`app.log.1` .. `app.log.N`) or on a
//!   schedule (`midnight`, `W0`-`W6`, `1h`, ...)
//! - **Async mode**: callers only enqueue; one worker thread writes
//! - **Failure containment**: a broken sink or observer never reaches the caller
//!
//! ## Example
//!
//! ```no_run
//! use fastlog::prelude::*;
//!
//! let logger = Logger::builder()
//!     .sink(SinkConfig::console())
//!     .sink(
//!         SinkConfig::file("logs/app.log")
//!             .with_format(LogFormat::Json)
//!             .with_max_bytes(10 * 1024 * 1024)
//!             .with_backup_count(3),
//!     )
//!     .async_mode(true)
//!     .build()?;
//! logger.start()?;
//!
//! fastlog::info!(logger, "user logged in"; user = "admin", session = 42);
//!
//! logger.shutdown();
//! # Ok::<(), fastlog::LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, FileAppender, RotationPolicy, RotationSchedule, RotationStrategy,
    };
    pub use crate::core::{
        Appender, ErrorHandler, FieldValue, LogContext, LogEntry, LogFormat, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, LoggerState, Result, Sink,
        SinkConfig, SinkKind, TimestampFormat,
    };
}

pub use crate::appenders::{ConsoleAppender, FileAppender};
pub use crate::core::{
    stderr_error_handler, Appender, Dispatcher, ErrorHandler, EventQueue, FieldValue, LogCallback,
    LogContext, LogEntry, LogFormat, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, LoggerState, Result, Sink, SinkConfig, SinkFilter, SinkKind, TimestampFormat,
    DEFAULT_TIMESTAMP_PATTERN,
};
