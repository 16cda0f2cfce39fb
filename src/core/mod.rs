//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod queue;
pub mod sink;
pub mod timestamp;

pub use appender::Appender;
pub use config::{LogCallback, LoggerConfig, SinkConfig, SinkKind};
pub use dispatcher::Dispatcher;
pub use error::{stderr_error_handler, ErrorHandler, LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerState};
pub use metrics::LoggerMetrics;
pub use output_format::LogFormat;
pub use queue::{EventQueue, DRAIN_THREAD_NAME};
pub use sink::{Sink, SinkFilter};
pub use timestamp::{TimestampFormat, DEFAULT_TIMESTAMP_PATTERN};
