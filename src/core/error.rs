//! Error types for the logger system

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Logger already stopped
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Sink failure, tagged with the sink that produced it
    #[error("Sink '{sink}' failed: {source}")]
    SinkFailed {
        sink: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// Observer callback failure
    #[error("Observer callback failed: {message}")]
    CallbackError { message: String },

    /// Drain worker failure
    #[error("Drain worker failed: {0}")]
    WorkerError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the name of the sink it came from
    pub fn sink(sink: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::SinkFailed {
            sink: sink.into(),
            source: Box::new(source),
        }
    }

    /// Create a callback error
    pub fn callback(message: impl Into<String>) -> Self {
        LoggerError::CallbackError {
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this is a configuration-time error
    pub fn is_config(&self) -> bool {
        matches!(self, LoggerError::InvalidConfiguration { .. })
    }

    /// Whether this error (or the sink error it wraps) is a rotation failure
    pub fn is_rotation(&self) -> bool {
        match self {
            LoggerError::FileRotationError { .. } => true,
            LoggerError::SinkFailed { source, .. } => source.is_rotation(),
            _ => false,
        }
    }
}

/// Receives every failure the pipeline contains instead of propagating
///
/// Per-event failures (sink writes, rotation, callback) never reach the
/// caller of `emit`; they are handed to this hook.
pub type ErrorHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Default handler: one line per failure on stderr
pub fn stderr_error_handler() -> ErrorHandler {
    Arc::new(|err: &LoggerError| {
        if err.is_rotation() {
            eprintln!("[LOGGER WARNING] {}. Continuing with current file.", err);
        } else {
            eprintln!("[LOGGER ERROR] {}", err);
        }
    })
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
