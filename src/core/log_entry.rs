//! Log entry structure

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::Serialize;

/// A single log event
///
/// Built once per emit call and shared read-only (behind an `Arc`) by every
/// sink and by the observer callback. `timestamp` is the capture time, so
/// every rendering shows the same instant however long the entry waited in
/// the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub context: LogContext,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a message can never forge an extra line in a plain-text sink.
    pub(crate) fn sanitize_message(message: &str) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message.to_string();
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(level, message, Local::now())
    }

    /// Build an entry with an explicit capture time
    pub fn at(level: LogLevel, message: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        let message = message.into();
        Self {
            level,
            timestamp,
            message: Self::sanitize_message(&message),
            context: LogContext::new(),
        }
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "line one\nERROR forged\tentry\r");
        assert_eq!(entry.message, "line one\\nERROR forged\\tentry\\r");
    }

    #[test]
    fn test_timestamp_is_capture_time() {
        let before = Local::now();
        let entry = LogEntry::new(LogLevel::Debug, "hello");
        let after = Local::now();
        assert!(entry.timestamp >= before && entry.timestamp <= after);
    }

    #[test]
    fn test_with_context() {
        let entry = LogEntry::new(LogLevel::Warning, "disk")
            .with_context(LogContext::from([("free_mb", 12)]));
        assert_eq!(entry.context.format_fields(), "free_mb=12");
    }
}
