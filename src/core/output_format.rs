//! Output formats for log entries
//!
//! - Plain: `[<timestamp>] [<LEVEL>] <message> key=value ...`
//! - Json: one object per line with the keys `level`, `timestamp`,
//!   `message`, `context` in that order

use super::error::{LoggerError, Result};
use super::log_context::{FieldValue, LogContext};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::io;
use std::str::FromStr;

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default)
    ///
    /// Example: `[2025-01-08 10:30:45] [INFO] started user=admin`
    #[default]
    Plain,

    /// JSON format for log-ingestion tools
    ///
    /// Example: `{"level": "INFO", "timestamp": "2025-01-08 10:30:45", "message": "started", "context": {"user": "admin"}}`
    Json,
}

impl LogFormat {
    /// Render an entry; the result carries no trailing newline
    ///
    /// # Errors
    ///
    /// Returns `FormatterError` if the JSON encoder fails.
    pub fn render(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> Result<String> {
        match self {
            LogFormat::Plain => Ok(Self::render_plain(entry, timestamp_format)),
            LogFormat::Json => Self::render_json(entry, timestamp_format),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogFormat::Plain => "plain",
            LogFormat::Json => "json",
        }
    }

    fn render_plain(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        let mut line = format!(
            "[{}] [{}] {}",
            timestamp_format.format(&entry.timestamp),
            entry.level,
            entry.message
        );

        for (key, value) in entry.context.iter() {
            line.push(' ');
            line.push_str(&LogEntry::sanitize_message(key));
            line.push('=');
            match value {
                FieldValue::String(s) => line.push_str(&LogEntry::sanitize_message(s)),
                other => line.push_str(&other.to_string()),
            }
        }

        line
    }

    fn render_json(entry: &LogEntry, timestamp_format: &TimestampFormat) -> Result<String> {
        let record = JsonRecord {
            level: entry.level,
            timestamp: timestamp_format.format(&entry.timestamp),
            message: &entry.message,
            context: &entry.context,
        };

        let mut buf = Vec::with_capacity(128);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        record
            .serialize(&mut serializer)
            .map_err(|e| LoggerError::formatter("JSON", e.to_string()))?;

        String::from_utf8(buf).map_err(|e| LoggerError::formatter("JSON", e.to_string()))
    }
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggerError::config(
                "LogFormat",
                format!("unsupported format '{}'", s),
            )),
        }
    }
}

/// Field order here is the wire order
#[derive(Serialize)]
struct JsonRecord<'a> {
    level: LogLevel,
    timestamp: String,
    message: &'a str,
    context: &'a LogContext,
}

/// Compact single-line JSON with `", "` and `": "` separators
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
