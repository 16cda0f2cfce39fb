//! Timestamp formatting utilities
//!
//! Each sink renders the entry's capture time with its own format, most often
//! a strftime pattern.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::str::FromStr;

/// Pattern used when a sink does not configure one
pub const DEFAULT_TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use fastlog::TimestampFormat;
///
/// // strftime pattern
/// let format: TimestampFormat = "%d/%b/%Y:%H:%M:%S %z".parse().unwrap();
///
/// // named presets
/// let format: TimestampFormat = "rfc3339".parse().unwrap();
/// assert_eq!(format, TimestampFormat::Rfc3339);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339 with local offset: `2025-01-08T10:30:45.123+01:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// strftime pattern, validated when parsed
    Pattern(String),
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Pattern(DEFAULT_TIMESTAMP_PATTERN.to_string())
    }
}

impl TimestampFormat {
    /// Build a pattern format, rejecting malformed strftime specifiers
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the pattern contains an unknown
    /// or incomplete specifier.
    pub fn pattern(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "timestamp_format",
                format!("invalid strftime pattern '{}'", pattern),
            ));
        }
        Ok(TimestampFormat::Pattern(pattern))
    }

    /// Format a capture time according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
            }
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Pattern(pattern) => datetime.format(pattern).to_string(),
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "unix" => Ok(TimestampFormat::Unix),
            "unix_millis" => Ok(TimestampFormat::UnixMillis),
            _ => TimestampFormat::pattern(s),
        }
    }
}
