//! Logger and sink configuration
//!
//! [`SinkConfig`] is plain data and deserializes with serde, so it can be
//! embedded in an application's own configuration file. [`LoggerConfig`]
//! additionally carries the runtime hooks (custom sinks, callback, error
//! handler) and is assembled in code, usually through
//! [`LoggerBuilder`](super::logger::LoggerBuilder).

use super::error::{ErrorHandler, LoggerError, Result};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::output_format::LogFormat;
use super::sink::Sink;
use super::timestamp::{TimestampFormat, DEFAULT_TIMESTAMP_PATTERN};
use crate::appenders::{
    ConsoleAppender, FileAppender, RotationPolicy, RotationSchedule, RotationStrategy,
    DEFAULT_BACKUP_COUNT,
};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Observer invoked once per dispatched event, on whichever thread dispatches
pub type LogCallback = Arc<dyn Fn(&LogEntry) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Console,
    File,
}

impl FromStr for SinkKind {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" | "stdout" => Ok(SinkKind::Console),
            "file" => Ok(SinkKind::File),
            _ => Err(LoggerError::config(
                "SinkKind",
                format!("unknown sink kind '{}'", s),
            )),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Console => f.write_str("console"),
            SinkKind::File => f.write_str("file"),
        }
    }
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_PATTERN.to_string()
}

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

/// Declarative description of one sink
///
/// # Examples
///
/// ```
/// use fastlog::{LogFormat, LogLevel, SinkConfig};
///
/// let sink = SinkConfig::file("logs/app.log")
///     .with_level(LogLevel::Debug)
///     .with_format(LogFormat::Json)
///     .with_max_bytes(10 * 1024 * 1024)
///     .with_backup_count(3);
/// assert!(sink.validate().is_ok());
///
/// // or from JSON
/// let sink: SinkConfig = serde_json::from_str(
///     r#"{"kind": "file", "path": "app.log", "level": "warning", "rotate_schedule": "midnight"}"#,
/// ).unwrap();
/// assert_eq!(sink.level, LogLevel::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub rotate_max_bytes: Option<u64>,
    #[serde(default = "default_backup_count")]
    pub rotate_backup_count: usize,
    #[serde(default)]
    pub rotate_schedule: Option<String>,
}

impl SinkConfig {
    fn of_kind(kind: SinkKind) -> Self {
        Self {
            kind,
            level: LogLevel::default(),
            format: LogFormat::default(),
            timestamp_format: default_timestamp_format(),
            path: None,
            rotate_max_bytes: None,
            rotate_backup_count: DEFAULT_BACKUP_COUNT,
            rotate_schedule: None,
        }
    }

    #[must_use]
    pub fn console() -> Self {
        Self::of_kind(SinkKind::Console)
    }

    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::of_kind(SinkKind::File)
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timestamp_format(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_format = pattern.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.rotate_max_bytes = Some(max_bytes);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.rotate_backup_count = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.rotate_schedule = Some(schedule.into());
        self
    }

    /// Check everything that can be checked without touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a file sink without a path, a bad
    /// timestamp pattern, a zero size limit or an unparsable schedule.
    pub fn validate(&self) -> Result<()> {
        self.parsed_timestamp_format()?;
        if self.kind == SinkKind::File {
            self.file_path()?;
            self.rotation_policy()?.validate()?;
        }
        Ok(())
    }

    /// Both size and schedule rotation were requested; size is used
    #[must_use]
    pub fn has_ambiguous_rotation(&self) -> bool {
        self.kind == SinkKind::File
            && self.rotate_max_bytes.is_some()
            && self.rotate_schedule.is_some()
    }

    /// Rotation policy derived from the `rotate_*` fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `rotate_schedule` does not parse.
    pub fn rotation_policy(&self) -> Result<RotationPolicy> {
        let strategy = match (self.rotate_max_bytes, self.rotate_schedule.as_deref()) {
            (Some(max_bytes), _) => RotationStrategy::size(max_bytes),
            (None, Some(schedule)) => {
                RotationStrategy::schedule(schedule.parse::<RotationSchedule>()?)
            }
            (None, None) => RotationStrategy::never(),
        };
        Ok(RotationPolicy::new()
            .with_strategy(strategy)
            .with_max_backups(self.rotate_backup_count))
    }

    /// Open the sink this configuration describes
    ///
    /// File sinks report rotation failures through `on_error`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, or the error from opening the file.
    pub fn build(&self, on_error: ErrorHandler) -> Result<Sink> {
        let timestamp_format = self.parsed_timestamp_format()?;

        let sink = match self.kind {
            SinkKind::Console => Sink::new(ConsoleAppender::stdout()),
            SinkKind::File => {
                let path = self.file_path()?;
                let policy = self.rotation_policy()?;
                Sink::new(FileAppender::with_policy(path, policy)?.with_error_handler(on_error))
            }
        };

        Ok(sink
            .with_level(self.level)
            .with_format(self.format)
            .with_timestamp_format(timestamp_format))
    }

    fn parsed_timestamp_format(&self) -> Result<TimestampFormat> {
        self.timestamp_format.parse()
    }

    fn file_path(&self) -> Result<&PathBuf> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(LoggerError::config(
                "SinkConfig",
                "file sink requires a path",
            )),
        }
    }
}

/// Everything a [`Logger`](super::logger::Logger) is built from
#[derive(Default)]
pub struct LoggerConfig {
    /// Declared sinks, dispatched in this order; empty means one console sink
    pub sinks: Vec<SinkConfig>,
    /// Prebuilt sinks appended after `sinks`
    pub custom_sinks: Vec<Sink>,
    pub callback: Option<LogCallback>,
    /// Route events through the queue and drain worker
    pub async_mode: bool,
    /// Events below this level are discarded before any work is done
    pub global_floor: Option<LogLevel>,
    /// Receives contained failures; stderr when unset
    pub on_error: Option<ErrorHandler>,
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared sinks, with the console default applied
    pub(crate) fn effective_sinks(&self) -> Vec<SinkConfig> {
        if self.sinks.is_empty() && self.custom_sinks.is_empty() {
            vec![SinkConfig::console()]
        } else {
            self.sinks.clone()
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("sinks", &self.sinks)
            .field("custom_sinks", &self.custom_sinks)
            .field("callback", &self.callback.is_some())
            .field("async_mode", &self.async_mode)
            .field("global_floor", &self.global_floor)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
