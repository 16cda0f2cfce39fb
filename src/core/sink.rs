//! Runtime sinks: an appender plus the threshold and rendering it applies

use super::appender::Appender;
use super::error::Result;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::output_format::LogFormat;
use super::timestamp::TimestampFormat;
use std::fmt;
use std::sync::Arc;

/// Extra per-sink predicate evaluated after the level threshold
pub type SinkFilter = Arc<dyn Fn(&LogEntry) -> bool + Send + Sync>;

/// One output destination with its own threshold, format and timestamp
///
/// # Example
///
/// ```
/// use fastlog::appenders::ConsoleAppender;
/// use fastlog::{LogFormat, LogLevel, Sink};
///
/// let sink = Sink::new(ConsoleAppender::stdout())
///     .with_level(LogLevel::Warning)
///     .with_format(LogFormat::Json)
///     .with_filter(|entry| !entry.message.contains("healthcheck"));
///
/// assert!(sink.eligible(LogLevel::Error));
/// assert!(!sink.eligible(LogLevel::Info));
/// ```
pub struct Sink {
    name: String,
    threshold: LogLevel,
    format: LogFormat,
    timestamp_format: TimestampFormat,
    appender: Box<dyn Appender>,
    filter: Option<SinkFilter>,
}

impl Sink {
    /// Wrap an appender with the defaults: INFO, plain, default timestamp
    pub fn new(appender: impl Appender + 'static) -> Self {
        Self::from_boxed(Box::new(appender))
    }

    pub fn from_boxed(appender: Box<dyn Appender>) -> Self {
        Self {
            name: appender.name().to_string(),
            threshold: LogLevel::default(),
            format: LogFormat::default(),
            timestamp_format: TimestampFormat::default(),
            appender,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_level(mut self, threshold: LogLevel) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, timestamp_format: TimestampFormat) -> Self {
        self.timestamp_format = timestamp_format;
        self
    }

    /// Only write entries the predicate accepts
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&LogEntry) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    #[inline]
    pub fn eligible(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    /// Render and write one entry
    ///
    /// Returns `Ok(false)` when the entry is below the threshold or rejected
    /// by the filter, `Ok(true)` once the line was written and flushed.
    ///
    /// # Errors
    ///
    /// Returns the rendering or appender error; the caller decides how to
    /// contain it.
    pub fn emit(&mut self, entry: &LogEntry) -> Result<bool> {
        if !self.eligible(entry.level) {
            return Ok(false);
        }
        if let Some(filter) = &self.filter {
            if !filter(entry) {
                return Ok(false);
            }
        }

        let rendered = self.format.render(entry, &self.timestamp_format)?;
        self.appender.write(entry, &rendered)?;
        self.appender.flush()?;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.appender.flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("format", &self.format)
            .field("timestamp_format", &self.timestamp_format)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
