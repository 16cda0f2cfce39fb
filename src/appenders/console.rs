//! Console appender implementation

use crate::core::{Appender, LogEntry, LoggerError, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::{self, Write};

/// Writes rendered lines to standard output (or any injected writer)
pub struct ConsoleAppender {
    writer: Box<dyn Write + Send>,
    use_colors: bool,
}

impl ConsoleAppender {
    /// Appender on the process's standard output, colors off
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Appender on an arbitrary stream
    ///
    /// # Example
    ///
    /// ```
    /// use fastlog::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::with_writer(std::io::stderr());
    /// ```
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            use_colors: false,
        }
    }

    /// Color whole lines by level (`console` feature)
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    #[cfg(feature = "console")]
    fn decorate(&self, entry: &LogEntry, rendered: &str) -> String {
        if self.use_colors {
            rendered.color(entry.level.color_code()).to_string()
        } else {
            rendered.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn decorate(&self, _entry: &LogEntry, rendered: &str) -> String {
        rendered.to_string()
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Appender for ConsoleAppender {
    fn write(&mut self, entry: &LogEntry, rendered: &str) -> Result<()> {
        let line = self.decorate(entry, rendered);
        writeln!(self.writer, "{}", line)
            .map_err(|e| LoggerError::io_operation("writing to console", "write failed", e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing console", "flush failed", e))
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_one_line_per_entry() {
        let buf = SharedBuf::default();
        let mut appender = ConsoleAppender::with_writer(buf.clone());
        let entry = LogEntry::new(LogLevel::Info, "hello");

        appender.write(&entry, "[t] [INFO] hello").unwrap();
        appender.write(&entry, "[t] [INFO] again").unwrap();
        appender.flush().unwrap();

        let out = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert_eq!(out, "[t] [INFO] hello\n[t] [INFO] again\n");
    }

    #[test]
    fn test_colors_off_by_default() {
        let appender = ConsoleAppender::with_writer(io::sink());
        assert!(!appender.uses_colors());
        assert_eq!(appender.name(), "console");
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_colored_output_keeps_text() {
        colored::control::set_override(true);
        let buf = SharedBuf::default();
        let mut appender = ConsoleAppender::with_writer(buf.clone()).with_colors(true);
        let entry = LogEntry::new(LogLevel::Error, "bad");

        appender.write(&entry, "[t] [ERROR] bad").unwrap();

        let out = String::from_utf8(buf.0.lock().clone()).unwrap();
        assert!(out.contains("[t] [ERROR] bad"));
        assert!(out.contains('\u{1b}'));
    }
}
