//! Appender trait for log output destinations
//!
//! An appender is the byte sink behind a [`Sink`](super::sink::Sink): the
//! sink decides whether an entry is eligible and renders it, the appender
//! only writes the rendered line. Implement this trait to route output to a
//! destination the crate does not ship (an HTTP collector, a socket, a
//! test buffer).
//!
//! # Example
//!
//! ```
//! use fastlog::core::{Appender, LogEntry, Result};
//!
//! struct Collector(Vec<String>);
//!
//! impl Appender for Collector {
//!     fn write(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
//!         self.0.push(rendered.to_string());
//!         Ok(())
//!     }
//!
//!     fn flush(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "collector"
//!     }
//! }
//! ```

use super::{error::Result, log_entry::LogEntry};

pub trait Appender: Send {
    /// Write one rendered line (without trailing newline)
    ///
    /// `entry` is the source of `rendered`; appenders that make decisions
    /// on event data (time-based rotation) read it, others ignore it.
    fn write(&mut self, entry: &LogEntry, rendered: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn name(&self) -> &str;
}
