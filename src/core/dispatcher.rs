//! Fan-out of one entry to every sink, then to the observer callback

use super::config::LogCallback;
use super::error::{panic_message, ErrorHandler, LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use super::sink::Sink;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

thread_local! {
    /// Dispatchers whose callback is running on this thread, innermost last
    static ACTIVE_CALLBACKS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks one dispatcher's callback as running; unmarks even if it unwinds
struct CallbackScope;

impl CallbackScope {
    fn enter(dispatcher: usize) -> Self {
        ACTIVE_CALLBACKS.with(|active| active.borrow_mut().push(dispatcher));
        CallbackScope
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        ACTIVE_CALLBACKS.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Ordered sinks plus the callback, with per-sink failure isolation
///
/// Each sink sits behind its own lock, so concurrent producers in
/// synchronous mode only contend on the sink they are writing to. A sink
/// that errors or panics is reported through the error handler and the
/// remaining sinks still receive the entry.
pub struct Dispatcher {
    sinks: Vec<Mutex<Sink>>,
    callback: Option<LogCallback>,
    on_error: ErrorHandler,
    metrics: Arc<LoggerMetrics>,
}

impl Dispatcher {
    pub fn new(
        sinks: Vec<Sink>,
        callback: Option<LogCallback>,
        on_error: ErrorHandler,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sinks: sinks.into_iter().map(Mutex::new).collect(),
            callback,
            on_error,
            metrics,
        }
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Whether the current thread is inside this dispatcher's callback
    ///
    /// Callbacks of other dispatchers do not count.
    #[inline]
    pub fn in_callback(&self) -> bool {
        let id = self.id();
        ACTIVE_CALLBACKS.with(|active| active.borrow().contains(&id))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks
            .iter()
            .map(|slot| slot.lock().name().to_string())
            .collect()
    }

    /// Offer `entry` to every sink in order, then to the callback once
    ///
    /// Never fails: every failure is counted and handed to the error handler.
    pub fn dispatch(&self, entry: &LogEntry) {
        self.metrics.record_dispatched();

        for slot in &self.sinks {
            let mut sink = slot.lock();
            let outcome = catch_unwind(AssertUnwindSafe(|| sink.emit(entry)));

            match outcome {
                Ok(Ok(true)) => {
                    self.metrics.record_sink_write();
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    self.metrics.record_sink_failure();
                    (self.on_error)(&LoggerError::sink(sink.name(), e));
                }
                Err(payload) => {
                    self.metrics.record_sink_failure();
                    let message = panic_message(payload.as_ref());
                    (self.on_error)(&LoggerError::sink(
                        sink.name(),
                        LoggerError::other(format!("panicked: {}", message)),
                    ));
                }
            }
        }

        self.notify(entry);
    }

    fn notify(&self, entry: &LogEntry) {
        let Some(callback) = &self.callback else {
            return;
        };
        // Events logged by the callback itself do not re-enter it
        if self.in_callback() {
            return;
        }

        let outcome = {
            let _scope = CallbackScope::enter(self.id());
            catch_unwind(AssertUnwindSafe(|| callback(entry)))
        };

        if let Err(payload) = outcome {
            self.metrics.record_callback_failure();
            (self.on_error)(&LoggerError::callback(panic_message(payload.as_ref())));
        }
    }

    /// Flush every sink, reporting each failure
    ///
    /// # Errors
    ///
    /// Returns the first flush failure after all sinks were attempted.
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for slot in &self.sinks {
            let mut sink = slot.lock();
            if let Err(e) = sink.flush() {
                let e = LoggerError::sink(sink.name(), e);
                (self.on_error)(&e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
