//! Main logger implementation

use super::{
    appender::Appender,
    config::{LogCallback, LoggerConfig, SinkConfig},
    dispatcher::Dispatcher,
    error::{stderr_error_handler, ErrorHandler, LoggerError, Result},
    log_context::LogContext,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    queue::EventQueue,
    sink::Sink,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a [`Logger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    /// Built; synchronous loggers already write, asynchronous ones buffer
    Ready,
    /// Drain worker running (asynchronous mode)
    Running,
    /// Terminal; further events are reported and dropped
    Stopped,
}

impl LoggerState {
    fn as_u8(self) -> u8 {
        match self {
            LoggerState::Ready => 0,
            LoggerState::Running => 1,
            LoggerState::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Ready,
            1 => LoggerState::Running,
            _ => LoggerState::Stopped,
        }
    }
}

/// The logging facade
///
/// Owns the sinks (through its [`Dispatcher`]) and, in asynchronous mode, the
/// [`EventQueue`] with its drain worker. Share it between threads as
/// `Arc<Logger>`.
///
/// # Example
///
/// ```no_run
/// use fastlog::prelude::*;
///
/// let logger = Logger::builder()
///     .sink(SinkConfig::console().with_level(LogLevel::Debug))
///     .sink(SinkConfig::file("logs/app.json").with_format(LogFormat::Json))
///     .async_mode(true)
///     .build()?;
///
/// logger.start()?;
/// logger.info("service started");
/// logger.error_with_context(
///     "request failed",
///     LogContext::new().with_field("user", "client").with_field("error_code", 404),
/// );
/// logger.shutdown();
/// # Ok::<(), fastlog::LoggerError>(())
/// ```
pub struct Logger {
    dispatcher: Arc<Dispatcher>,
    queue: Option<EventQueue>,
    state: AtomicU8,
    /// Serializes start / shutdown
    lifecycle: Mutex<()>,
    global_floor: Option<LogLevel>,
    on_error: ErrorHandler,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Build every sink and the pipeline; nothing runs until [`start`](Self::start)
    /// in asynchronous mode
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for any invalid sink (checked before any
    /// file is opened), or the error from opening a file sink.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let metrics = Arc::new(LoggerMetrics::new());
        let on_error = Self::counting_handler(
            config.on_error.clone().unwrap_or_else(stderr_error_handler),
            Arc::clone(&metrics),
        );

        let declared = config.effective_sinks();
        for sink in &declared {
            sink.validate()?;
        }

        let mut sinks = Vec::with_capacity(declared.len() + config.custom_sinks.len());
        for sink_config in &declared {
            if sink_config.has_ambiguous_rotation() {
                on_error(&LoggerError::config(
                    Self::describe(sink_config),
                    "both rotate_max_bytes and rotate_schedule are set; rotating by size",
                ));
            }
            sinks.push(sink_config.build(Arc::clone(&on_error))?);
        }
        sinks.extend(config.custom_sinks);

        let dispatcher = Arc::new(Dispatcher::new(
            sinks,
            config.callback,
            Arc::clone(&on_error),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            dispatcher,
            queue: config.async_mode.then(EventQueue::new),
            state: AtomicU8::new(LoggerState::Ready.as_u8()),
            lifecycle: Mutex::new(()),
            global_floor: config.global_floor,
            on_error,
            metrics,
        })
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn describe(sink: &SinkConfig) -> String {
        match &sink.path {
            Some(path) => format!("{} sink '{}'", sink.kind, path.display()),
            None => format!("{} sink", sink.kind),
        }
    }

    /// Wrap the user's handler so contained failures are also counted
    fn counting_handler(inner: ErrorHandler, metrics: Arc<LoggerMetrics>) -> ErrorHandler {
        Arc::new(move |err: &LoggerError| {
            if matches!(err, LoggerError::FileRotationError { .. }) {
                metrics.record_rotation_failure();
            }
            inner(err);
        })
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_async(&self) -> bool {
        self.queue.is_some()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn sink_count(&self) -> usize {
        self.dispatcher.sink_count()
    }

    /// Sink names in dispatch order
    pub fn sink_names(&self) -> Vec<String> {
        self.dispatcher.sink_names()
    }

    /// Events accepted but not yet dispatched; always 0 in synchronous mode
    pub fn pending(&self) -> usize {
        self.queue.as_ref().map_or(0, EventQueue::pending)
    }

    /// Ready -> Running; spawns the drain worker in asynchronous mode
    ///
    /// Starting a running logger is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `LoggerStopped` after shutdown, or `WorkerError` if the worker
    /// thread could not be spawned.
    pub fn start(&self) -> Result<()> {
        let _guard = self.lifecycle.lock();
        match self.state() {
            LoggerState::Running => Ok(()),
            LoggerState::Stopped => Err(LoggerError::LoggerStopped),
            LoggerState::Ready => {
                if let Some(queue) = &self.queue {
                    queue.start(Arc::clone(&self.dispatcher))?;
                }
                self.state
                    .store(LoggerState::Running.as_u8(), Ordering::Release);
                Ok(())
            }
        }
    }

    /// Stop accepting events, drain everything already accepted, flush
    ///
    /// Blocks until the drain worker has dispatched every event enqueued
    /// before the first call. Idempotent; a call made on the drain worker
    /// itself (from a sink or the callback) returns without waiting.
    pub fn shutdown(&self) {
        {
            let _guard = self.lifecycle.lock();
            self.state
                .store(LoggerState::Stopped.as_u8(), Ordering::Release);
        }

        if let Some(queue) = &self.queue {
            if let Err(e) = queue.shutdown(&self.dispatcher) {
                (self.on_error)(&e);
            }
        }
        // flush failures were already reported per sink
        let _ = self.dispatcher.flush();
    }

    /// Flush every sink now
    ///
    /// In asynchronous mode this does not wait for queued events.
    ///
    /// # Errors
    ///
    /// Returns the first sink flush failure.
    pub fn flush(&self) -> Result<()> {
        self.dispatcher.flush()
    }

    /// Log one event captured now
    ///
    /// Failures never reach the caller: they go to the error handler.
    pub fn emit(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        if self.below_floor(level) {
            return;
        }
        self.dispatch_or_enqueue(LogEntry::new(level, message).with_context(context));
    }

    /// Submit an entry built elsewhere, keeping its capture time
    ///
    /// Used to forward events recorded by another component; rotation
    /// schedules and rendered timestamps follow `entry.timestamp`.
    pub fn submit(&self, entry: LogEntry) {
        if self.below_floor(entry.level) {
            return;
        }
        let message = LogEntry::sanitize_message(&entry.message);
        self.dispatch_or_enqueue(LogEntry { message, ..entry });
    }

    #[inline]
    fn below_floor(&self, level: LogLevel) -> bool {
        self.global_floor.is_some_and(|floor| level < floor)
    }

    fn dispatch_or_enqueue(&self, entry: LogEntry) {
        // Logged by this logger's own callback: part of an event already
        // being dispatched, so it is written here, on this thread
        if self.dispatcher.in_callback() {
            self.dispatcher.dispatch(&entry);
            return;
        }

        if self.state() == LoggerState::Stopped {
            self.reject();
            return;
        }

        match &self.queue {
            Some(queue) => match queue.enqueue(Arc::new(entry)) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                }
                Err(_) => self.reject(),
            },
            None => self.dispatcher.dispatch(&entry),
        }
    }

    fn reject(&self) {
        self.metrics.record_dropped();
        (self.on_error)(&LoggerError::LoggerStopped);
    }

    #[inline]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(level, message, LogContext::new());
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }

    pub fn debug_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit(LogLevel::Debug, message, context);
    }

    pub fn info_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit(LogLevel::Info, message, context);
    }

    pub fn warning_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit(LogLevel::Warning, message, context);
    }

    pub fn error_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit(LogLevel::Error, message, context);
    }

    pub fn critical_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit(LogLevel::Critical, message, context);
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use fastlog::prelude::*;
///
/// let logger = Logger::builder()
///     .sink(SinkConfig::console().with_level(LogLevel::Warning))
///     .global_floor(LogLevel::Info)
///     .callback(|entry: &LogEntry| {
///         if entry.level >= LogLevel::Error {
///             // page someone
///         }
///     })
///     .on_error(|err: &LoggerError| eprintln!("logging failed: {}", err))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Add a declared sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: SinkConfig) -> Self {
        self.config.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = SinkConfig>) -> Self {
        self.config.sinks.extend(sinks);
        self
    }

    /// Add a prebuilt sink; dispatched after all declared sinks
    #[must_use = "builder methods return a new value"]
    pub fn custom_sink(mut self, sink: Sink) -> Self {
        self.config.custom_sinks.push(sink);
        self
    }

    /// Add a custom appender with the default sink settings
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(self, appender: A) -> Self {
        self.custom_sink(Sink::new(appender))
    }

    /// Observer invoked once per dispatched event
    #[must_use = "builder methods return a new value"]
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        let callback: LogCallback = Arc::new(callback);
        self.config.callback = Some(callback);
        self
    }

    /// Dispatch on a drain worker instead of the calling thread
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, enabled: bool) -> Self {
        self.config.async_mode = enabled;
        self
    }

    /// Discard events below `level` before any sink or the callback sees them
    #[must_use = "builder methods return a new value"]
    pub fn global_floor(mut self, level: LogLevel) -> Self {
        self.config.global_floor = Some(level);
        self
    }

    /// Receive contained failures instead of the stderr default
    #[must_use = "builder methods return a new value"]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        let handler: ErrorHandler = Arc::new(handler);
        self.config.on_error = Some(handler);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// See [`Logger::new`].
    pub fn build(self) -> Result<Logger> {
        Logger::new(self.config)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
