//! Logger health counters
//!
//! Counts what the pipeline did with each event: how many were dispatched,
//! how many sink writes succeeded or failed, and how many failures the
//! pipeline swallowed on the caller's behalf.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for monitoring a [`Logger`](super::logger::Logger)
///
/// # Example
///
/// ```
/// use fastlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_sink_write();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.events_dispatched(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// assert!((metrics.sink_failure_rate() - 50.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events handed to the dispatcher
    events_dispatched: AtomicU64,

    /// Events accepted by the async queue
    events_enqueued: AtomicU64,

    /// Events rejected because the logger was stopped
    events_dropped: AtomicU64,

    /// Lines written by a sink
    sink_writes: AtomicU64,

    /// Sink writes that returned an error or panicked
    sink_failures: AtomicU64,

    /// Rotations that failed and fell back to the current file
    rotation_failures: AtomicU64,

    /// Observer callback invocations that panicked
    callback_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            events_dispatched: AtomicU64::new(0),
            events_enqueued: AtomicU64::new(0),
            events_dropped: AtomicU64::new(0),
            sink_writes: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            callback_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_enqueued(&self) -> u64 {
        self.events_enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_writes(&self) -> u64 {
        self.sink_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn callback_failures(&self) -> u64 {
        self.callback_failures.load(Ordering::Relaxed)
    }

    /// Record a dispatched event, returning the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.events_enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.events_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_write(&self) -> u64 {
        self.sink_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_callback_failure(&self) -> u64 {
        self.callback_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of sink writes that failed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no sink write was attempted.
    pub fn sink_failure_rate(&self) -> f64 {
        let failed = self.sink_failures() as f64;
        let total = self.sink_writes() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.events_dispatched.store(0, Ordering::Relaxed);
        self.events_enqueued.store(0, Ordering::Relaxed);
        self.events_dropped.store(0, Ordering::Relaxed);
        self.sink_writes.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.rotation_failures.store(0, Ordering::Relaxed);
        self.callback_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current counter values
    fn clone(&self) -> Self {
        Self {
            events_dispatched: AtomicU64::new(self.events_dispatched()),
            events_enqueued: AtomicU64::new(self.events_enqueued()),
            events_dropped: AtomicU64::new(self.events_dropped()),
            sink_writes: AtomicU64::new(self.sink_writes()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            rotation_failures: AtomicU64::new(self.rotation_failures()),
            callback_failures: AtomicU64::new(self.callback_failures()),
        }
    }
}
