//! Asynchronous boundary: unbounded FIFO plus one drain worker

use super::dispatcher::Dispatcher;
use super::error::{panic_message, LoggerError, Result};
use super::log_entry::LogEntry;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle, ThreadId};

/// Name of the worker thread that drains the queue
pub const DRAIN_THREAD_NAME: &str = "fastlog-drain";

/// Many producers, one consumer
///
/// The channel exists from construction, so events enqueued before
/// [`start`](Self::start) are buffered. The worker exits once the sender has
/// been dropped by [`shutdown`](Self::shutdown) and every buffered event has
/// been dispatched.
pub struct EventQueue {
    sender: RwLock<Option<Sender<Arc<LogEntry>>>>,
    receiver: Mutex<Option<Receiver<Arc<LogEntry>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Set by the worker before it dispatches anything
    drain_thread: Arc<OnceLock<ThreadId>>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            worker: Mutex::new(None),
            drain_thread: Arc::new(OnceLock::new()),
        }
    }

    /// Append an entry; never blocks
    ///
    /// # Errors
    ///
    /// Returns `LoggerStopped` once shutdown has begun.
    pub fn enqueue(&self, entry: Arc<LogEntry>) -> Result<()> {
        match self.sender.read().as_ref() {
            Some(sender) => sender.send(entry).map_err(|_| LoggerError::LoggerStopped),
            None => Err(LoggerError::LoggerStopped),
        }
    }

    /// Events waiting to be dispatched
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    /// Whether the caller is this queue's drain worker
    pub fn on_drain_thread(&self) -> bool {
        self.drain_thread.get() == Some(&thread::current().id())
    }

    /// Spawn the drain worker
    ///
    /// # Errors
    ///
    /// Returns `WorkerError` if the worker was already started or the thread
    /// could not be spawned.
    pub fn start(&self, dispatcher: Arc<Dispatcher>) -> Result<()> {
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| LoggerError::WorkerError("drain worker already started".to_string()))?;

        let drain_thread = Arc::clone(&self.drain_thread);
        let handle = thread::Builder::new()
            .name(DRAIN_THREAD_NAME.to_string())
            .spawn(move || {
                let _ = drain_thread.set(thread::current().id());
                for entry in receiver.iter() {
                    dispatcher.dispatch(&entry);
                }
            })
            .map_err(|e| LoggerError::WorkerError(format!("failed to spawn drain worker: {}", e)))?;

        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Stop accepting events and wait until every buffered event is dispatched
    ///
    /// Without a running worker the buffered events are dispatched on the
    /// calling thread. Called on the worker itself (from a sink or the
    /// callback) it only closes the queue; the loop ends once it is empty.
    /// A concurrent second caller waits for the same join.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError` if the worker panicked.
    pub fn shutdown(&self, dispatcher: &Dispatcher) -> Result<()> {
        drop(self.sender.write().take());

        if self.on_drain_thread() {
            return Ok(());
        }

        // Held across the join; the worker never takes this lock
        let mut worker = self.worker.lock();
        if let Some(handle) = worker.take() {
            return handle
                .join()
                .map_err(|payload| LoggerError::WorkerError(panic_message(payload.as_ref())));
        }
        drop(worker);

        let receiver = self.receiver.lock().take();
        if let Some(receiver) = receiver {
            for entry in receiver.try_iter() {
                dispatcher.dispatch(&entry);
            }
        }
        Ok(())
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
