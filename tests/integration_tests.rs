//! Integration tests for the logging pipeline
//!
//! These tests verify:
//! - Console + JSON file end to end
//! - Per-sink thresholds and filters
//! - Sink failure isolation, including a file that fails at write time
//! - Async drain on shutdown
//! - Size and schedule rotation through a logger
//! - Log injection prevention
//! - Configuration errors

use fastlog::appenders::ConsoleAppender;
use fastlog::prelude::*;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Stand-in for stdout that tests can read back
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("utf-8 output")
    }

    fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn console_sink(buffer: &SharedBuffer, level: LogLevel) -> Sink {
    Sink::new(ConsoleAppender::with_writer(buffer.clone())).with_level(level)
}

/// Error handler that records every contained failure
fn recording_handler() -> (Arc<Mutex<Vec<String>>>, impl Fn(&LoggerError) + Send + Sync) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |err: &LoggerError| sink.lock().push(err.to_string()))
}

struct AlwaysFails;

impl Appender for AlwaysFails {
    fn write(&mut self, _entry: &LogEntry, _rendered: &str) -> fastlog::Result<()> {
        Err(LoggerError::writer("device gone"))
    }

    fn flush(&mut self) -> fastlog::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "always-fails"
    }
}

#[test]
fn test_console_and_json_file_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let json_path = temp_dir.path().join("logs").join("app.json");
    let console = SharedBuffer::default();

    let logger = Logger::builder()
        .sink(
            SinkConfig::file(&json_path)
                .with_level(LogLevel::Debug)
                .with_format(LogFormat::Json),
        )
        .custom_sink(console_sink(&console, LogLevel::Info))
        .build()
        .expect("Failed to build logger");

    logger.debug("warming cache");
    logger.info_with_context("user logged in", LogContext::from([("user", "admin")]));
    logger.error_with_context(
        "request failed",
        LogContext::new()
            .with_field("user", "client")
            .with_field("error_code", 404),
    );
    logger.shutdown();

    let console_lines = console.lines();
    assert_eq!(console_lines.len(), 2);
    assert!(console_lines[0].ends_with("[INFO] user logged in user=admin"));
    assert!(console_lines[1].ends_with("[ERROR] request failed user=client error_code=404"));

    let content = fs::read_to_string(&json_path).expect("Failed to read JSON log");
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["level"], "DEBUG");
    assert_eq!(records[2]["level"], "ERROR");
    assert_eq!(records[2]["message"], "request failed");
    assert_eq!(records[2]["context"]["user"], "client");
    assert_eq!(records[2]["context"]["error_code"], 404);

    let last = content.lines().last().expect("at least one line");
    assert!(last.starts_with(r#"{"level": "ERROR", "timestamp": ""#));
    assert!(last.ends_with(r#""context": {"user": "client", "error_code": 404}}"#));
}

#[test]
fn test_threshold_filtering_per_sink() {
    let verbose = SharedBuffer::default();
    let quiet = SharedBuffer::default();

    let logger = Logger::builder()
        .custom_sink(console_sink(&verbose, LogLevel::Debug))
        .custom_sink(console_sink(&quiet, LogLevel::Error))
        .build()
        .expect("Failed to build logger");

    for level in LogLevel::ALL {
        logger.log(level, format!("{} event", level));
    }

    assert_eq!(verbose.lines().len(), 5);
    let quiet_lines = quiet.lines();
    assert_eq!(quiet_lines.len(), 2);
    assert!(quiet_lines[0].contains("[ERROR]"));
    assert!(quiet_lines[1].contains("[CRITICAL]"));
}

#[test]
fn test_keyword_filter_sink() {
    let audit = SharedBuffer::default();
    let logger = Logger::builder()
        .custom_sink(
            console_sink(&audit, LogLevel::Debug)
                .with_filter(|entry| entry.message.contains("payment")),
        )
        .build()
        .expect("Failed to build logger");

    logger.info("payment accepted");
    logger.info("healthcheck ok");
    logger.error("payment declined");

    let lines = audit.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.contains("payment")));
}

#[test]
fn test_failing_sink_does_not_affect_others() {
    let before = SharedBuffer::default();
    let after = SharedBuffer::default();
    let (errors, handler) = recording_handler();

    let logger = Logger::builder()
        .custom_sink(console_sink(&before, LogLevel::Info))
        .appender(AlwaysFails)
        .custom_sink(console_sink(&after, LogLevel::Info))
        .on_error(handler)
        .build()
        .expect("Failed to build logger");

    logger.warning("disk almost full");
    logger.warning("disk full");

    assert_eq!(before.lines().len(), 2);
    assert_eq!(after.lines().len(), 2);
    assert_eq!(logger.metrics().sink_failures(), 2);
    assert_eq!(logger.metrics().sink_writes(), 4);

    let errors = errors.lock();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("always-fails"));
    assert!(errors[0].contains("device gone"));
}

#[test]
fn test_async_drain_to_completion() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("async.log");

    let logger = Logger::builder()
        .sink(SinkConfig::file(&log_file).with_level(LogLevel::Debug))
        .async_mode(true)
        .build()
        .expect("Failed to build logger");
    logger.start().expect("Failed to start");

    for i in 0..1000 {
        logger.debug(format!("Message {}", i));
    }
    logger.shutdown();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1000);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("[DEBUG] Message {}", i)));
    }
    assert_eq!(logger.metrics().events_enqueued(), 1000);
    assert_eq!(logger.metrics().events_dispatched(), 1000);
}

#[test]
fn test_shutdown_is_idempotent() {
    let buffer = SharedBuffer::default();
    let logger = Logger::builder()
        .custom_sink(console_sink(&buffer, LogLevel::Info))
        .async_mode(true)
        .build()
        .expect("Failed to build logger");
    logger.start().expect("Failed to start");

    logger.info("once");
    logger.shutdown();
    logger.shutdown();
    drop(logger);

    assert_eq!(buffer.lines().len(), 1);
}

#[test]
fn test_emit_after_shutdown_is_reported_not_raised() {
    let buffer = SharedBuffer::default();
    let (errors, handler) = recording_handler();
    let logger = Logger::builder()
        .custom_sink(console_sink(&buffer, LogLevel::Info))
        .on_error(handler)
        .build()
        .expect("Failed to build logger");

    logger.shutdown();
    logger.info("after stop");

    assert!(buffer.lines().is_empty());
    assert_eq!(errors.lock().len(), 1);
    assert_eq!(logger.metrics().events_dropped(), 1);
}

#[test]
fn test_size_rotation_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    let logger = Logger::builder()
        .sink(
            SinkConfig::file(&log_file)
                .with_max_bytes(200)
                .with_backup_count(2),
        )
        .build()
        .expect("Failed to build logger");

    for i in 0..40 {
        logger.info(format!("rotation test line {}", i));
    }
    logger.shutdown();

    assert!(temp_dir.path().join("rotating.log.1").exists());
    assert!(temp_dir.path().join("rotating.log.2").exists());
    assert!(!temp_dir.path().join("rotating.log.3").exists());
    let active = fs::metadata(&log_file).expect("active file").len();
    assert!(active <= 200, "active file is {} bytes", active);

    let newest = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(newest.lines().last().unwrap_or("").ends_with("rotation test line 39"));
}

#[test]
fn test_rotation_failure_keeps_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("blocked.log");

    let blocker = temp_dir.path().join("blocked.log.1");
    fs::create_dir(&blocker).expect("create blocker");
    fs::write(blocker.join("occupied"), b"x").expect("fill blocker");

    let (errors, handler) = recording_handler();
    let logger = Logger::builder()
        .sink(
            SinkConfig::file(&log_file)
                .with_max_bytes(120)
                .with_backup_count(1),
        )
        .on_error(handler)
        .build()
        .expect("Failed to build logger");

    for i in 0..10 {
        logger.info(format!("line {}", i));
    }
    logger.shutdown();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 10);
    assert!(logger.metrics().rotation_failures() >= 1);
    assert!(errors.lock().iter().all(|e| e.contains("rotation")));
}

#[test]
fn test_schedule_rotation_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("hourly.log");

    let logger = Logger::builder()
        .sink(
            SinkConfig::file(&log_file)
                .with_schedule("H")
                .with_backup_count(5),
        )
        .build()
        .expect("Failed to build logger");

    let start = chrono::Local::now();
    for (hours, message) in [(0, "first"), (2, "second"), (4, "third")] {
        let at = start + chrono::Duration::hours(hours);
        logger.submit(LogEntry::at(LogLevel::Info, message, at));
    }
    logger.shutdown();

    let mut archives: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("Failed to list temp dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path != &log_file)
        .collect();
    archives.sort();
    assert_eq!(archives.len(), 2, "archives: {:?}", archives);

    let archived: Vec<String> = archives
        .iter()
        .map(|path| fs::read_to_string(path).expect("Failed to read archive"))
        .collect();
    assert!(archived[0].trim_end().ends_with("[INFO] first"));
    assert!(archived[1].trim_end().ends_with("[INFO] second"));

    let active = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(active.lines().count(), 1);
    assert!(active.trim_end().ends_with("[INFO] third"));
    assert_eq!(logger.metrics().rotation_failures(), 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_write_failure_does_not_affect_next_sink() {
    // Opens fine, every flush fails with ENOSPC
    let full_device = std::path::Path::new("/dev/full");
    if !full_device.exists() {
        return;
    }
    let console = SharedBuffer::default();
    let (errors, handler) = recording_handler();

    let logger = Logger::builder()
        .sink(SinkConfig::file(full_device))
        .custom_sink(console_sink(&console, LogLevel::Info))
        .on_error(handler)
        .build()
        .expect("Failed to build logger");

    logger.info("first");
    logger.error("second");

    let lines = console.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[INFO] first"));
    assert!(lines[1].ends_with("[ERROR] second"));
    assert_eq!(logger.metrics().sink_failures(), 2);
    assert_eq!(logger.metrics().sink_writes(), 2);

    let errors = errors.lock();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.contains("/dev/full")));
}

#[test]
fn test_ambiguous_rotation_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (errors, handler) = recording_handler();

    let _logger = Logger::builder()
        .sink(
            SinkConfig::file(temp_dir.path().join("both.log"))
                .with_max_bytes(1024)
                .with_schedule("midnight"),
        )
        .on_error(handler)
        .build()
        .expect("ambiguous rotation is not fatal");

    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("rotating by size"));
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection.log");

    let logger = Logger::builder()
        .sink(SinkConfig::file(&log_file))
        .build()
        .expect("Failed to build logger");

    logger.info("User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation");
    logger.shutdown();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\\n"));
}

#[test]
fn test_callback_sees_every_event() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let buffer = SharedBuffer::default();

    let logger = Logger::builder()
        .custom_sink(console_sink(&buffer, LogLevel::Critical))
        .callback(move |_entry: &LogEntry| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .async_mode(true)
        .build()
        .expect("Failed to build logger");
    logger.start().expect("Failed to start");

    logger.debug("a");
    logger.info("b");
    logger.critical("c");
    logger.shutdown();

    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert_eq!(buffer.lines().len(), 1);
}

#[test]
fn test_configuration_errors_are_fatal() {
    let mut missing_path = SinkConfig::file("x.log");
    missing_path.path = None;
    let err = Logger::builder().sink(missing_path).build().err();
    assert!(err.is_some_and(|e| e.is_config()));

    let err = Logger::builder()
        .sink(SinkConfig::console().with_timestamp_format("%Y-%"))
        .build()
        .err();
    assert!(err.is_some_and(|e| e.is_config()));

    let err = Logger::builder()
        .sink(SinkConfig::file("x.log").with_schedule("every tuesday"))
        .build()
        .err();
    assert!(err.is_some_and(|e| e.is_config()));

    assert!("xml".parse::<LogFormat>().is_err());
    assert!("syslog".parse::<SinkKind>().is_err());
}

#[test]
fn test_invalid_config_opens_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let first = temp_dir.path().join("first.log");

    let result = Logger::builder()
        .sink(SinkConfig::file(&first))
        .sink(SinkConfig::file(temp_dir.path().join("second.log")).with_max_bytes(0))
        .build();

    assert!(result.is_err());
    assert!(!first.exists());
}

#[test]
fn test_sinks_from_json_configuration() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("configured.log");
    let raw = format!(
        r#"[
            {{"kind": "file", "path": {path}, "level": "warning", "timestamp_format": "%H:%M:%S"}}
        ]"#,
        path = serde_json::to_string(&path).expect("path as JSON")
    );
    let sinks: Vec<SinkConfig> = serde_json::from_str(&raw).expect("valid sink list");

    let logger = Logger::builder()
        .sinks(sinks)
        .build()
        .expect("Failed to build logger");
    logger.info("dropped by threshold");
    logger.warning("kept");
    logger.shutdown();

    let content = fs::read_to_string(&path).expect("Failed to read log file");
    let line = content.lines().next().expect("one line");
    assert_eq!(content.lines().count(), 1);
    // "[HH:MM:SS] [WARNING] kept"
    assert_eq!(line.len(), "[00:00:00] [WARNING] kept".len());
    assert!(line.ends_with("] [WARNING] kept"));
}
