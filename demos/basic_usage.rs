//! Basic logger usage example
//!
//! Demonstrates a console sink for debug output, a JSON file sink for INFO
//! and above, structured context, and an observer callback.
//!
//! Run with: cargo run --example basic_usage

use fastlog::prelude::*;
use fastlog::{critical, debug, error, info, warning};

fn main() -> Result<()> {
    println!("=== fastlog - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .sink(
            SinkConfig::console()
                .with_level(LogLevel::Debug)
                .with_format(LogFormat::Plain),
        )
        .sink(
            SinkConfig::file("logs/app.log")
                .with_level(LogLevel::Info)
                .with_format(LogFormat::Json)
                .with_max_bytes(10 * 1024 * 1024)
                .with_backup_count(3),
        )
        .callback(|entry: &LogEntry| {
            println!("   callback: {} {}", entry.level, entry.message);
        })
        .build()?;

    println!("1. Logging at different levels with context:");
    debug!(logger, "Debugging application state"; user = "developer", module = "testing");
    info!(logger, "Application started successfully"; user = "admin");
    warning!(logger, "Potential issue detected"; retry_count = 2, module = "network");
    error!(logger, "Error processing request"; user = "client", error_code = 404);
    critical!(logger, "System failure imminent!"; system = "database", recovery_needed = true);

    println!("\n2. Plain methods without context:");
    logger.info("Plain info message");
    logger.warning_with_context(
        "Disk usage high",
        LogContext::new().with_field("percent", 91.5),
    );

    logger.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/app.log' for the JSON output");

    Ok(())
}
