//! File logging example
//!
//! Demonstrates size-based and schedule-based rotation side by side.
//!
//! Run with: cargo run --example file_logging

use fastlog::prelude::*;

fn main() -> Result<()> {
    println!("=== fastlog - File Logging Example ===\n");

    let logger = Logger::builder()
        .sink(SinkConfig::console())
        // logs/size.log, logs/size.log.1 .. logs/size.log.3
        .sink(
            SinkConfig::file("logs/size.log")
                .with_max_bytes(4 * 1024)
                .with_backup_count(3),
        )
        // logs/daily.log, logs/daily.log.<date> (newest 7 kept)
        .sink(
            SinkConfig::file("logs/daily.log")
                .with_schedule("midnight")
                .with_backup_count(7)
                .with_timestamp_format("%Y-%m-%dT%H:%M:%S%.3f"),
        )
        .build()?;

    println!("1. Logging to console and two files:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warning("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Filling the size-rotated file:");
    for i in 1..=200 {
        logger.info_with_context(
            format!("Processing item {}/200", i),
            LogContext::new().with_field("batch", i / 50),
        );
    }

    logger.flush()?;
    logger.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/size.log*' and 'logs/daily.log' for the output");

    Ok(())
}
