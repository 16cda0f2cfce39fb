//! Async logging example
//!
//! Demonstrates the drain worker with several producer threads.
//!
//! Run with: cargo run --example async_logging

use fastlog::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== fastlog - Async Logging Example ===\n");

    let logger = Arc::new(
        Logger::builder()
            .sink(SinkConfig::console())
            .sink(SinkConfig::file("logs/async.log").with_format(LogFormat::Json))
            .async_mode(true)
            .build()?,
    );
    logger.start()?;

    println!("1. Enqueueing from the main thread:");
    for i in 0..100 {
        logger.info(format!("Message #{}", i));
    }
    println!("   Enqueued 100 messages");

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    fastlog::info!(logger, "worker message {}", i; thread = thread_id);
                    thread::sleep(Duration::from_millis(10));
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("a producer thread panicked");
        }
    }
    println!("   5 threads logged 20 messages each");

    // Blocks until every queued event has been written
    logger.shutdown();

    let metrics = logger.metrics();
    println!(
        "\n   enqueued={} dispatched={} sink_failures={}",
        metrics.events_enqueued(),
        metrics.events_dispatched(),
        metrics.sink_failures()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/async.log' for file output");

    Ok(())
}
