//! Custom sink example
//!
//! Demonstrates an application-defined appender (a batching collector that
//! stands in for an HTTP log shipper) and a keyword-filtered console sink.
//!
//! Run with: cargo run --example custom_sink

use fastlog::prelude::*;

/// Buffers JSON lines and "ships" them in batches
struct BatchShipper {
    batch: Vec<String>,
    batch_size: usize,
    shipped: usize,
}

impl BatchShipper {
    fn new(batch_size: usize) -> Self {
        Self {
            batch: Vec::with_capacity(batch_size),
            batch_size,
            shipped: 0,
        }
    }

    fn ship(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        println!("   [shipper] POST {} records", self.batch.len());
        self.shipped += self.batch.len();
        self.batch.clear();
    }
}

impl Appender for BatchShipper {
    fn write(&mut self, _entry: &LogEntry, rendered: &str) -> Result<()> {
        self.batch.push(rendered.to_string());
        if self.batch.len() >= self.batch_size {
            self.ship();
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Sink::emit flushes after every line; only ship full batches then
        if self.batch.len() >= self.batch_size {
            self.ship();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "batch-shipper"
    }
}

impl Drop for BatchShipper {
    fn drop(&mut self) {
        self.ship();
        println!("   [shipper] {} records shipped in total", self.shipped);
    }
}

fn main() -> Result<()> {
    println!("=== fastlog - Custom Sink Example ===\n");

    let logger = Logger::builder()
        .custom_sink(
            Sink::new(ConsoleAppender::stdout().with_colors(true))
                .with_level(LogLevel::Debug)
                .with_filter(|entry| entry.message.contains("payment")),
        )
        .custom_sink(
            Sink::new(BatchShipper::new(4))
                .with_format(LogFormat::Json)
                .with_timestamp_format(TimestampFormat::Rfc3339),
        )
        .build()?;

    for i in 0..10 {
        logger.info_with_context(
            if i % 3 == 0 { "payment accepted" } else { "healthcheck ok" },
            LogContext::new().with_field("seq", i),
        );
    }

    drop(logger);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
