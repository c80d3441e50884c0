//! File logging example
//!
//! Demonstrates logging to console and file sinks at the same time.
//!
//! Run with: cargo run --example file_logging

use rust_log_dispatcher::prelude::*;
use rust_log_dispatcher::{debug, error, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Dispatcher - File Logging Example ===\n");

    let dispatcher = Dispatcher::builder()
        .name("files")
        .sink(ConsoleSink::new("console", LogLevel::Info))
        .sink(FileSink::new("file", "application.log", LogLevel::Debug)?.with_timestamp_format(TimestampFormat::Local))
        .sink(FileSink::new("json", "application.jsonl", LogLevel::Warn)?.with_output_format(OutputFormat::Json))
        .async_writer(AsyncWriterConfig::new())
        .build()?;

    println!("1. Logging to console and files:");
    info!(dispatcher, "Application started");
    debug!(dispatcher, "Loading configuration...");
    info!(dispatcher, "Configuration loaded successfully");
    warn!(dispatcher, "Using default settings for some options");
    error!(dispatcher, "Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        let _ = info!(dispatcher).flag("work") << "Processing item " << i << "/5";
        if i == 3 {
            warn!(dispatcher, "Item {} took longer than expected", i);
        }
    }

    info!(dispatcher, "All operations completed");

    dispatcher.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' and 'application.jsonl' for the file output");

    Ok(())
}
