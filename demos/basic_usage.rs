//! Basic dispatcher usage example
//!
//! Demonstrates synchronous delivery to a console sink, per-sink thresholds and
//! both macro forms.
//!
//! Run with: cargo run --example basic_usage

use rust_log_dispatcher::prelude::*;
use rust_log_dispatcher::{debug, error, info, trace, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Dispatcher - Basic Usage Example ===\n");

    // Records are delivered on the calling thread until a writer is installed
    let dispatcher = Dispatcher::new("basic");
    dispatcher.add_sink(ConsoleSink::new("console", LogLevel::Trace).with_colors(true));

    println!("1. Logging at different levels:");
    trace!(dispatcher, "This is a trace message");
    debug!(dispatcher, "This is a debug message");
    info!(dispatcher, "This is an info message");
    warn!(dispatcher, "This is a warning message");
    error!(dispatcher, "This is an error message");

    println!("\n2. Stream form:");
    let _ = debug!(dispatcher) << 1 << "+" << 2 << '=' << 3;
    let _ = info!(dispatcher).flag("startup") << "listening on port " << 8080;

    println!("\n3. Raising the console threshold to WARN:");
    dispatcher.add_sink(ConsoleSink::new("console", LogLevel::Warn));
    info!(dispatcher, "Info message (hidden)");
    warn!(dispatcher, "Warning message (visible)");

    println!("\n4. The process-wide dispatcher:");
    global().add_sink(ConsoleSink::new("console", LogLevel::Info));
    info!(global(), "sinks on the global dispatcher: {:?}", global().sink_names());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
