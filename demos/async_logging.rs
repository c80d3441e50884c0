//! Async logging example
//!
//! Demonstrates background-thread delivery with several producer threads.
//!
//! Run with: cargo run --example async_logging

use rust_log_dispatcher::prelude::*;
use rust_log_dispatcher::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Dispatcher - Async Logging Example ===\n");

    let overflows = Arc::new(AtomicU64::new(0));
    let overflow_counter = Arc::clone(&overflows);

    let config = AsyncWriterConfig::new()
        .capacity(1000)
        .overflow_policy(OverflowPolicy::DropOldest)
        .on_overflow(Arc::new(move |dropped| {
            overflow_counter.store(dropped, Ordering::Relaxed);
        }));

    let dispatcher = Arc::new(
        Dispatcher::builder()
            .name("async")
            .sink(ConsoleSink::new("console", LogLevel::Info))
            .async_writer(config)
            .build()?,
    );

    println!("1. Producers never wait on sink I/O:");
    for i in 0..100 {
        info!(dispatcher, "Message #{}", i);
    }
    println!("   Queued 100 messages");

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|producer| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for i in 0..20 {
                    let _ = info!(dispatcher) << "producer " << producer << " message " << i;
                    thread::sleep(Duration::from_millis(5));
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            warn!(dispatcher, "a producer thread panicked");
        }
    }

    // Blocks until everything queued so far has reached the sinks
    dispatcher.flush()?;
    println!("   5 threads logged 20 messages each");

    // Final drain; later records are dropped and counted
    dispatcher.shutdown();
    info!(dispatcher, "this one is dropped");

    let metrics = dispatcher.metrics();
    println!("\n3. Metrics:");
    println!("   written:  {}", metrics.total_written());
    println!("   dropped:  {}", metrics.dropped_count());
    println!("   overflow: {}", overflows.load(Ordering::Relaxed));

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
