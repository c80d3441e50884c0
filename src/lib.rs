//! # Rust Log Dispatcher
//!
//! An in-process, multi-sink logging pipeline. Call sites capture structured
//! records, a [`Dispatcher`] filters them per sink, and delivery happens either
//! on the caller's thread or on a background drain thread.
//!
//! ## Features
//!
//! - **Scoped capture**: a [`RecordBuilder`] submits exactly once when it leaves scope
//! - **Named sinks**: console, file and in-memory sinks, each with its own threshold
//! - **Non-blocking delivery**: [`AsyncWriter`] decouples producers from sink I/O
//! - **Never fails the caller**: sink errors and panics are contained and counted
//!
//! ## Example
//!
//! ```
//! use rust_log_dispatcher::prelude::*;
//! use rust_log_dispatcher::{info, warn};
//!
//! let dispatcher = Dispatcher::builder()
//!     .sink(ConsoleSink::new("console", LogLevel::Info))
//!     .async_writer(AsyncWriterConfig::new())
//!     .build()
//!     .unwrap();
//!
//! info!(dispatcher, "listening on port {}", 8080);
//! let _ = warn!(dispatcher) << "retry " << 3 << " of " << 5;
//!
//! dispatcher.shutdown();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        global, AsyncWriter, AsyncWriterConfig, CallSite, Dispatcher, DispatcherBuilder, LogLevel,
        LogRecord, LoggerError, LoggerMetrics, OutputFormat, OverflowCallback, OverflowPolicy,
        RecordBuilder, Result, SharedRecord, Sink, SinkRegistry, SyncWriter, Threshold,
        TimestampFormat, Writer,
    };
    #[cfg(feature = "file")]
    pub use crate::sinks::FileSink;
    pub use crate::sinks::{ConsoleSink, MemorySink};
}

pub use crate::core::{
    global, AsyncWriter, AsyncWriterConfig, CallSite, Dispatcher, DispatcherBuilder, LogLevel,
    LogRecord, LoggerError, LoggerMetrics, OutputFormat, OverflowCallback, OverflowPolicy,
    RecordBuilder, Result, SharedRecord, Sink, SinkRegistry, SyncWriter, Threshold,
    TimestampFormat, Writer, DEFAULT_QUEUE_CAPACITY,
};
#[cfg(feature = "file")]
pub use sinks::FileSink;
pub use sinks::{ConsoleSink, MemorySink};
