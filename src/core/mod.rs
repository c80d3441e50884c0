//! Core pipeline types and traits

pub mod async_writer;
pub mod dispatcher;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod output_format;
pub mod overflow_policy;
pub mod record_builder;
pub mod registry;
pub mod sink;
pub mod timestamp;
pub mod writer;

pub use async_writer::{AsyncWriter, AsyncWriterConfig, DEFAULT_QUEUE_CAPACITY};
pub use dispatcher::{global, Dispatcher, DispatcherBuilder};
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use log_record::{CallSite, LogRecord, SharedRecord};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use record_builder::RecordBuilder;
pub use registry::SinkRegistry;
pub use sink::{Sink, Threshold};
pub use timestamp::TimestampFormat;
pub use writer::{SyncWriter, Writer};
