//! In-memory sink for tests and embedding

use crate::core::{LogLevel, LogRecord, Result, Sink, Threshold};
use parking_lot::Mutex;

/// Keeps a copy of every accepted record.
///
/// [`lines`](Self::lines) renders them without location unless
/// [`with_location`](Self::with_location) is set.
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::prelude::*;
/// use std::sync::Arc;
///
/// let mem = Arc::new(MemorySink::new("mem", LogLevel::Info));
/// let dispatcher = Dispatcher::new("doc");
/// dispatcher.add_shared_sink(mem.clone());
///
/// dispatcher.capture(LogLevel::Warn, CallSite::unknown()).append("disk at 91%").submit();
/// assert_eq!(mem.lines(), vec!["disk at 91%".to_string()]);
/// ```
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    threshold: Threshold,
    include_location: bool,
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>, threshold: LogLevel) -> Self {
        Self {
            name: name.into(),
            threshold: Threshold::new(threshold),
            include_location: false,
            records: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_location(mut self, include_location: bool) -> Self {
        self.include_location = include_location;
        self
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.set(level);
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|record| record.render(self.include_location))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> LogLevel {
        self.threshold.get()
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
