//! Named sink registry and the fan-out shared by every writer

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::Sink,
};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Cloneable handle to a dispatcher's sinks.
///
/// Clones share the same map, so a writer holding a handle sees sinks added
/// or replaced after it was created.
#[derive(Clone, Default)]
pub struct SinkRegistry {
    sinks: Arc<RwLock<BTreeMap<String, Arc<dyn Sink>>>>,
    metrics: Arc<LoggerMetrics>,
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    /// Insert under `sink.name()`, returning the sink it replaced.
    ///
    /// A sink with an empty name is ignored.
    pub fn insert(&self, sink: Arc<dyn Sink>) -> Option<Arc<dyn Sink>> {
        let name = sink.name().to_string();
        if name.is_empty() {
            return None;
        }
        self.sinks.write().insert(name, sink)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.sinks.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.sinks.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.sinks.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }

    /// Whether any registered sink would accept `level`.
    pub fn any_accepts(&self, level: LogLevel) -> bool {
        self.sinks.read().values().any(|sink| sink.accepts(level))
    }

    fn snapshot(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().values().cloned().collect()
    }

    /// Deliver one record to every sink whose threshold admits it.
    pub fn deliver(&self, record: &LogRecord) {
        let sinks = self.snapshot();
        if sinks.is_empty() {
            return;
        }
        self.deliver_to(&sinks, record);
    }

    /// Deliver records in order, against one snapshot of the registry.
    pub fn deliver_batch<'r, I>(&self, records: I)
    where
        I: IntoIterator<Item = &'r Arc<LogRecord>>,
    {
        let sinks = self.snapshot();
        if sinks.is_empty() {
            return;
        }
        for record in records {
            self.deliver_to(&sinks, record);
        }
    }

    /// Per-sink panic isolation: a failing sink never stops the others.
    fn deliver_to(&self, sinks: &[Arc<dyn Sink>], record: &LogRecord) {
        let mut has_error = false;

        for sink in sinks.iter().filter(|sink| sink.accepts(record.level())) {
            match catch_unwind(AssertUnwindSafe(|| sink.write(record))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                         Other sinks continue to function.",
                        sink.name(),
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_sink_error();
        }
        self.metrics.record_written();
    }

    /// Flush every sink, returning the first error.
    pub fn flush_all(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(panic_info) => {
                    let err = LoggerError::sink(
                        sink.name(),
                        format!("panicked during flush: {}", panic_message(panic_info.as_ref())),
                    );
                    eprintln!("[LOGGER CRITICAL] {}", err);
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("sinks", &self.names())
            .finish()
    }
}
