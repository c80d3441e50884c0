//! Delivery strategies between a dispatcher and its sinks

use super::{error::Result, log_record::SharedRecord, registry::SinkRegistry};

/// How finalized records travel from [`Dispatcher::write`](crate::Dispatcher::write)
/// to the sinks.
pub trait Writer: Send + Sync {
    /// Hand over one finalized record. Never fails and never surfaces sink errors.
    fn write(&self, record: SharedRecord);

    /// Block until previously written records have reached the sinks, then flush them.
    fn flush(&self) -> Result<()>;

    /// Stop accepting records once everything already accepted is delivered.
    fn stop(&self) {}

    fn name(&self) -> &str;
}

/// Fan-out on the calling thread.
///
/// Delivery is in-order with zero added latency; the caller pays for sink I/O.
#[derive(Debug, Clone)]
pub struct SyncWriter {
    registry: SinkRegistry,
}

impl SyncWriter {
    pub fn new(registry: SinkRegistry) -> Self {
        Self { registry }
    }
}

impl Writer for SyncWriter {
    fn write(&self, record: SharedRecord) {
        self.registry.deliver(&record);
    }

    fn flush(&self) -> Result<()> {
        self.registry.flush_all()
    }

    fn name(&self) -> &str {
        "sync"
    }
}
