//! Sink registry owner and record router

use super::{
    async_writer::{AsyncWriter, AsyncWriterConfig},
    error::Result,
    log_level::LogLevel,
    log_record::{CallSite, LogRecord, SharedRecord},
    metrics::LoggerMetrics,
    record_builder::RecordBuilder,
    registry::SinkRegistry,
    sink::Sink,
    writer::{SyncWriter, Writer},
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Dispatcher> = OnceLock::new();

/// The process-wide dispatcher, created on first use.
///
/// It starts with no sinks and no writer and is never torn down. Call
/// [`Dispatcher::shutdown`] before exit when an [`AsyncWriter`] is installed,
/// otherwise records still queued at exit are lost.
pub fn global() -> &'static Dispatcher {
    GLOBAL.get_or_init(|| Dispatcher::new("global"))
}

/// Routes finalized records to named sinks, directly or through a [`Writer`].
pub struct Dispatcher {
    name: String,
    registry: SinkRegistry,
    writer: RwLock<Option<Arc<dyn Writer>>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: SinkRegistry::new(),
            writer: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the sink map, for constructing writers.
    pub fn registry(&self) -> SinkRegistry {
        self.registry.clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.registry.metrics()
    }

    /// Register `sink` under its name, replacing any sink of the same name.
    ///
    /// Returns the replaced sink. Sinks with an empty name are ignored.
    pub fn add_sink(&self, sink: impl Sink + 'static) -> Option<Arc<dyn Sink>> {
        self.add_shared_sink(Arc::new(sink))
    }

    pub fn add_shared_sink(&self, sink: Arc<dyn Sink>) -> Option<Arc<dyn Sink>> {
        self.registry.insert(sink)
    }

    pub fn remove_sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.registry.remove(name)
    }

    pub fn get_sink(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.registry.get(name)
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Install `writer`, returning the one it replaces.
    ///
    /// Dropping the returned writer stops it if it was the last handle.
    pub fn set_writer(&self, writer: Arc<dyn Writer>) -> Option<Arc<dyn Writer>> {
        self.writer.write().replace(writer)
    }

    /// Go back to direct fan-out on the caller's thread.
    pub fn clear_writer(&self) -> Option<Arc<dyn Writer>> {
        self.writer.write().take()
    }

    pub fn writer(&self) -> Option<Arc<dyn Writer>> {
        self.writer.read().clone()
    }

    /// Install a [`SyncWriter`] over this dispatcher's sinks.
    pub fn use_sync_writer(&self) -> Option<Arc<dyn Writer>> {
        self.set_writer(Arc::new(SyncWriter::new(self.registry())))
    }

    /// Start and install an [`AsyncWriter`] over this dispatcher's sinks.
    pub fn use_async_writer(&self, config: AsyncWriterConfig) -> Result<Option<Arc<dyn Writer>>> {
        let writer = AsyncWriter::start(self.registry(), config)?;
        Ok(self.set_writer(Arc::new(writer)))
    }

    /// Whether a record at `level` would reach at least one sink right now.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.registry.any_accepts(level)
    }

    /// Start capturing a record at `site`; it is submitted when the builder drops.
    pub fn capture(&self, level: LogLevel, site: CallSite) -> RecordBuilder<'_> {
        RecordBuilder::new(self, level, site)
    }

    /// Finalize `record` and route it.
    ///
    /// With no writer and no sinks this is a silent no-op.
    pub fn write(&self, mut record: LogRecord) {
        record.finalize();
        self.write_shared(Arc::new(record));
    }

    /// Route an already finalized record.
    pub fn write_shared(&self, record: SharedRecord) {
        // Clone out so a blocking writer never holds the lock.
        let writer = self.writer.read().clone();
        match writer {
            Some(writer) => writer.write(record),
            None => self.registry.deliver(&record),
        }
    }

    /// Wait for the installed writer to deliver what it holds, then flush every sink.
    pub fn flush(&self) -> Result<()> {
        match self.writer() {
            Some(writer) => writer.flush(),
            None => self.registry.flush_all(),
        }
    }

    /// Stop the installed writer after its final drain.
    ///
    /// The writer stays installed, so later records are dropped and counted.
    pub fn shutdown(&self) {
        if let Some(writer) = self.writer() {
            writer.stop();
        }
        if let Err(e) = self.registry.flush_all() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }

    /// Create a builder for Dispatcher
    ///
    /// # Example
    /// ```
    /// use rust_log_dispatcher::prelude::*;
    ///
    /// let dispatcher = Dispatcher::builder()
    ///     .name("app")
    ///     .sink(MemorySink::new("mem", LogLevel::Debug))
    ///     .async_writer(AsyncWriterConfig::new().capacity(1000))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(dispatcher.sink_names(), vec!["mem".to_string()]);
    /// ```
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("sinks", &self.registry.names())
            .field("writer", &self.writer.read().as_ref().map(|w| w.name().to_string()))
            .finish()
    }
}

enum WriterChoice {
    Direct,
    Sync,
    Async(AsyncWriterConfig),
}

/// Builder for constructing a Dispatcher with a fluent API
pub struct DispatcherBuilder {
    name: String,
    sinks: Vec<Arc<dyn Sink>>,
    writer: WriterChoice,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            name: "default".to_string(),
            sinks: Vec::new(),
            writer: WriterChoice::Direct,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a sink; a later sink with the same name replaces an earlier one
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sync_writer(mut self) -> Self {
        self.writer = WriterChoice::Sync;
        self
    }

    /// Deliver through a background thread
    ///
    /// If not called, records are delivered on the caller's thread.
    #[must_use = "builder methods return a new value"]
    pub fn async_writer(mut self, config: AsyncWriterConfig) -> Self {
        self.writer = WriterChoice::Async(config);
        self
    }

    /// Build the Dispatcher, spawning the drain thread if async delivery was requested
    pub fn build(self) -> Result<Dispatcher> {
        let dispatcher = Dispatcher::new(self.name);
        for sink in self.sinks {
            dispatcher.add_shared_sink(sink);
        }
        match self.writer {
            WriterChoice::Direct => {}
            WriterChoice::Sync => {
                dispatcher.use_sync_writer();
            }
            WriterChoice::Async(config) => {
                dispatcher.use_async_writer(config)?;
            }
        }
        Ok(dispatcher)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    fn record(level: LogLevel, text: &str) -> LogRecord {
        let mut record = LogRecord::new(level);
        record.append(text).unwrap();
        record
    }

    #[test]
    fn test_empty_dispatcher_write_is_noop() {
        let dispatcher = Dispatcher::new("empty");
        for level in LogLevel::ALL {
            dispatcher.write(record(level, "nowhere"));
        }
        assert!(dispatcher.flush().is_ok());
        assert_eq!(dispatcher.metrics().total_written(), 0);
    }

    #[test]
    fn test_filter_across_all_levels() {
        for threshold in LogLevel::ALL {
            let dispatcher = Dispatcher::new("filter");
            let mem = Arc::new(MemorySink::new("mem", threshold));
            dispatcher.add_shared_sink(mem.clone());

            for level in LogLevel::ALL {
                dispatcher.write(record(level, level.to_str()));
            }

            let expected: Vec<String> = LogLevel::ALL
                .iter()
                .filter(|level| **level >= threshold)
                .map(|level| level.to_str().to_string())
                .collect();
            assert_eq!(mem.lines(), expected, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_get_and_remove_sink() {
        let dispatcher = Dispatcher::new("registry");
        dispatcher.add_sink(MemorySink::new("mem", LogLevel::Info));

        assert!(dispatcher.get_sink("mem").is_some());
        assert!(dispatcher.get_sink("other").is_none());
        assert!(dispatcher.remove_sink("mem").is_some());
        assert!(dispatcher.remove_sink("mem").is_none());
        assert!(dispatcher.sink_names().is_empty());
    }

    #[test]
    fn test_replacing_sink_affects_only_later_writes() {
        let dispatcher = Dispatcher::new("replace");
        let first = Arc::new(MemorySink::new("mem", LogLevel::Trace));
        dispatcher.add_shared_sink(first.clone());
        dispatcher.write(record(LogLevel::Info, "one"));

        let second = Arc::new(MemorySink::new("mem", LogLevel::Error));
        let replaced = dispatcher.add_shared_sink(second.clone());
        dispatcher.write(record(LogLevel::Info, "two"));
        dispatcher.write(record(LogLevel::Error, "three"));

        assert!(replaced.is_some());
        assert_eq!(first.lines(), vec!["one".to_string()]);
        assert_eq!(second.lines(), vec!["three".to_string()]);
    }

    #[test]
    fn test_set_writer_replaces_previous() {
        let dispatcher = Dispatcher::new("writers");
        assert!(dispatcher.use_sync_writer().is_none());
        let previous = dispatcher
            .use_async_writer(AsyncWriterConfig::new())
            .unwrap();

        assert_eq!(previous.map(|w| w.name().to_string()), Some("sync".to_string()));
        assert_eq!(dispatcher.writer().map(|w| w.name().to_string()), Some("async".to_string()));
        assert!(dispatcher.clear_writer().is_some());
        assert!(dispatcher.writer().is_none());
    }

    #[test]
    fn test_async_dispatch_then_shutdown() {
        let mem = Arc::new(MemorySink::new("mem", LogLevel::Trace));
        let dispatcher = Dispatcher::builder()
            .shared_sink(mem.clone())
            .async_writer(AsyncWriterConfig::new())
            .build()
            .unwrap();

        for i in 0..10 {
            dispatcher.write(record(LogLevel::Info, &i.to_string()));
        }
        dispatcher.shutdown();
        dispatcher.write(record(LogLevel::Info, "late"));

        assert_eq!(mem.lines().len(), 10);
        assert_eq!(dispatcher.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_is_enabled() {
        let dispatcher = Dispatcher::new("enabled");
        assert!(!dispatcher.is_enabled(LogLevel::Error));
        dispatcher.add_sink(MemorySink::new("mem", LogLevel::Warn));
        assert!(!dispatcher.is_enabled(LogLevel::Info));
        assert!(dispatcher.is_enabled(LogLevel::Warn));
    }

    #[test]
    fn test_global_is_constructed_once() {
        let addresses: Vec<usize> = (0..8)
            .map(|_| std::thread::spawn(|| global() as *const Dispatcher as usize))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(addresses.iter().all(|addr| *addr == addresses[0]));
        assert_eq!(global().name(), "global");
    }
}
