//! Background-thread writer
//!
//! Producers push finalized records into a mutex-protected FIFO and return.
//! One drain thread moves through three states:
//!
//! - WAIT: queue empty, no shutdown requested; parked on a condition variable.
//! - DRAIN: swaps the whole queue into a local batch under the lock, releases
//!   the lock and delivers the batch in order.
//! - SHUTDOWN: on the first wake-up after shutdown is requested, takes the
//!   final snapshot, marks the writer closed, delivers the snapshot and exits.
//!
//! Records accepted before the final snapshot are always delivered; records
//! arriving after it are dropped and counted.

use super::{
    error::{LoggerError, Result},
    log_record::SharedRecord,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    registry::SinkRegistry,
    writer::Writer,
};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// Default queue capacity for bounded overflow policies
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Configuration for an [`AsyncWriter`]
///
/// The default policy is [`OverflowPolicy::Unbounded`]: no record is ever
/// dropped unless a drop policy is chosen. `capacity` applies only to the
/// bounded policies.
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::{AsyncWriterConfig, OverflowPolicy};
///
/// let config = AsyncWriterConfig::new()
///     .capacity(1024)
///     .overflow_policy(OverflowPolicy::Block)
///     .thread_name("app-log");
/// assert_eq!(config.capacity, 1024);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncWriterConfig {
    /// Maximum queued records; ignored by [`OverflowPolicy::Unbounded`]
    pub capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub thread_name: String,
    #[serde(skip)]
    pub on_overflow: Option<OverflowCallback>,
}

impl AsyncWriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set a callback invoked with the running drop count when records are dropped
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.overflow_policy.is_bounded() && self.capacity == 0 {
            return Err(LoggerError::config(
                "AsyncWriter",
                format!("capacity must be non-zero with {} policy", self.overflow_policy),
            ));
        }
        Ok(())
    }
}

impl Default for AsyncWriterConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            thread_name: "log-writer".to_string(),
            on_overflow: None,
        }
    }
}

impl fmt::Debug for AsyncWriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncWriterConfig")
            .field("capacity", &self.capacity)
            .field("overflow_policy", &self.overflow_policy)
            .field("thread_name", &self.thread_name)
            .field("on_overflow", &self.on_overflow.is_some())
            .finish()
    }
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<SharedRecord>,
    /// Records ever accepted into the queue
    enqueued: u64,
    /// Records delivered or evicted
    retired: u64,
    shutdown: bool,
    /// The final snapshot was taken; new records are dropped
    closed: bool,
    /// The drain thread has returned
    exited: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    /// Signalled when a record arrives or shutdown is requested
    ready: Condvar,
    /// Signalled when the drain thread takes a batch
    space: Condvar,
    /// Signalled when a batch has been delivered
    progress: Condvar,
}

/// Queue plus a single background drain thread.
///
/// `write` never waits on sink I/O. Dropping the writer stops it, which
/// blocks until everything already queued has been delivered.
pub struct AsyncWriter {
    shared: Arc<Shared>,
    registry: SinkRegistry,
    capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    handle: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl AsyncWriter {
    /// Spawn the drain thread delivering into `registry`.
    pub fn start(registry: SinkRegistry, config: AsyncWriterConfig) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker_registry = registry.clone();

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || Self::run(worker_shared, worker_registry))
            .map_err(|e| {
                LoggerError::io_operation("spawning async writer", config.thread_name.clone(), e)
            })?;
        let worker_id = handle.thread().id();

        Ok(Self {
            shared,
            registry,
            capacity: config.capacity,
            overflow_policy: config.overflow_policy,
            on_overflow: config.on_overflow,
            handle: Mutex::new(Some(handle)),
            worker_id,
        })
    }

    fn run(shared: Arc<Shared>, registry: SinkRegistry) {
        loop {
            let (batch, last) = {
                let mut state = shared.state.lock();
                while state.queue.is_empty() && !state.shutdown {
                    shared.ready.wait(&mut state);
                }
                // Once shutdown is observed this is the final snapshot.
                state.closed = state.shutdown;
                (std::mem::take(&mut state.queue), state.closed)
            };
            shared.space.notify_all();

            if !batch.is_empty() {
                registry.deliver_batch(&batch);
                if let Err(e) = registry.flush_all() {
                    eprintln!("[LOGGER ERROR] Sink flush failed: {}", e);
                }
            }

            {
                let mut state = shared.state.lock();
                state.retired += batch.len() as u64;
                state.exited = last;
            }
            shared.progress.notify_all();

            if last {
                break;
            }
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.registry.metrics()
    }

    /// Records queued and not yet taken by the drain thread.
    pub fn queued(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().closed
    }

    fn on_drain_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Count a dropped record and alert on the first drop and every 1000th after.
    fn alert_and_drop(&self) {
        let dropped_count = self.metrics().record_dropped();
        let should_alert = dropped_count == 0 || (dropped_count + 1) % 1000 == 0;

        if should_alert {
            eprintln!(
                "[LOGGER WARNING] Async writer dropped {} records ({} policy, capacity {}).",
                dropped_count + 1,
                self.overflow_policy,
                self.capacity
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count + 1);
            }
        }
    }
}

impl Writer for AsyncWriter {
    fn write(&self, record: SharedRecord) {
        let mut state = self.shared.state.lock();
        let mut evicted = false;

        if !state.closed
            && self.overflow_policy.is_bounded()
            && state.queue.len() >= self.capacity
        {
            self.metrics().record_queue_full();
            match self.overflow_policy {
                OverflowPolicy::DropOldest => {
                    state.queue.pop_front();
                    state.retired += 1;
                    evicted = true;
                }
                OverflowPolicy::DropNewest => {
                    drop(state);
                    self.alert_and_drop();
                    return;
                }
                // The drain thread must never wait on itself.
                OverflowPolicy::Block if !self.on_drain_thread() => {
                    self.metrics().record_block();
                    while state.queue.len() >= self.capacity && !state.closed {
                        self.shared.space.wait(&mut state);
                    }
                }
                OverflowPolicy::Block | OverflowPolicy::Unbounded => {}
            }
        }

        if state.closed {
            drop(state);
            self.alert_and_drop();
            return;
        }

        state.queue.push_back(record);
        state.enqueued += 1;
        drop(state);
        self.shared.ready.notify_one();

        if evicted {
            self.alert_and_drop();
        }
    }

    fn flush(&self) -> Result<()> {
        if !self.on_drain_thread() {
            let mut state = self.shared.state.lock();
            let target = state.enqueued;
            while state.retired < target && !state.exited {
                self.shared.progress.wait(&mut state);
            }
            // Only a drain thread that died mid-batch leaves records behind.
            if state.retired < target {
                return Err(LoggerError::WriterStopped);
            }
        }
        self.registry.flush_all()
    }

    /// Request shutdown and join the drain thread after its final drain.
    fn stop(&self) {
        self.shared.state.lock().shutdown = true;
        self.shared.ready.notify_one();

        if self.on_drain_thread() {
            return;
        }

        if let Some(handle) = self.handle.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!(
                    "[LOGGER ERROR] Async writer thread panicked during shutdown: {:?}",
                    e
                );
            }
            // Also covers a drain thread that died without closing.
            {
                let mut state = self.shared.state.lock();
                state.closed = true;
                state.exited = true;
            }
            self.shared.space.notify_all();
            self.shared.progress.notify_all();

            if let Err(e) = self.registry.flush_all() {
                eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            }
        }
    }

    fn name(&self) -> &str {
        "async"
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        self.stop();

        let dropped = self.metrics().dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Async writer shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics().drop_rate()
            );
        }
    }
}

impl fmt::Debug for AsyncWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncWriter")
            .field("capacity", &self.capacity)
            .field("overflow_policy", &self.overflow_policy)
            .field("queued", &self.queued())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LogRecord, Sink};
    use crate::sinks::MemorySink;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn record(text: impl fmt::Display) -> SharedRecord {
        let mut record = LogRecord::new(LogLevel::Info);
        record.append(text).unwrap();
        record.finalize();
        Arc::new(record)
    }

    fn registry_with_memory() -> (SinkRegistry, Arc<MemorySink>) {
        let registry = SinkRegistry::new();
        let mem = Arc::new(MemorySink::new("mem", LogLevel::Trace));
        registry.insert(mem.clone());
        (registry, mem)
    }

    /// Holds the drain thread inside `write` until released.
    struct Gate {
        open: Mutex<bool>,
        opened: Condvar,
        inner: MemorySink,
    }

    impl Gate {
        fn new() -> Self {
            Self {
                open: Mutex::new(false),
                opened: Condvar::new(),
                inner: MemorySink::new("gate", LogLevel::Trace),
            }
        }

        fn release(&self) {
            *self.open.lock() = true;
            self.opened.notify_all();
        }
    }

    impl Sink for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        fn threshold(&self) -> LogLevel {
            LogLevel::Trace
        }

        fn write(&self, record: &LogRecord) -> Result<()> {
            let mut open = self.open.lock();
            while !*open {
                self.opened.wait(&mut open);
            }
            self.inner.write(record)
        }
    }

    #[test]
    fn test_delivers_in_enqueue_order() {
        let (registry, mem) = registry_with_memory();
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();

        for i in 0..100 {
            writer.write(record(i));
        }
        writer.stop();

        let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(mem.lines(), expected);
    }

    #[test]
    fn test_stop_drains_everything_queued() {
        let registry = SinkRegistry::new();
        let gate = Arc::new(Gate::new());
        registry.insert(gate.clone());
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();

        for i in 0..50 {
            writer.write(record(i));
        }
        // Nothing has been delivered yet: the drain thread is stuck on the gate.
        assert!(gate.inner.lines().is_empty());

        let gate_for_release = Arc::clone(&gate);
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            gate_for_release.release();
        });
        writer.stop();
        releaser.join().unwrap();

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(gate.inner.lines(), expected);
    }

    #[test]
    fn test_write_after_stop_is_dropped() {
        let (registry, mem) = registry_with_memory();
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();

        writer.write(record("before"));
        writer.stop();
        writer.write(record("after"));

        assert!(writer.is_stopped());
        assert_eq!(mem.lines(), vec!["before".to_string()]);
        assert_eq!(writer.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (registry, _mem) = registry_with_memory();
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();
        writer.stop();
        writer.stop();
        assert!(writer.is_stopped());
    }

    #[test]
    fn test_flush_waits_for_delivery() {
        let (registry, mem) = registry_with_memory();
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();

        for i in 0..20 {
            writer.write(record(i));
        }
        writer.flush().unwrap();

        assert_eq!(mem.lines().len(), 20);
    }

    #[test]
    fn test_drop_oldest_keeps_newest_in_order() {
        let registry = SinkRegistry::new();
        let gate = Arc::new(Gate::new());
        registry.insert(gate.clone());
        let config = AsyncWriterConfig::new()
            .capacity(4)
            .overflow_policy(OverflowPolicy::DropOldest);
        let writer = AsyncWriter::start(registry, config).unwrap();

        // Park the drain thread on the first record.
        writer.write(record("first"));
        while writer.queued() > 0 {
            thread::yield_now();
        }
        for i in 0..10 {
            writer.write(record(i));
        }
        gate.release();
        writer.stop();

        assert_eq!(gate.inner.lines(), vec!["first", "6", "7", "8", "9"]);
        assert_eq!(writer.metrics().dropped_count(), 6);
    }

    #[test]
    fn test_drop_newest_keeps_oldest_in_order() {
        let registry = SinkRegistry::new();
        let gate = Arc::new(Gate::new());
        registry.insert(gate.clone());
        let dropped = Arc::new(AtomicU64::new(0));
        let dropped_in_callback = Arc::clone(&dropped);
        let config = AsyncWriterConfig::new()
            .capacity(4)
            .overflow_policy(OverflowPolicy::DropNewest)
            .on_overflow(Arc::new(move |count| {
                dropped_in_callback.store(count, Ordering::Relaxed);
            }));
        let writer = AsyncWriter::start(registry, config).unwrap();

        writer.write(record("first"));
        while writer.queued() > 0 {
            thread::yield_now();
        }
        for i in 0..10 {
            writer.write(record(i));
        }
        gate.release();
        writer.stop();

        assert_eq!(gate.inner.lines(), vec!["first", "0", "1", "2", "3"]);
        assert_eq!(writer.metrics().dropped_count(), 6);
        // The first drop always alerts.
        assert!(dropped.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn test_block_policy_loses_nothing() {
        let (registry, mem) = registry_with_memory();
        let config = AsyncWriterConfig::new()
            .capacity(2)
            .overflow_policy(OverflowPolicy::Block);
        let writer = AsyncWriter::start(registry, config).unwrap();

        for i in 0..200 {
            writer.write(record(i));
        }
        writer.stop();

        assert_eq!(mem.lines().len(), 200);
        assert_eq!(writer.metrics().dropped_count(), 0);
    }

    #[test]
    fn test_default_config_never_drops() {
        let registry = SinkRegistry::new();
        let gate = Arc::new(Gate::new());
        registry.insert(gate.clone());
        let writer = AsyncWriter::start(registry, AsyncWriterConfig::new()).unwrap();

        let total = DEFAULT_QUEUE_CAPACITY + 100;
        for i in 0..total {
            writer.write(record(i));
        }
        gate.release();
        writer.stop();

        assert_eq!(gate.inner.len(), total);
        assert_eq!(writer.metrics().dropped_count(), 0);
        assert_eq!(writer.metrics().queue_full_events(), 0);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = AsyncWriterConfig::new()
            .capacity(0)
            .overflow_policy(OverflowPolicy::DropOldest);
        let result = AsyncWriter::start(SinkRegistry::new(), config);
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        let unbounded = AsyncWriterConfig::new()
            .capacity(0)
            .overflow_policy(OverflowPolicy::Unbounded);
        assert!(AsyncWriter::start(SinkRegistry::new(), unbounded).is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config: AsyncWriterConfig =
            serde_json::from_str(r#"{"capacity":16,"overflow_policy":"Block"}"#).unwrap();
        assert_eq!(config.capacity, 16);
        assert_eq!(config.overflow_policy, OverflowPolicy::Block);
        assert_eq!(config.thread_name, "log-writer");
    }
}
