//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};
use std::sync::atomic::{AtomicU8, Ordering};

/// A named destination that renders accepted records.
///
/// `write` may be called from whichever thread delivers records: the caller's
/// thread under synchronous dispatch, the drain thread under an
/// [`AsyncWriter`](crate::AsyncWriter), or several producer threads at once.
/// Implementations synchronize their own destination.
pub trait Sink: Send + Sync {
    /// Registry key. Must be non-empty.
    fn name(&self) -> &str;

    fn threshold(&self) -> LogLevel;

    /// Pure level filter, checked before `write`.
    fn accepts(&self, level: LogLevel) -> bool {
        level >= self.threshold()
    }

    fn write(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// A minimum level that can be changed while the sink is shared.
#[derive(Debug)]
pub struct Threshold(AtomicU8);

impl Threshold {
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}
