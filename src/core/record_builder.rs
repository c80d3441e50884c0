//! Scoped record capture bound to one call site

use super::{
    dispatcher::Dispatcher,
    log_level::LogLevel,
    log_record::{CallSite, LogRecord},
};
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::ops::Shl;

/// Accumulates one record and submits it to its dispatcher when dropped.
///
/// Submission happens exactly once, on whichever path leaves the scope,
/// including unwinding. [`submit`](Self::submit) sends early; the later drop is
/// then a no-op. Filtering happens when the record is delivered, so sinks
/// added or re-thresholded while the builder is open see the record.
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::prelude::*;
///
/// let dispatcher = Dispatcher::new("doc");
/// dispatcher.add_sink(MemorySink::new("mem", LogLevel::Debug));
///
/// let _ = dispatcher.capture(LogLevel::Debug, CallSite::unknown()) << 1 << "+" << 2 << '=' << 3;
/// ```
pub struct RecordBuilder<'a> {
    dispatcher: &'a Dispatcher,
    record: Option<LogRecord>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(dispatcher: &'a Dispatcher, level: LogLevel, site: CallSite) -> Self {
        Self {
            dispatcher,
            record: Some(LogRecord::at(level, site)),
        }
    }

    /// Whether the record is still pending submission.
    pub fn is_active(&self) -> bool {
        self.record.is_some()
    }

    #[must_use = "dropping the builder submits the record; chain further or let it go"]
    pub fn append<T: Display>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Display>(&mut self, value: T) -> &mut Self {
        if let Some(record) = self.record.as_mut() {
            // The record cannot be finalized while the builder owns it.
            let _ = record.append(value);
        }
        self
    }

    #[must_use = "dropping the builder submits the record; chain further or let it go"]
    pub fn flag(mut self, flag: impl Into<Cow<'static, str>>) -> Self {
        if let Some(record) = self.record.as_mut() {
            record.set_flag(flag.into());
        }
        self
    }

    #[must_use = "dropping the builder submits the record; chain further or let it go"]
    pub fn module(mut self, module: impl Into<Cow<'static, str>>) -> Self {
        if let Some(record) = self.record.as_mut() {
            record.set_module(module.into());
        }
        self
    }

    /// Finalize and hand the record to the dispatcher now.
    pub fn submit(mut self) {
        self.flush_record();
    }

    /// Append preformatted arguments and submit.
    pub fn submit_fmt(mut self, args: fmt::Arguments<'_>) {
        self.push(args);
        self.flush_record();
    }

    fn flush_record(&mut self) {
        if let Some(record) = self.record.take() {
            self.dispatcher.write(record);
        }
    }
}

impl<T: Display> Shl<T> for RecordBuilder<'_> {
    type Output = Self;

    fn shl(self, value: T) -> Self {
        self.append(value)
    }
}

impl Drop for RecordBuilder<'_> {
    fn drop(&mut self) {
        self.flush_record();
    }
}

impl fmt::Debug for RecordBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuilder")
            .field("dispatcher", &self.dispatcher.name())
            .field("record", &self.record)
            .finish()
    }
}
