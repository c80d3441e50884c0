//! Log record structure
//!
//! A [`LogRecord`] is mutable only while its body is being captured. The first
//! call to [`LogRecord::finalize`] or [`LogRecord::message`] freezes the body;
//! from then on the record is read-only and is shared between sinks and threads
//! behind an `Arc`.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::now_millis;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::{self, Display, Write as _};
use std::sync::{Arc, OnceLock};

/// A finalized record as handed to writers and sinks.
pub type SharedRecord = Arc<LogRecord>;

// Thread-local cache for the thread id to avoid a format per record
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Source location of a logging statement.
///
/// Usually produced by the [`call_site!`](crate::call_site) macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub function: Cow<'static, str>,
    pub line: u32,
    pub module: Cow<'static, str>,
}

impl CallSite {
    pub const fn new(
        file: &'static str,
        function: &'static str,
        line: u32,
        module: &'static str,
    ) -> Self {
        Self {
            file: Cow::Borrowed(file),
            function: Cow::Borrowed(function),
            line,
            module: Cow::Borrowed(module),
        }
    }

    /// A call site with no location information.
    pub const fn unknown() -> Self {
        Self::new("", "", 0, "")
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    level: LogLevel,
    site: CallSite,
    flag: Cow<'static, str>,
    timestamp: DateTime<Utc>,
    thread_id: String,
    body: String,
    frozen: OnceLock<String>,
}

impl LogRecord {
    /// Escape control characters so one record always renders as one line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel) -> Self {
        Self::at(level, CallSite::unknown())
    }

    /// Create a record captured at `site` on the current thread, now.
    pub fn at(level: LogLevel, site: CallSite) -> Self {
        Self {
            level,
            site,
            flag: Cow::Borrowed(""),
            timestamp: now_millis(),
            thread_id: current_thread_id(),
            body: String::new(),
            frozen: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<Cow<'static, str>>) -> Self {
        self.flag = flag.into();
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: impl Into<Cow<'static, str>>) -> Self {
        self.site.module = module.into();
        self
    }

    pub(crate) fn set_flag(&mut self, flag: Cow<'static, str>) {
        self.flag = flag;
    }

    pub(crate) fn set_module(&mut self, module: Cow<'static, str>) {
        self.site.module = module;
    }

    /// Append the textual form of `value` to the body.
    ///
    /// Fails with [`LoggerError::RecordFinalized`] once the body is frozen.
    pub fn append<T: Display>(&mut self, value: T) -> Result<()> {
        if self.is_finalized() {
            return Err(LoggerError::RecordFinalized);
        }
        // A Display impl that reports an error leaves whatever it wrote so far.
        let _ = write!(self.body, "{}", value);
        Ok(())
    }

    /// Freeze the body. Calling this again has no effect.
    pub fn finalize(&mut self) {
        if self.frozen.get().is_none() {
            let body = std::mem::take(&mut self.body);
            let _ = self.frozen.set(Self::sanitize_message(&body));
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.frozen.get().is_some()
    }

    /// The frozen message body. Freezes the record on first call.
    pub fn message(&self) -> &str {
        self.frozen
            .get_or_init(|| Self::sanitize_message(&self.body))
    }

    /// `<file>:<line> <function> | <message>`, or just the message.
    pub fn render(&self, include_location: bool) -> String {
        if include_location {
            format!(
                "{}:{} {} | {}",
                self.site.file,
                self.site.line,
                self.site.function,
                self.message()
            )
        } else {
            self.message().to_string()
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn call_site(&self) -> &CallSite {
        &self.site
    }

    pub fn file(&self) -> &str {
        &self.site.file
    }

    pub fn function(&self) -> &str {
        &self.site.function
    }

    pub fn line(&self) -> u32 {
        self.site.line
    }

    pub fn module(&self) -> &str {
        &self.site.module
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LogRecord", 9)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("file", &self.site.file)?;
        state.serialize_field("line", &self.site.line)?;
        state.serialize_field("function", &self.site.function)?;
        state.serialize_field("module", &self.site.module)?;
        state.serialize_field("flag", &self.flag)?;
        state.serialize_field("thread_id", &self.thread_id)?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}
