//! File sink implementation

use super::LINE_ENDING;
use crate::core::{
    LogLevel, LogRecord, LoggerError, OutputFormat, Result, Sink, Threshold, TimestampFormat,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one line per record to a file.
///
/// Output is buffered; it reaches the file on [`Sink::flush`], after every
/// async drain batch, and on drop.
pub struct FileSink {
    name: String,
    path: PathBuf,
    threshold: Threshold,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, threshold: LogLevel) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            name: name.into(),
            path,
            threshold: Threshold::new(threshold),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Set the timestamp format for this sink
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_log_dispatcher::sinks::FileSink;
    /// use rust_log_dispatcher::{LogLevel, TimestampFormat};
    ///
    /// let sink = FileSink::new("file", "/var/log/app.log", LogLevel::Info)
    ///     .unwrap()
    ///     .with_timestamp_format(TimestampFormat::Local);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.set(level);
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> LogLevel {
        self.threshold.get()
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.output_format.format(record, &self.timestamp_format)?;
        line.push_str(LINE_ENDING);

        self.writer.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.get_mut().flush();
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("threshold", &self.threshold.get())
            .field("output_format", &self.output_format)
            .finish()
    }
}
