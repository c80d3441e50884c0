//! Console sink implementation

use super::LINE_ENDING;
use crate::core::{LogLevel, LogRecord, Result, Sink, Threshold};
#[cfg(feature = "console")]
use colored::Colorize;
use parking_lot::Mutex;
use std::io::Write;

/// Writes `<file>:<line> <function> | <message>` lines to standard output.
///
/// Write errors (closed pipe, full disk behind a redirect) are swallowed.
pub struct ConsoleSink {
    name: String,
    threshold: Threshold,
    use_colors: bool,
    target: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>, threshold: LogLevel) -> Self {
        Self::with_writer(name, threshold, std::io::stdout())
    }

    /// Write to `target` instead of standard output
    pub fn with_writer(
        name: impl Into<String>,
        threshold: LogLevel,
        target: impl Write + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            threshold: Threshold::new(threshold),
            use_colors: false,
            target: Mutex::new(Box::new(target)),
        }
    }

    /// Prefix each line with a colored level marker
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.set(level);
    }

    fn format_line(&self, record: &LogRecord) -> String {
        let body = record.render(true);
        if !self.use_colors {
            return body;
        }

        #[cfg(feature = "console")]
        {
            let marker = format!("[{}]", record.level().short_marker())
                .color(record.level().color_code())
                .to_string();
            format!("{} {}", marker, body)
        }
        #[cfg(not(feature = "console"))]
        {
            body
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn threshold(&self) -> LogLevel {
        self.threshold.get()
    }

    fn write(&self, record: &LogRecord) -> Result<()> {
        let line = self.format_line(record);
        let mut target = self.target.lock();
        let _ = write!(target, "{}{}", line, LINE_ENDING);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _ = self.target.lock().flush();
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("name", &self.name)
            .field("threshold", &self.threshold.get())
            .field("use_colors", &self.use_colors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallSite, Dispatcher};
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_info_threshold_filters_trace() {
        let buffer = SharedBuffer::default();
        let dispatcher = Dispatcher::new("console");
        dispatcher.add_sink(ConsoleSink::with_writer(
            "console",
            LogLevel::Info,
            buffer.clone(),
        ));

        let site = CallSite::new("src/app.rs", "app::run", 3, "app");
        dispatcher.capture(LogLevel::Trace, site.clone()).append("should be filtered").submit();
        dispatcher.capture(LogLevel::Error, site).append("x=").append(1).submit();

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("x=1"));
        assert_eq!(lines[0], "src/app.rs:3 app::run | x=1");
    }

    #[test]
    fn test_each_record_ends_with_platform_terminator() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::with_writer("console", LogLevel::Trace, buffer.clone());
        for text in ["first", "second"] {
            let mut record = LogRecord::new(LogLevel::Info);
            record.append(text).unwrap();
            sink.write(&record).unwrap();
        }

        assert_eq!(buffer.contents(), format!("first{0}second{0}", LINE_ENDING));
    }

    #[test]
    fn test_write_errors_are_swallowed() {
        let sink = ConsoleSink::with_writer("broken", LogLevel::Trace, BrokenPipe);
        let mut record = LogRecord::new(LogLevel::Error);
        record.append("lost").unwrap();

        assert!(sink.write(&record).is_ok());
        assert!(sink.flush().is_ok());
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_colored_marker() {
        colored::control::set_override(true);
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::with_writer("console", LogLevel::Trace, buffer.clone())
            .with_colors(true);
        let mut record = LogRecord::new(LogLevel::Warn);
        record.append("careful").unwrap();

        sink.write(&record).unwrap();

        let output = buffer.contents();
        assert!(output.contains("[W]"));
        assert!(output.trim_end().ends_with("careful"));
    }

    #[test]
    fn test_set_threshold() {
        let sink = ConsoleSink::new("console", LogLevel::Error);
        assert!(!sink.accepts(LogLevel::Info));
        sink.set_threshold(LogLevel::Info);
        assert!(sink.accepts(LogLevel::Info));
    }
}
