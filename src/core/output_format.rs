//! Line formats used by sinks that persist records
//!
//! - Text: `[<timestamp>] [<LEVEL>] [<thread>] <file>:<line> <function> | <message>`
//! - Json: one JSON object per line

use super::error::Result;
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    #[default]
    Text,

    /// JSON format for machine processing
    ///
    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","message":"ready",...}`
    Json,
}

impl OutputFormat {
    /// Format a record as a single line, without the terminator
    pub fn format(&self, record: &LogRecord, timestamp_format: &TimestampFormat) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(Self::format_text(record, timestamp_format)),
            OutputFormat::Json => Self::format_json(record, timestamp_format),
        }
    }

    fn format_text(record: &LogRecord, timestamp_format: &TimestampFormat) -> String {
        let mut line = format!(
            "[{}] [{:5}] [{}]",
            timestamp_format.format(record.timestamp()),
            record.level().to_str(),
            record.thread_id(),
        );
        if !record.module().is_empty() {
            line.push_str(" [");
            line.push_str(record.module());
            line.push(']');
        }
        if !record.flag().is_empty() {
            line.push_str(" [");
            line.push_str(record.flag());
            line.push(']');
        }
        line.push(' ');
        line.push_str(&record.render(true));
        line
    }

    fn format_json(record: &LogRecord, timestamp_format: &TimestampFormat) -> Result<String> {
        let mut value = serde_json::to_value(record)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp_format.format(record.timestamp())),
            );
            object.insert(
                "level".to_string(),
                serde_json::Value::String(record.level().to_str().to_string()),
            );
        }
        Ok(serde_json::to_string(&value)?)
    }
}
