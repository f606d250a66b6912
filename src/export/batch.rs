use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity attached to a rendered log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    #[serde(alias = "warn")]
    Warning,
    Info,
    Trace,
    Profile,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Trace => "trace",
            Level::Profile => "profile",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Level::Error),
            "warning" | "warn" => Ok(Level::Warning),
            "info" => Ok(Level::Info),
            "trace" => Ok(Level::Trace),
            "profile" => Ok(Level::Profile),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// One already-rendered line handed over by the logging pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub line: String,
}

impl LogRecord {
    pub fn new(level: Level, line: impl Into<String>) -> Self {
        Self {
            level,
            line: line.into(),
        }
    }
}

/// Lines collected since the previous export, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBatch {
    lines: Vec<String>,
}

impl LogBatch {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Keep only the records whose level is in `levels`
    pub fn from_records(records: Vec<LogRecord>, levels: &[Level]) -> Self {
        let lines = records
            .into_iter()
            .filter(|record| levels.contains(&record.level))
            .map(|record| record.line)
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the batch as one blob: each entry on its own line, exactly one
    /// trailing `\n`.
    ///
    /// Any run of `\n` and `\r` at the end of an entry is dropped before the
    /// `\n` is added, so CRLF-terminated entries are stored with a bare `\n`.
    /// Carriage returns elsewhere in an entry are kept.
    pub fn format(&self) -> String {
        let capacity = self.lines.iter().map(|line| line.len() + 1).sum();
        let mut blob = String::with_capacity(capacity);

        for line in &self.lines {
            blob.push_str(line.trim_end_matches(['\n', '\r']));
            blob.push('\n');
        }

        blob
    }
}

impl From<Vec<String>> for LogBatch {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}
