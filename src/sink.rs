//! Console sinks for log entries
//!
//! Entries are line-oriented: the filter hands over one line at a time and the
//! sink decides where it goes.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Where console entries are written
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    /// Print to stdout (default)
    #[default]
    Stdout,
    /// Print to stderr, keeps stdout free for `--echo`
    Stderr,
}

impl ConsoleTarget {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stdout" => Some(Self::Stdout),
            "stderr" => Some(Self::Stderr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }

    /// Build the sink for this target
    pub fn sink(self) -> Box<dyn ConsoleSink> {
        match self {
            ConsoleTarget::Stdout => Box::new(StdoutSink),
            ConsoleTarget::Stderr => Box::new(StderrSink),
        }
    }
}

/// A line-oriented text sink
pub trait ConsoleSink: Send + Sync {
    fn write_line(&self, line: &str) -> io::Result<()>;
}

pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

pub struct StderrSink;

impl ConsoleSink for StderrSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{}", line)
    }
}
