//! User-facing output.
//!
//! The lifecycle and backends report to the user through [`Logger`]. This is
//! separate from `tracing`, which carries diagnostics for developers.

use std::sync::Mutex;

/// Severity of a user-facing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
    Plain,
}

/// Sink for messages meant for the person running the command.
pub trait Logger: Send + Sync {
    fn info(&self, text: &str);
    fn error(&self, text: &str);
    /// Unadorned output, such as hints following an error.
    fn log(&self, text: &str);
}

/// Writes info and plain lines to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn info(&self, text: &str) {
        println!("[INFO]  {text}");
    }

    fn error(&self, text: &str) {
        eprintln!("[ERROR] {text}");
    }

    fn log(&self, text: &str) {
        println!("{text}");
    }
}

/// Captures lines in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines in order.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Captured lines of one level.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    fn push(&self, level: LogLevel, text: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, text.to_string()));
        }
    }
}

impl Logger for MemoryLogger {
    fn info(&self, text: &str) {
        self.push(LogLevel::Info, text);
    }

    fn error(&self, text: &str) {
        self.push(LogLevel::Error, text);
    }

    fn log(&self, text: &str) {
        self.push(LogLevel::Plain, text);
    }
}
