//! User-visible console
//!
//! Append-only list of messages shown to the user. Every line is also
//! emitted through `tracing` so it shows up in the regular log output.

use engine::io::{LoadReport, SaveReport};
use tracing::{error, info, warn};

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A single console line
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Console {
    lines: Vec<ConsoleLine>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info => info!(target: "editor::console", "{message}"),
            LogLevel::Warning => warn!(target: "editor::console", "{message}"),
            LogLevel::Error => error!(target: "editor::console", "{message}"),
        }
        self.lines.push(ConsoleLine { level, message });
    }

    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// Lines of the given level
    pub fn lines_with_level(&self, level: LogLevel) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().filter(move |line| line.level == level)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Surface the per-entity failures of a save
    pub fn report_save(&mut self, report: &SaveReport) {
        for failure in &report.failures {
            self.error(failure.to_string());
        }
    }

    /// Surface the per-entity failures and dangling parents of a load
    pub fn report_load(&mut self, report: &LoadReport) {
        for failure in &report.failures {
            self.error(failure.to_string());
        }
        for id in &report.unresolved_parents {
            self.warn(format!("Parent of {id} not found, added at the root"));
        }
    }
}
