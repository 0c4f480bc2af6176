//! Append-only status log for save attempts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use bevy::prelude::*;
use chrono::Local;

/// Severity of a save-log line. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Error,
}

impl LogLevel {
    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Process-lifetime sink for save status lines.
///
/// Opened in truncate mode once at activation. The version header is written
/// unconditionally; subsequent lines below the minimum severity are dropped.
/// When the destination cannot be opened the sink stays inert and the plugin
/// keeps running without a log.
#[derive(Resource, Default)]
pub struct SaveLog {
    file: Option<File>,
    min_level: LogLevel,
}

impl SaveLog {
    /// Open `path` in truncate mode with the given severity floor.
    pub fn init(path: &Path, min_level: LogLevel) -> Self {
        let file = match File::create(path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Autosave log unavailable at {}: {e}", path.display());
                None
            }
        };
        Self { file, min_level }
    }

    /// Write the one-line version header, bypassing the severity floor.
    pub fn write_header(&mut self, text: &str) {
        self.write_raw(text);
    }

    /// Append a timestamped `[HH:MM:SS.mmm] message` line if `level` clears
    /// the severity floor.
    pub fn write_line(&mut self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        let stamp = Local::now().format("%H:%M:%S%.3f");
        self.write_raw(&format!("[{stamp}] {message}"));
    }

    /// Whether the sink has an open destination.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn write_raw(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut() {
            // A failed write closes the sink rather than failing every tick.
            if writeln!(file, "{line}").is_err() {
                self.file = None;
            }
        }
    }
}
