//! Logging backend for the `log` facade.
//!
//! The five levels can be toggled independently; the default set matches
//! the compiler's startup configuration (trace suppressed, everything else
//! on). Level tags are colorized under the same rule as diagnostics:
//! stderr is a terminal and `NO_COLOR` is unset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::diagnostic::stderr_supports_color;

const C_RESET: &str = "\x1b[0m";

fn level_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::Trace => ("trace", "\x1b[90m"),
        Level::Debug => ("debug", "\x1b[34m"),
        Level::Info => ("info", "\x1b[32m"),
        Level::Warn => ("warn", "\x1b[33m"),
        Level::Error => ("error", "\x1b[31m"),
    }
}

/// Logger with per-level enable switches.
pub struct VoltLogger {
    // Indexed by log::Level as usize - 1 (Error = 1 .. Trace = 5).
    enabled: [AtomicBool; 5],
    color: bool,
}

impl VoltLogger {
    fn new() -> Self {
        Self {
            enabled: [
                AtomicBool::new(true),  // error
                AtomicBool::new(true),  // warn
                AtomicBool::new(true),  // info
                AtomicBool::new(true),  // debug
                AtomicBool::new(false), // trace
            ],
            color: stderr_supports_color(),
        }
    }

    /// Install the logger process-wide and return a handle for toggling
    /// levels. Safe to call more than once; the same instance is returned.
    pub fn init() -> &'static VoltLogger {
        static LOGGER: OnceLock<VoltLogger> = OnceLock::new();
        let logger = LOGGER.get_or_init(VoltLogger::new);
        if log::set_logger(logger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
        logger
    }

    /// Enable a single level.
    pub fn enable(&self, level: Level) {
        self.enabled[level as usize - 1].store(true, Ordering::Relaxed);
    }

    /// Suppress a single level.
    pub fn disable(&self, level: Level) {
        self.enabled[level as usize - 1].store(false, Ordering::Relaxed);
    }

    /// Is the level currently enabled?
    pub fn is_enabled(&self, level: Level) -> bool {
        self.enabled[level as usize - 1].load(Ordering::Relaxed)
    }
}

impl Log for VoltLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.is_enabled(metadata.level())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let (tag, color) = level_style(record.level());
        if self.color {
            eprintln!("{}{}{}: {}", color, tag, C_RESET, record.args());
        } else {
            eprintln!("{}: {}", tag, record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toggles() {
        let logger = VoltLogger::new();
        assert!(!logger.is_enabled(Level::Trace));
        assert!(logger.is_enabled(Level::Debug));
        assert!(logger.is_enabled(Level::Info));
        assert!(logger.is_enabled(Level::Warn));
        assert!(logger.is_enabled(Level::Error));
    }

    #[test]
    fn test_toggle_round_trip() {
        let logger = VoltLogger::new();
        logger.disable(Level::Info);
        assert!(!logger.is_enabled(Level::Info));
        logger.enable(Level::Trace);
        assert!(logger.is_enabled(Level::Trace));
    }
}
