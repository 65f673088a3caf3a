//! Engine-wide services
//!
//! The only process-wide state in this core is the logger, stored behind an
//! `OnceLock` + `RwLock` so the logging macros can reach it from anywhere.
//! Everything else (id allocation, scenes, cameras, queues) is owned by a
//! `SceneManager` instance — there are no other globals.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

/// Global logger (initialized lazily with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entry point for engine-wide services (currently: logging).
pub struct Engine;

impl Engine {
    fn logger() -> &'static RwLock<Box<dyn Logger>> {
        LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
    }

    /// Replace the global logger.
    ///
    /// The previous logger is dropped. Typically called once at startup;
    /// tests use it to capture log output.
    pub fn set_logger(logger: Box<dyn Logger>) {
        if let Ok(mut slot) = Self::logger().write() {
            *slot = logger;
        }
    }

    /// Log a message through the installed logger.
    ///
    /// Used by the `engine_trace!` .. `engine_warn!` macros.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let entry = LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        };
        if let Ok(logger) = Self::logger().read() {
            logger.log(&entry);
        }
    }

    /// Log a message with file:line details.
    ///
    /// Used by the `engine_error!` macro.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let entry = LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        };
        if let Ok(logger) = Self::logger().read() {
            logger.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
