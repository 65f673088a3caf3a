/// Tests for the Engine logging entry points
///
/// These replace the process-wide logger, so they run serially.

use super::*;
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(Box::new(CaptureLogger {
        entries: Arc::clone(&entries),
    }));
    entries
}

// ============================================================================
// Tests: Logger dispatch
// ============================================================================

#[test]
#[serial]
fn test_log_reaches_installed_logger() {
    let entries = install_capture();

    Engine::log(LogSeverity::Info, "nova3d::test", "message one".to_string());

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].source, "nova3d::test");
    assert_eq!(entries[0].message, "message one");
    assert!(entries[0].file.is_none());
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = install_capture();

    Engine::log_detailed(
        LogSeverity::Error,
        "nova3d::test",
        "with location".to_string(),
        "engine.rs",
        123,
    );

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file, Some("engine.rs"));
    assert_eq!(entries[0].line, Some(123));
}

#[test]
#[serial]
fn test_set_logger_replaces_previous() {
    let first = install_capture();
    let second = install_capture();

    Engine::log(LogSeverity::Warn, "nova3d::test", "routed".to_string());

    assert_eq!(first.lock().unwrap().len(), 0);
    assert_eq!(second.lock().unwrap().len(), 1);
}

// ============================================================================
// Tests: Macros
// ============================================================================

#[test]
#[serial]
fn test_logging_macros_route_through_engine() {
    let entries = install_capture();

    crate::engine_trace!("nova3d::test", "t");
    crate::engine_debug!("nova3d::test", "d");
    crate::engine_info!("nova3d::test", "i");
    crate::engine_warn!("nova3d::test", "w");
    crate::engine_error!("nova3d::test", "e {}", 5);

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[4].severity, LogSeverity::Error);
    assert_eq!(entries[4].message, "e 5");
    assert!(entries[4].file.is_some());
}
