/// Tests for logging types

use super::*;

// ============================================================================
// Tests: Severity ordering
// ============================================================================

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

// ============================================================================
// Tests: LogEntry
// ============================================================================

#[test]
fn test_log_entry_clone() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "hello".to_string(),
        file: None,
        line: None,
    };
    let cloned = entry.clone();
    assert_eq!(cloned.severity, LogSeverity::Info);
    assert_eq!(cloned.source, "nova3d::test");
    assert_eq!(cloned.message, "hello");
}

#[test]
fn test_log_entry_error_carries_location() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "boom".to_string(),
        file: Some("lib.rs"),
        line: Some(7),
    };
    assert_eq!(entry.file, Some("lib.rs"));
    assert_eq!(entry.line, Some(7));
}

// ============================================================================
// Tests: DefaultLogger
// ============================================================================

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Debug,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "smoke".to_string(),
        file: None,
        line: None,
    });
}
