//! Integration tests for the logging system
//!
//! These tests replace the process-wide logger and check what the library
//! reports through it.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use prism_gl::prism::device::{DeviceRef, MockGraphicsDevice};
use prism_gl::prism::diagnostics::{
    DebugKind, DebugSeverity, DebugSeverityLevel, DebugSource, DiagnosticContext, DiagnosticMessage, LoggerSink,
};
use prism_gl::prism::log::{Log, LogEntry, LogSeverity, Logger};
use prism_gl::prism::shader::{ShaderStageDesc, StageKind};
use prism_gl::prism::{ErrorKind, ProgramCache};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    Log::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Log::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "test::module");
    assert_eq!(captured[1].message, "Test warning message");
    assert_eq!(captured[1].file, None);

    Log::reset_logger();
}

#[test]
#[serial]
fn test_integration_errors_are_logged_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let mock = MockGraphicsDevice::shared();
    let device: DeviceRef = mock;
    let cache = ProgramCache::new(&device);
    let key = ShaderStageDesc::source(StageKind::Vertex, "void main() {}");
    let err = cache.at(&prism_gl::prism::shader::ProgramDesc::from(key).key()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);

    let captured = entries.lock().unwrap().clone();
    let entry = captured
        .iter()
        .find(|e| e.severity == LogSeverity::Error)
        .expect("error entry");
    assert_eq!(entry.source, "prism::ProgramCache");
    assert!(entry.message.starts_with("key_not_found: "));
    assert!(entry.file.is_some());
    assert!(entry.line.is_some());

    Log::reset_logger();
}

#[test]
#[serial]
fn test_integration_cache_reports_save() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let device: DeviceRef = MockGraphicsDevice::shared();
    let cache = ProgramCache::new(&device);
    cache.set(ShaderStageDesc::source(StageKind::Compute, "void main() {}")).unwrap();
    let path = std::env::temp_dir().join(format!("prism_logging_{}.prgc", std::process::id()));
    cache.save(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let captured = entries.lock().unwrap().clone();
    assert!(captured.iter().any(|e| {
        e.severity == LogSeverity::Info && e.source == "prism::ProgramCache" && e.message.starts_with("Saved 1 program(s)")
    }));

    Log::reset_logger();
}

#[test]
#[serial]
fn test_integration_driver_messages_reach_logger() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let context = DiagnosticContext::new(LoggerSink, DebugSeverity::ErrorsAndWarnings);
    context.emit(DiagnosticMessage::new(
        DebugSource::Api,
        DebugKind::Performance,
        DebugSeverityLevel::Medium,
        131218,
        "program is being recompiled based on state",
    ));
    context.emit(DiagnosticMessage::new(
        DebugSource::Api,
        DebugKind::Other,
        DebugSeverityLevel::Notification,
        131185,
        "buffer will use video memory",
    ));

    let captured = entries.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert_eq!(captured[0].source, "prism::Debug");
    assert!(captured[0].message.contains("recompiled"));

    Log::reset_logger();
}
