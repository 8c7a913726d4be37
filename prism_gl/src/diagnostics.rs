//! Native debug output routing
//!
//! A [`DiagnosticContext`] is handed to a device at construction and receives
//! every debug message the native API reports. It tracks a stack of source
//! locations so that messages raised during a build can be traced back to the
//! call site that started it, filters by severity, keeps counters and forwards
//! what survives to a [`DiagnosticSink`].

use crate::error::SourceLocation;
use crate::log::{Log, LogSeverity};
use colored::*;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

// ===== CONFIGURATION =====

/// Which native debug messages are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugSeverity {
    /// Only errors
    ErrorsOnly,
    /// Errors and warnings
    #[default]
    ErrorsAndWarnings,
    /// Everything, including notifications
    All,
}

/// Where surfaced debug messages are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DebugOutput {
    /// Colored output on stderr
    #[default]
    Console,
    /// Plain text appended to a file
    File(String),
    /// Both console and file
    Both(String),
}

/// Debug output configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Install the native debug callback at all
    pub enable_debug_output: bool,
    /// Severity filter
    pub debug_severity: DebugSeverity,
    /// Output destination
    pub debug_output: DebugOutput,
    /// Abort the process on the first native error
    pub break_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_debug_output: cfg!(debug_assertions),
            debug_severity: DebugSeverity::default(),
            debug_output: DebugOutput::default(),
            break_on_error: false,
        }
    }
}

// ===== MESSAGES =====

/// Component that produced a native debug message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSource {
    Api,
    WindowSystem,
    ShaderCompiler,
    ThirdParty,
    Application,
    Other,
}

/// Nature of a native debug message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugKind {
    Error,
    DeprecatedBehavior,
    UndefinedBehavior,
    Portability,
    Performance,
    Marker,
    Other,
}

/// Severity reported by the native API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugSeverityLevel {
    Notification,
    Low,
    Medium,
    High,
}

/// One native debug message
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub source: DebugSource,
    pub kind: DebugKind,
    pub severity: DebugSeverityLevel,
    /// Driver-specific message id
    pub id: u32,
    pub text: String,
    /// Innermost scope active when the message was emitted
    pub location: Option<SourceLocation>,
}

impl DiagnosticMessage {
    pub fn new(
        source: DebugSource,
        kind: DebugKind,
        severity: DebugSeverityLevel,
        id: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source,
            kind,
            severity,
            id,
            text: text.into(),
            location: None,
        }
    }

    /// True for messages that report an actual error
    pub fn is_error(&self) -> bool {
        self.kind == DebugKind::Error || self.severity == DebugSeverityLevel::High
    }

    fn is_warning(&self) -> bool {
        self.severity == DebugSeverityLevel::Medium
    }
}

// ===== SINKS =====

/// Destination for diagnostic messages that passed the filter
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, message: &DiagnosticMessage);
}

/// Forwards messages to the process-wide logger
pub struct LoggerSink;

impl DiagnosticSink for LoggerSink {
    fn emit(&self, message: &DiagnosticMessage) {
        let severity = if message.is_error() {
            LogSeverity::Error
        } else {
            match message.severity {
                DebugSeverityLevel::Medium => LogSeverity::Warn,
                DebugSeverityLevel::Low => LogSeverity::Info,
                _ => LogSeverity::Debug,
            }
        };
        let text = format!("[{:?}/{:?} #{}] {}", message.source, message.kind, message.id, message.text);
        match message.location {
            Some(location) => {
                Log::log_detailed(severity, "prism::Debug", text, location.file, location.line)
            }
            None => Log::log(severity, "prism::Debug", text),
        }
    }
}

/// Writes messages to the console and/or a file
pub struct OutputSink {
    output: DebugOutput,
}

impl OutputSink {
    pub fn new(output: DebugOutput) -> Self {
        Self { output }
    }
}

impl DiagnosticSink for OutputSink {
    fn emit(&self, message: &DiagnosticMessage) {
        let (severity_str, severity_colored) = if message.is_error() {
            ("ERROR", "ERROR".red().bold())
        } else if message.is_warning() {
            ("WARNING", "WARNING".yellow().bold())
        } else if message.severity == DebugSeverityLevel::Low {
            ("INFO", "INFO".cyan())
        } else {
            ("VERBOSE", "VERBOSE".bright_black())
        };

        let origin = match message.location {
            Some(location) => location.to_string(),
            None => "unknown".to_string(),
        };

        let console_output = format!(
            "{} {} [{:?}]\n  ├─ {}: {}\n  ├─ {}: {}\n  └─ {}\n",
            "[GL".bright_blue().bold(),
            format!("{}]", severity_colored).bright_blue().bold(),
            message.kind,
            "Message ID".bright_black(),
            message.id,
            "Origin".bright_black(),
            origin,
            message.text.white()
        );

        let file_output = format!(
            "[GL {}] [{:?}]\n  ├─ Message ID: {}\n  ├─ Origin: {}\n  └─ {}\n",
            severity_str, message.kind, message.id, origin, message.text
        );

        match &self.output {
            DebugOutput::Console => eprint!("{}", console_output),
            DebugOutput::File(path) => write_to_file(path, &file_output),
            DebugOutput::Both(path) => {
                eprint!("{}", console_output);
                write_to_file(path, &file_output);
            }
        }
    }
}

fn write_to_file(path: &str, message: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", message);
    }
}

/// Keeps every message in memory
#[derive(Default)]
pub struct CapturingSink {
    messages: Mutex<Vec<DiagnosticMessage>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured messages, oldest first
    pub fn messages(&self) -> Vec<DiagnosticMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl DiagnosticSink for CapturingSink {
    fn emit(&self, message: &DiagnosticMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.clone());
        }
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<S> {
    fn emit(&self, message: &DiagnosticMessage) {
        (**self).emit(message)
    }
}

// ===== STATISTICS =====

/// Message counters since creation or the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl DiagnosticStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct StatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl StatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn record(&self, message: &DiagnosticMessage) {
        let counter = if message.is_error() {
            &self.errors
        } else if message.is_warning() {
            &self.warnings
        } else if message.severity == DebugSeverityLevel::Low {
            &self.info
        } else {
            &self.verbose
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self) -> DiagnosticStats {
        DiagnosticStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

// ===== CONTEXT =====

/// Receives native debug messages for one device
pub struct DiagnosticContext {
    sink: Box<dyn DiagnosticSink>,
    filter: DebugSeverity,
    enabled: bool,
    break_on_error: bool,
    scopes: Mutex<Vec<SourceLocation>>,
    stats: StatsTracker,
}

impl DiagnosticContext {
    /// Create a context that forwards filtered messages to `sink`
    pub fn new<S: DiagnosticSink + 'static>(sink: S, filter: DebugSeverity) -> Self {
        Self {
            sink: Box::new(sink),
            filter,
            enabled: true,
            break_on_error: false,
            scopes: Mutex::new(Vec::new()),
            stats: StatsTracker::new(),
        }
    }

    /// Create a context from a debug configuration
    pub fn from_config(config: &Config) -> Self {
        let mut context = Self::new(OutputSink::new(config.debug_output.clone()), config.debug_severity);
        context.enabled = config.enable_debug_output;
        context.break_on_error = config.break_on_error;
        context
    }

    /// A context that drops every message
    pub fn disabled() -> Self {
        let mut context = Self::new(LoggerSink, DebugSeverity::ErrorsOnly);
        context.enabled = false;
        context
    }

    pub fn with_break_on_error(mut self, break_on_error: bool) -> Self {
        self.break_on_error = break_on_error;
        self
    }

    /// Whether the backend should install its native debug callback
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn filter(&self) -> DebugSeverity {
        self.filter
    }

    /// Push a source location for the lifetime of the returned guard
    pub fn scope(&self, location: SourceLocation) -> ScopeGuard<'_> {
        if let Ok(mut scopes) = self.scopes.lock() {
            scopes.push(location);
        }
        ScopeGuard { context: self }
    }

    /// Innermost active scope
    pub fn current_scope(&self) -> Option<SourceLocation> {
        self.scopes.lock().ok().and_then(|scopes| scopes.last().copied())
    }

    /// Route one message
    ///
    /// Returns `true` when the message is an error and the context was
    /// configured to break on errors. The caller decides how to stop.
    pub fn emit(&self, mut message: DiagnosticMessage) -> bool {
        if !self.enabled {
            return false;
        }

        if message.location.is_none() {
            message.location = self.current_scope();
        }

        self.stats.record(&message);

        if !self.passes(&message) {
            return false;
        }

        self.sink.emit(&message);

        self.break_on_error && message.is_error()
    }

    pub fn stats(&self) -> DiagnosticStats {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn passes(&self, message: &DiagnosticMessage) -> bool {
        match self.filter {
            DebugSeverity::ErrorsOnly => message.is_error(),
            DebugSeverity::ErrorsAndWarnings => message.is_error() || message.is_warning(),
            DebugSeverity::All => true,
        }
    }
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::new(LoggerSink, DebugSeverity::default())
    }
}

/// Pops its scope from the owning context when dropped
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    context: &'a DiagnosticContext,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut scopes) = self.context.scopes.lock() {
            scopes.pop();
        }
    }
}

/// Open a diagnostic scope at the call site
///
/// ```no_run
/// # use prism_gl::prism::diagnostics::{DiagnosticContext};
/// # use prism_gl::prism_scope;
/// let context = DiagnosticContext::default();
/// let _scope = prism_scope!(context);
/// ```
#[macro_export]
macro_rules! prism_scope {
    ($context:expr) => {
        $context.scope($crate::prism_location!())
    };
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
