//! Error reporting for unexpected tool failures.
//!
//! The dispatch boundary notifies an [`ErrorReporter`] once for every
//! unexpected failure or panic. Domain errors are not reported; they are
//! part of normal operation.

use std::fmt;
use std::sync::Mutex;

/// How a tool failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tool returned an unexpected error.
    Error,
    /// The tool panicked.
    Panic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "error"),
            ErrorKind::Panic => write!(f, "panic"),
        }
    }
}

/// One reported failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorReport {
    /// Global tool name, or the resource URI for resource reads
    pub tool: String,
    /// Failure kind
    pub kind: ErrorKind,
    /// Top-level message
    pub message: String,
    /// Source chain, outermost first, excluding `message`
    pub chain: Vec<String>,
}

impl ErrorReport {
    /// Build a report from an unexpected error.
    pub fn from_error(tool: impl Into<String>, error: &anyhow::Error) -> Self {
        Self {
            tool: tool.into(),
            kind: ErrorKind::Error,
            message: error.to_string(),
            chain: error.chain().skip(1).map(ToString::to_string).collect(),
        }
    }

    /// Build a report from a panic payload message.
    pub fn from_panic(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            kind: ErrorKind::Panic,
            message: message.into(),
            chain: Vec::new(),
        }
    }
}

/// Sink for unexpected failures. Must not block.
pub trait ErrorReporter: Send + Sync {
    /// Record a failure.
    fn notify(&self, report: &ErrorReport);
}

/// Default reporter: logs each report at `error` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn notify(&self, report: &ErrorReport) {
        tracing::error!(
            tool = %report.tool,
            kind = %report.kind,
            chain = ?report.chain,
            "Tool failure: {}",
            report.message
        );
    }
}

/// Reporter that keeps every report in memory.
///
/// Useful in tests and for embedding applications that forward reports
/// elsewhere in batches.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl CollectingReporter {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected reports.
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of collected reports.
    pub fn count(&self) -> usize {
        self.reports().len()
    }
}

impl ErrorReporter for CollectingReporter {
    fn notify(&self, report: &ErrorReport) {
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
    }
}
