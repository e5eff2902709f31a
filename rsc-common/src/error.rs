//! Error handling for the RSC script compiler
//!
//! This module defines the common error type and the diagnostic sink shared
//! by every phase of the backend. Diagnostics are fire-and-forget: a phase
//! reports what it saw and keeps going; whether the compile as a whole failed
//! is decided at the end by asking the reporter whether any error-severity
//! diagnostic was recorded.

use crate::source_loc::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type for failures that abort a phase outright
/// (I/O, malformed input, internal inconsistencies). Policy violations in
/// the compiled unit are reported through [`ErrorReporter`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Lowering error at {span}: {message}")]
    LoweringError { span: SourceSpan, message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create an input error (malformed translation unit)
    pub fn input_error(message: String) -> Self {
        CompilerError::InputError { message }
    }

    /// Create a lowering error
    pub fn lowering_error(message: String, span: SourceSpan) -> Self {
        CompilerError::LoweringError { span, message }
    }

    /// Create an internal error
    pub fn internal_error(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: SourceSpan,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: SourceSpan) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, span: SourceSpan) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span, self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Diagnostic sink for collecting and displaying diagnostics
///
/// Reporting never blocks or fails; repeated failures accumulate. The exit
/// status of the whole compile is derived from `has_errors`, never from the
/// control flow of an individual pass.
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, span: SourceSpan) {
        self.report(Diagnostic::error(message, span));
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, span: SourceSpan) {
        self.report(Diagnostic::warning(message, span));
    }

    /// Report a prebuilt diagnostic (used when notes are attached)
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_loc::SourceLocation;

    fn span() -> SourceSpan {
        SourceSpan::new(
            SourceLocation::new("kernel.rs", 1, 1),
            SourceLocation::new("kernel.rs", 1, 5),
        )
    }

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error("bad export".to_string(), span());
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "bad export");
    }

    #[test]
    fn test_error_reporter_counts() {
        let mut reporter = ErrorReporter::new();

        assert!(!reporter.has_errors());
        reporter.error("first".to_string(), span());
        reporter.warning("second".to_string(), span());
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.warning_count(), 1);
        assert_eq!(reporter.diagnostics().len(), 2);
    }

    #[test]
    fn test_diagnostic_with_notes() {
        let diag = Diagnostic::error("mismatch".to_string(), span())
            .with_note("expected: { i32, f32 }".to_string())
            .with_note("got: { i32 }".to_string());

        assert_eq!(diag.notes.len(), 2);
        let rendered = format!("{}", diag);
        assert!(rendered.contains("note: expected"));
    }

    #[test]
    fn test_reporter_accumulates_prebuilt() {
        let mut reporter = ErrorReporter::new();
        reporter.report(Diagnostic::error("a".to_string(), span()).with_note("b".to_string()));
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics()[0].notes.len(), 1);
    }

    #[test]
    fn test_summary() {
        let mut reporter = ErrorReporter::new();
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.error("e1".to_string(), span());
        assert_eq!(reporter.summary(), "1 error");

        reporter.error("e2".to_string(), span());
        reporter.warning("w1".to_string(), span());
        assert_eq!(reporter.summary(), "2 errors and 1 warning");
    }
}
