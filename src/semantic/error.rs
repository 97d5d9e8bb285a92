//! Diagnostics reported by the type checker

#![allow(unused_assignments)] // Fields used by thiserror Display derive

use crate::Span;
use miette::Diagnostic;
use thiserror::Error;

/// A diagnostic produced while checking a model
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SemanticDiagnostic {
    /// A type error; the model must not be verified
    #[error("{message}")]
    #[diagnostic(severity(Error))]
    Error {
        /// Error message
        message: String,
        /// Location
        #[label("here")]
        span: Span,
    },

    /// Advisory only
    #[error("{message}")]
    #[diagnostic(severity(Warning))]
    Warning {
        /// Warning message
        message: String,
        /// Location
        #[label("here")]
        span: Span,
    },
}

impl SemanticDiagnostic {
    /// Get the message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            SemanticDiagnostic::Error { message, .. }
            | SemanticDiagnostic::Warning { message, .. } => message,
        }
    }

    /// Get the span
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            SemanticDiagnostic::Error { span, .. } | SemanticDiagnostic::Warning { span, .. } => {
                *span
            }
        }
    }

    /// Check if this is an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, SemanticDiagnostic::Error { .. })
    }
}

/// Receiver of checker diagnostics
pub trait DiagnosticSink {
    /// Report a type error
    fn report_error(&mut self, span: Span, message: &str);

    /// Report an advisory warning
    fn report_warning(&mut self, span: Span, message: &str);

    /// Check if any error was reported
    fn has_errors(&self) -> bool;
}

/// Collection of diagnostics
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<SemanticDiagnostic>,
    error_count: usize,
    max_errors: Option<usize>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection that stores at most `max_errors` errors
    #[must_use]
    pub fn with_limit(max_errors: Option<usize>) -> Self {
        Self {
            max_errors,
            ..Self::default()
        }
    }

    /// All stored diagnostics, in report order
    #[must_use]
    pub fn diagnostics(&self) -> &[SemanticDiagnostic] {
        &self.diagnostics
    }

    /// Stored errors
    pub fn errors(&self) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Stored warnings
    pub fn warnings(&self) -> impl Iterator<Item = &SemanticDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Messages of stored errors
    #[must_use]
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors().map(SemanticDiagnostic::message).collect()
    }

    /// Number of errors reported, including those past the limit
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Take all diagnostics, consuming self
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<SemanticDiagnostic> {
        self.diagnostics
    }

    /// Get the number of stored diagnostics
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report_error(&mut self, span: Span, message: &str) {
        self.error_count += 1;
        if self.max_errors.is_some_and(|max| self.error_count > max) {
            return;
        }
        self.diagnostics.push(SemanticDiagnostic::Error {
            message: message.to_string(),
            span,
        });
    }

    fn report_warning(&mut self, span: Span, message: &str) {
        self.diagnostics.push(SemanticDiagnostic::Warning {
            message: message.to_string(),
            span,
        });
    }

    fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}
