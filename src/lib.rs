//! ta-typeck: semantic analysis for a timed-automata modeling language
//!
//! The crate takes the declaration tree of a model (global declarations,
//! templates, instances, properties) and annotates it in place:
//!
//! - **Types**: every expression receives a type from a lattice that
//!   separates plain values from clocks, clock differences, invariants,
//!   guards and property constraints
//! - **Initialisers**: array and record initialisers are validated and
//!   normalised into positional lists aligned with their declared type
//! - **Locations**: invariants are split into a pure invariant and a cost rate
//! - **Functions**: bodies are checked and their effect sets recorded
//! - **Instances**: template arguments are checked against their parameters
//!
//! Problems are reported through a [`semantic::DiagnosticSink`]; checking
//! never stops at the first error.
//!
//! # Example
//!
//! ```text
//! clock x;
//! cost c;
//! const int N = 3;
//! int[0,N] a[2] = { 1, 2 };
//!
//! process P(urgent chan &go) {
//!     state idle { x <= 5 && c' == 2 };
//!     trans idle -> idle { guard a[0] > 0; sync go!; assign x = 0; };
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod config;
pub mod interpreter;
pub mod semantic;

pub use config::{CheckerConfig, ConfigError};
pub use semantic::{
    check_expression, check_property, check_system, check_system_with_config, DiagnosticSink,
    Diagnostics, SemanticDiagnostic, TypeChecker,
};

/// Byte range of a construct in the model source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span covering both spans
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Length in bytes
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span covers no bytes
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge_is_order_independent() {
        let a = Span::new(4, 9);
        let b = Span::new(12, 20);
        assert_eq!(a.merge(b), Span::new(4, 20));
        assert_eq!(b.merge(a), Span::new(4, 20));
    }

    #[test]
    fn test_span_into_source_span() {
        let source: miette::SourceSpan = Span::new(3, 8).into();
        assert_eq!(source.offset(), 3);
        assert_eq!(source.len(), 5);
        assert!(Span::default().is_empty());
    }
}
