//! Diagnostic types shared by every elaboration phase.
//!
//! Unlike `tsz`'s diagnostics, there is no fixed numeric-code catalogue here
//! (`spec.md` §7 defines a closed, small taxonomy of error *kinds* instead of
//! thousands of message templates), so a diagnostic is just a kind, a
//! message and a span.

use serde::Serialize;

use crate::span::Span;

/// Severity of a diagnostic. The core itself only ever produces `Error` and
/// `Warning` (the unguarded-`pre` condition of §4.3 is the only warning).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A diagnostic message with its source position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            span,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {label}: {}", self.span, self.message)
    }
}
