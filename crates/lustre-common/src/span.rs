//! Span - source location tracking for AST nodes and diagnostics.
//!
//! A `Span` points at a single source position, not a byte range: the
//! elaborator only ever needs to report *where* a construct appeared, never
//! to re-slice source text (that is the parser's job, out of scope here).

use serde::{Deserialize, Serialize};

/// A source position, identified by the position's line and column
/// (both 1-indexed, matching how parsers typically report positions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }

    /// A dummy span used for synthetic nodes introduced by the elaborator
    /// itself (fresh variables, fresh call sites) that have no source origin.
    #[must_use]
    pub const fn synthetic() -> Self {
        Span { line: 0, column: 0 }
    }

    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_synthetic() {
            write!(f, "<generated>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// A trait for types that carry a source span.
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
