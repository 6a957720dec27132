//! Interned-ish identifier text.
//!
//! A `Symbol` is cheap to clone (`Arc<str>`) and compares by content. There
//! is no global intern table — per §5 the core threads all state explicitly
//! and introduces no global mutable objects, so two `Symbol`s built from the
//! same text are `Eq` but not necessarily pointer-identical.

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Symbol(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(value)
    }
}

impl std::borrow::Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}
