//! Fresh-identifier generators (§4.1, design note in §9).
//!
//! The source manufactures `__abs.k` and `callee.__returns.k` from
//! module-level mutable counters. This implementation confines each counter
//! to a small generator object threaded explicitly through the per-node
//! assembler (never a global), and resets it per node.

use rustc_hash::FxHashMap;

use crate::ident::{AUX_BASE, Index, RETURNS_FIELD};
use crate::{Ident, Symbol};

/// Generates fresh auxiliary-variable identifiers `__abs.0`, `__abs.1`, ...
/// One instance is created per node and discarded once the node is
/// assembled; successive requests are guaranteed distinct within that
/// instance's lifetime.
#[derive(Debug, Default)]
pub struct FreshVarGen {
    next: u32,
}

impl FreshVarGen {
    #[must_use]
    pub fn new() -> Self {
        FreshVarGen { next: 0 }
    }

    /// Allocate the next `__abs.k` identifier.
    pub fn next_ident(&mut self) -> Ident {
        let k = self.next;
        self.next += 1;
        Ident::new(AUX_BASE).push(Index::Pos(k))
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// Generates fresh node-call identifiers, keyed by callee name so that call
/// sites into the same callee receive `callee.__returns.0`,
/// `callee.__returns.1`, ... Reset per caller node.
#[derive(Debug, Default)]
pub struct FreshCallGen {
    per_callee: FxHashMap<Symbol, u32>,
}

impl FreshCallGen {
    #[must_use]
    pub fn new() -> Self {
        FreshCallGen {
            per_callee: FxHashMap::default(),
        }
    }

    /// Allocate the next `callee.__returns.k` identifier for `callee`.
    pub fn next_ident(&mut self, callee: &Symbol) -> Ident {
        let counter = self.per_callee.entry(callee.clone()).or_insert(0);
        let k = *counter;
        *counter += 1;
        Ident::new(callee.clone())
            .push(Index::Field(Symbol::new(RETURNS_FIELD)))
            .push(Index::Pos(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_fresh_vars_are_distinct() {
        let mut gen = FreshVarGen::new();
        let a = gen.next_ident();
        let b = gen.next_ident();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "__abs[0]");
        assert_eq!(b.to_string(), "__abs[1]");
    }

    #[test]
    fn call_idents_are_keyed_per_callee() {
        let mut gen = FreshCallGen::new();
        let f = Symbol::new("f");
        let g = Symbol::new("g");
        let f0 = gen.next_ident(&f);
        let g0 = gen.next_ident(&g);
        let f1 = gen.next_ident(&f);
        assert_eq!(f0.to_string(), "f.__returns[0]");
        assert_eq!(g0.to_string(), "g.__returns[0]");
        assert_eq!(f1.to_string(), "f.__returns[1]");
    }
}
