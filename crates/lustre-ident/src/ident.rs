//! Identifier & index algebra (§4.1).
//!
//! An [`Ident`] is a base [`Symbol`] plus an ordered list of index steps.
//! Indexes compose by appending steps; identifiers are value objects
//! compared by base and full path, never mutated in place.

use smallvec::SmallVec;

use crate::Symbol;

/// Reserved base name for auxiliary variables introduced by `pre`
/// abstraction (§4.1, §4.3, §4.6). Never user-declarable.
pub const AUX_BASE: &str = "__abs";

/// Reserved field name used to build node-call result identifiers:
/// `callee.__returns.k` (§4.1, §4.7).
pub const RETURNS_FIELD: &str = "__returns";

/// A single step in an identifier's index path.
///
/// Open Question 9(a): the source mixes named and integer indexes without
/// documenting a total order. This implementation defines one explicitly: at
/// a given path position, a [`Index::Field`] step always orders before any
/// [`Index::Pos`] step (so record-before-tuple/array is stable regardless of
/// field name or position value); within the same variant, fields compare by
/// name and positions by value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Index {
    /// A named field, e.g. the `.a` in `x.a`.
    Field(Symbol),
    /// A zero-based integer position, e.g. the `[0]` in a tuple or array.
    Pos(u32),
    /// An embedded identifier, used when a projection index is itself a
    /// named enum constant or constant identifier rather than a literal.
    Ident(Symbol),
}

impl Index {
    fn order_key(&self) -> (u8, &str, u32) {
        match self {
            Index::Field(s) => (0, s.as_str(), 0),
            Index::Ident(s) => (1, s.as_str(), 0),
            Index::Pos(p) => (2, "", *p),
        }
    }
}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Index {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Index::Field(s) | Index::Ident(s) => write!(f, ".{s}"),
            Index::Pos(p) => write!(f, "[{p}]"),
        }
    }
}

/// A fully-qualified, path-structured identifier: a base symbol plus an
/// ordered index path. Two identifiers are equal iff their base and full
/// index path coincide element-wise (§3).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ident {
    base: Symbol,
    path: SmallVec<[Index; 4]>,
}

impl Ident {
    #[must_use]
    pub fn new(base: impl Into<Symbol>) -> Self {
        Ident {
            base: base.into(),
            path: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_path(base: impl Into<Symbol>, path: impl IntoIterator<Item = Index>) -> Self {
        Ident {
            base: base.into(),
            path: path.into_iter().collect(),
        }
    }

    /// Push a single step to the back of the path, returning a new
    /// identifier (identifiers are value objects; there is no mutation).
    #[must_use]
    pub fn push(&self, step: Index) -> Self {
        let mut path = self.path.clone();
        path.push(step);
        Ident {
            base: self.base.clone(),
            path,
        }
    }

    /// Push a sequence of steps at once.
    #[must_use]
    pub fn extend(&self, steps: impl IntoIterator<Item = Index>) -> Self {
        let mut path = self.path.clone();
        path.extend(steps);
        Ident {
            base: self.base.clone(),
            path,
        }
    }

    /// Split into base and suffix path.
    #[must_use]
    pub fn split(&self) -> (&Symbol, &[Index]) {
        (&self.base, &self.path)
    }

    #[must_use]
    pub fn base(&self) -> &Symbol {
        &self.base
    }

    #[must_use]
    pub fn path(&self) -> &[Index] {
        &self.path
    }

    /// True if `self` is a strict ancestor of `other`: same base, and
    /// `self`'s path is a proper prefix of `other`'s path.
    #[must_use]
    pub fn is_proper_prefix_of(&self, other: &Ident) -> bool {
        self.base == other.base
            && self.path.len() < other.path.len()
            && self.path[..] == other.path[..self.path.len()]
    }

    /// All proper prefixes of this identifier's path, from the bare base up
    /// to (not including) the full identifier itself, used by
    /// `add_to_prefix_map` (§4.4) to materialize prefix tries.
    #[must_use]
    pub fn proper_prefixes(&self) -> Vec<Ident> {
        (0..self.path.len())
            .map(|len| Ident::with_path(self.base.clone(), self.path[..len].iter().cloned()))
            .collect()
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.base
            .as_str()
            .cmp(other.base.as_str())
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        for step in &self.path {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// True if `name` is a reserved elaborator prefix (`__abs` or `__returns`)
/// that a user-declared identifier may never collide with (§3 invariant).
#[must_use]
pub fn is_reserved_base(name: &str) -> bool {
    name == AUX_BASE || name == RETURNS_FIELD
}
