//! The term language underlying a single instant (initial or step) of a
//! flat expression (§3, §4.3).

use lustre_common::BigInt;
use lustre_ident::Ident;

use crate::ops::{BinaryOp, UnaryOp};

/// A term closed under variables, constants and the primitive operators.
/// `Term` never appears by itself — it is always one half (init or step) of
/// a [`crate::FlatExpr`].
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    BoolConst(bool),
    IntConst(BigInt),
    RealConst(OrderedF64),
    /// A base-clock variable reference, including enum constants bound in
    /// the typing context.
    Var(Ident),
    Unary(UnaryOp, Box<Term>),
    Binary(BinaryOp, Box<Term>, Box<Term>),
    Ite(Box<Term>, Box<Term>, Box<Term>),
    /// `pre v`: the previous-instant value of a variable. Only ever
    /// constructed over a variable, never an arbitrary term (§4.3) — the
    /// evaluator is responsible for abstracting non-variable arguments to a
    /// fresh equation before calling [`crate::FlatExpr::pre`].
    Pre(Ident),
    ToInt(Box<Term>),
    ToReal(Box<Term>),
    /// The value at this instant is unconstrained. Produced only as the
    /// initial-instant term of an unguarded `pre` (§4.3); never appears as a
    /// step term.
    Undefined,
}

impl Term {
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Term::BoolConst(_) | Term::IntConst(_) | Term::RealConst(_)
        )
    }
}

/// A thin `f64` wrapper with a total order, so `Term` can derive `PartialEq`
/// (real-number equality is exact here: two literals are equal iff parsed
/// from bit-identical values, never compared by runtime semantics).
#[derive(Clone, Copy, Debug)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::BoolConst(b) => write!(f, "{b}"),
            Term::IntConst(i) => write!(f, "{i}"),
            Term::RealConst(r) => write!(f, "{}", r.0),
            Term::Var(id) => write!(f, "{id}"),
            Term::Unary(op, e) => write!(f, "{op}({e})"),
            Term::Binary(op, a, b) => write!(f, "({a} {op} {b})"),
            Term::Ite(c, a, b) => write!(f, "ite({c}, {a}, {b})"),
            Term::Pre(id) => write!(f, "pre({id})"),
            Term::ToInt(e) => write!(f, "to_int({e})"),
            Term::ToReal(e) => write!(f, "to_real({e})"),
            Term::Undefined => write!(f, "<undefined>"),
        }
    }
}
