//! Unconditional simplifications applied at construction time (§3, §4.3):
//! constant folding over numeric/Boolean primitives, and identity laws for
//! Boolean connectives. These run once per instant (init, step) term, never
//! across the init/step pair.

use lustre_common::BigInt;

use crate::ops::{BinaryOp, UnaryOp};
use crate::term::{OrderedF64, Term};

/// Simplify `op(operand)`, folding constants and returning the simplified
/// term. Never fails: an operator applied to a non-constant, non-foldable
/// operand is simply wrapped unchanged.
#[must_use]
pub fn simplify_unary(op: UnaryOp, operand: Term) -> Term {
    match (op, &operand) {
        (UnaryOp::Not, Term::BoolConst(b)) => Term::BoolConst(!b),
        (UnaryOp::Not, Term::Unary(UnaryOp::Not, inner)) => (**inner).clone(),
        (UnaryOp::Neg, Term::IntConst(i)) => Term::IntConst(-i.clone()),
        (UnaryOp::Neg, Term::RealConst(r)) => Term::RealConst(OrderedF64(-r.0)),
        (UnaryOp::Neg, Term::Unary(UnaryOp::Neg, inner)) => (**inner).clone(),
        _ => Term::Unary(op, Box::new(operand)),
    }
}

/// Simplify `lhs op rhs`, folding constants and applying Boolean identity
/// laws (`and`/`or` with a known operand, etc.).
#[must_use]
pub fn simplify_binary(op: BinaryOp, lhs: Term, rhs: Term) -> Term {
    if let Some(folded) = fold_constants(op, &lhs, &rhs) {
        return folded;
    }
    if let Some(identity) = apply_boolean_identity(op, &lhs, &rhs) {
        return identity;
    }
    Term::Binary(op, Box::new(lhs), Box::new(rhs))
}

fn fold_constants(op: BinaryOp, lhs: &Term, rhs: &Term) -> Option<Term> {
    match (lhs, rhs) {
        (Term::IntConst(a), Term::IntConst(b)) => fold_int(op, a, b),
        (Term::RealConst(a), Term::RealConst(b)) => fold_real(op, a.0, b.0),
        (Term::BoolConst(a), Term::BoolConst(b)) => fold_bool(op, *a, *b),
        _ => None,
    }
}

fn fold_int(op: BinaryOp, a: &BigInt, b: &BigInt) -> Option<Term> {
    use num_traits::Zero;
    let result = match op {
        BinaryOp::Add => Term::IntConst(a + b),
        BinaryOp::Sub => Term::IntConst(a - b),
        BinaryOp::Mul => Term::IntConst(a * b),
        BinaryOp::Div if !b.is_zero() => Term::IntConst(a / b),
        BinaryOp::Mod if !b.is_zero() => Term::IntConst(a % b),
        BinaryOp::Lt => Term::BoolConst(a < b),
        BinaryOp::Le => Term::BoolConst(a <= b),
        BinaryOp::Gt => Term::BoolConst(a > b),
        BinaryOp::Ge => Term::BoolConst(a >= b),
        BinaryOp::Eq => Term::BoolConst(a == b),
        BinaryOp::Ne => Term::BoolConst(a != b),
        _ => return None,
    };
    Some(result)
}

fn fold_real(op: BinaryOp, a: f64, b: f64) -> Option<Term> {
    let result = match op {
        BinaryOp::Add => Term::RealConst(OrderedF64(a + b)),
        BinaryOp::Sub => Term::RealConst(OrderedF64(a - b)),
        BinaryOp::Mul => Term::RealConst(OrderedF64(a * b)),
        BinaryOp::Div if b != 0.0 => Term::RealConst(OrderedF64(a / b)),
        BinaryOp::Lt => Term::BoolConst(a < b),
        BinaryOp::Le => Term::BoolConst(a <= b),
        BinaryOp::Gt => Term::BoolConst(a > b),
        BinaryOp::Ge => Term::BoolConst(a >= b),
        BinaryOp::Eq => Term::BoolConst(a == b),
        BinaryOp::Ne => Term::BoolConst(a != b),
        _ => return None,
    };
    Some(result)
}

fn fold_bool(op: BinaryOp, a: bool, b: bool) -> Option<Term> {
    let result = match op {
        BinaryOp::And => a && b,
        BinaryOp::Or => a || b,
        BinaryOp::Xor => a != b,
        BinaryOp::Implies => !a || b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => return None,
    };
    Some(Term::BoolConst(result))
}

fn apply_boolean_identity(op: BinaryOp, lhs: &Term, rhs: &Term) -> Option<Term> {
    match op {
        BinaryOp::And => match (lhs, rhs) {
            (Term::BoolConst(true), other) | (other, Term::BoolConst(true)) => Some(other.clone()),
            (Term::BoolConst(false), _) | (_, Term::BoolConst(false)) => {
                Some(Term::BoolConst(false))
            }
            _ => None,
        },
        BinaryOp::Or => match (lhs, rhs) {
            (Term::BoolConst(false), other) | (other, Term::BoolConst(false)) => {
                Some(other.clone())
            }
            (Term::BoolConst(true), _) | (_, Term::BoolConst(true)) => Some(Term::BoolConst(true)),
            _ => None,
        },
        BinaryOp::Implies => match lhs {
            Term::BoolConst(false) => Some(Term::BoolConst(true)),
            Term::BoolConst(true) => Some(rhs.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Simplify `ite(cond, then_branch, else_branch)` when the condition is a
/// known constant (the whole `ite` collapses to one branch).
#[must_use]
pub fn simplify_ite(cond: Term, then_branch: Term, else_branch: Term) -> Term {
    match cond {
        Term::BoolConst(true) => then_branch,
        Term::BoolConst(false) => else_branch,
        _ => Term::Ite(Box::new(cond), Box::new(then_branch), Box::new(else_branch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_folding_is_closed_under_identical_literals() {
        let folded = simplify_binary(
            BinaryOp::Add,
            Term::IntConst(BigInt::from(2)),
            Term::IntConst(BigInt::from(3)),
        );
        assert_eq!(folded, Term::IntConst(BigInt::from(5)));
    }

    #[test]
    fn and_with_true_reduces_to_other_operand() {
        let x = Term::Var(lustre_ident::Ident::new("x"));
        let folded = simplify_binary(BinaryOp::And, Term::BoolConst(true), x.clone());
        assert_eq!(folded, x);
    }

    #[test]
    fn or_with_false_reduces_to_other_operand() {
        let x = Term::Var(lustre_ident::Ident::new("x"));
        let folded = simplify_binary(BinaryOp::Or, x.clone(), Term::BoolConst(false));
        assert_eq!(folded, x);
    }

    #[test]
    fn division_by_zero_is_not_folded() {
        let folded = simplify_binary(
            BinaryOp::Div,
            Term::IntConst(BigInt::from(1)),
            Term::IntConst(BigInt::from(0)),
        );
        assert!(matches!(folded, Term::Binary(BinaryOp::Div, _, _)));
    }

    #[test]
    fn ite_with_constant_condition_collapses() {
        let folded = simplify_ite(
            Term::BoolConst(true),
            Term::IntConst(BigInt::from(1)),
            Term::IntConst(BigInt::from(2)),
        );
        assert_eq!(folded, Term::IntConst(BigInt::from(1)));
    }
}
