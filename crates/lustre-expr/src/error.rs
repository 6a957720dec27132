//! Errors raised by the [`crate::FlatExpr`] smart constructors.
//!
//! These are purely structural: a constructor checks its operands' types
//! against the operator's expected shape and raises `TypeMismatch` on
//! failure. No source span is carried here — the caller (`lustre-elab`)
//! knows the AST node being evaluated and attaches position when turning
//! this into a [`lustre_common::Diagnostic`].

use lustre_types::Type;

#[derive(Clone, Debug, PartialEq)]
pub enum ExprError {
    /// An operand's type did not satisfy the operator's expected shape.
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        found: Type,
    },
    /// The two operands of a binary numeric/relational operator disagree on
    /// type and neither is a subtype of the other.
    OperandMismatch {
        operator: &'static str,
        lhs: Type,
        rhs: Type,
    },
    /// `arrow(a, b)` was constructed from flat expressions of different
    /// types.
    ArrowTypeMismatch { init_ty: Type, step_ty: Type },
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::TypeMismatch {
                operator,
                expected,
                found,
            } => write!(
                f,
                "`{operator}` expects {expected}, found {found:?}"
            ),
            ExprError::OperandMismatch { operator, lhs, rhs } => write!(
                f,
                "`{operator}` operands have incompatible types: {lhs:?} and {rhs:?}"
            ),
            ExprError::ArrowTypeMismatch { init_ty, step_ty } => write!(
                f,
                "`->` branches have incompatible types: {init_ty:?} (init) and {step_ty:?} (step)"
            ),
        }
    }
}

impl std::error::Error for ExprError {}
