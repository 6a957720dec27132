//! The flat two-state expression normal form (§3, §4.3): every Lustre
//! expression elaborates to a pair of terms, one for the initial instant and
//! one for every later step, plus the set of variables the step term reads
//! through `pre`.

use rustc_hash::FxHashSet;
use tracing::trace;

use lustre_common::BigInt;
use lustre_ident::Ident;
use lustre_types::{Type, check_type};

use crate::error::ExprError;
use crate::ops::{BinaryOp, UnaryOp};
use crate::simplify::{simplify_binary, simplify_ite, simplify_unary};
use crate::term::{OrderedF64, Term};

/// A single Lustre expression in flattened, two-state normal form. Smart
/// constructors are the only way to build one: they compute the result type,
/// constant-fold, and apply Boolean identity laws, so every live `FlatExpr`
/// is already in the simplified shape a later dependency pass expects.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatExpr {
    pub ty: Type,
    pub init: Term,
    pub step: Term,
    /// Variables the step term reaches through `pre`, collected so the
    /// dependency analyzer (§4.9) can tell a `pre`-guarded read from a
    /// same-instant one.
    pub pre_vars: FxHashSet<Ident>,
}

impl FlatExpr {
    #[must_use]
    pub fn bool_const(value: bool) -> FlatExpr {
        FlatExpr {
            ty: Type::Bool,
            init: Term::BoolConst(value),
            step: Term::BoolConst(value),
            pre_vars: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn int_const(value: BigInt) -> FlatExpr {
        FlatExpr {
            ty: Type::Int,
            init: Term::IntConst(value.clone()),
            step: Term::IntConst(value),
            pre_vars: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn real_const(value: f64) -> FlatExpr {
        FlatExpr {
            ty: Type::Real,
            init: Term::RealConst(OrderedF64(value)),
            step: Term::RealConst(OrderedF64(value)),
            pre_vars: FxHashSet::default(),
        }
    }

    /// A same-instant reference to a base-clock variable.
    #[must_use]
    pub fn var_ref(ident: Ident, ty: Type) -> FlatExpr {
        FlatExpr {
            ty,
            init: Term::Var(ident.clone()),
            step: Term::Var(ident),
            pre_vars: FxHashSet::default(),
        }
    }

    pub fn neg(operand: FlatExpr) -> Result<FlatExpr, ExprError> {
        if !matches!(operand.ty, Type::Int | Type::IntRange(_, _) | Type::Real) {
            return Err(ExprError::TypeMismatch {
                operator: "-",
                expected: "a numeric type",
                found: operand.ty,
            });
        }
        Ok(FlatExpr {
            ty: operand.ty,
            init: simplify_unary(UnaryOp::Neg, operand.init),
            step: simplify_unary(UnaryOp::Neg, operand.step),
            pre_vars: operand.pre_vars,
        })
    }

    pub fn not(operand: FlatExpr) -> Result<FlatExpr, ExprError> {
        if operand.ty != Type::Bool {
            return Err(ExprError::TypeMismatch {
                operator: "not",
                expected: "bool",
                found: operand.ty,
            });
        }
        Ok(FlatExpr {
            ty: Type::Bool,
            init: simplify_unary(UnaryOp::Not, operand.init),
            step: simplify_unary(UnaryOp::Not, operand.step),
            pre_vars: operand.pre_vars,
        })
    }

    pub fn arithmetic(op: BinaryOp, lhs: FlatExpr, rhs: FlatExpr) -> Result<FlatExpr, ExprError> {
        debug_assert!(op.is_arithmetic());
        let ty = unify_numeric(op, &lhs.ty, &rhs.ty)?;
        Ok(Self::combine_binary(op, ty, lhs, rhs))
    }

    pub fn relational(op: BinaryOp, lhs: FlatExpr, rhs: FlatExpr) -> Result<FlatExpr, ExprError> {
        debug_assert!(op.is_relational());
        let _ = unify_numeric(op, &lhs.ty, &rhs.ty).or_else(|_| {
            if lhs.ty == rhs.ty {
                Ok(lhs.ty.clone())
            } else {
                Err(ExprError::OperandMismatch {
                    operator: op_label(op),
                    lhs: lhs.ty.clone(),
                    rhs: rhs.ty.clone(),
                })
            }
        })?;
        Ok(Self::combine_binary(op, Type::Bool, lhs, rhs))
    }

    pub fn boolean(op: BinaryOp, lhs: FlatExpr, rhs: FlatExpr) -> Result<FlatExpr, ExprError> {
        debug_assert!(op.is_boolean());
        if lhs.ty != Type::Bool {
            return Err(ExprError::TypeMismatch {
                operator: op_label(op),
                expected: "bool",
                found: lhs.ty,
            });
        }
        if rhs.ty != Type::Bool {
            return Err(ExprError::TypeMismatch {
                operator: op_label(op),
                expected: "bool",
                found: rhs.ty,
            });
        }
        Ok(Self::combine_binary(op, Type::Bool, lhs, rhs))
    }

    fn combine_binary(op: BinaryOp, ty: Type, lhs: FlatExpr, rhs: FlatExpr) -> FlatExpr {
        let mut pre_vars = lhs.pre_vars;
        pre_vars.extend(rhs.pre_vars);
        FlatExpr {
            ty,
            init: simplify_binary(op, lhs.init, rhs.init),
            step: simplify_binary(op, lhs.step, rhs.step),
            pre_vars,
        }
    }

    pub fn ite(cond: FlatExpr, then_branch: FlatExpr, else_branch: FlatExpr) -> Result<FlatExpr, ExprError> {
        if cond.ty != Type::Bool {
            return Err(ExprError::TypeMismatch {
                operator: "if",
                expected: "bool",
                found: cond.ty,
            });
        }
        let ty = if check_type(&then_branch.ty, &else_branch.ty) {
            else_branch.ty.clone()
        } else if check_type(&else_branch.ty, &then_branch.ty) {
            then_branch.ty.clone()
        } else {
            return Err(ExprError::OperandMismatch {
                operator: "if",
                lhs: then_branch.ty.clone(),
                rhs: else_branch.ty.clone(),
            });
        };
        let mut pre_vars = cond.pre_vars;
        pre_vars.extend(then_branch.pre_vars);
        pre_vars.extend(else_branch.pre_vars);
        Ok(FlatExpr {
            ty,
            init: simplify_ite(cond.init, then_branch.init, else_branch.init),
            step: simplify_ite(cond.step, then_branch.step, else_branch.step),
            pre_vars,
        })
    }

    /// `pre ident`: the previous-instant value of a base-clock variable.
    /// Restricted to a bare [`Ident`] (§4.3) — abstracting `pre` of a
    /// compound expression to a fresh auxiliary equation is the evaluator's
    /// job, not this constructor's.
    #[must_use]
    pub fn pre(ident: Ident, ty: Type) -> FlatExpr {
        trace!(ident = %ident, "constructing pre");
        let mut pre_vars = FxHashSet::default();
        pre_vars.insert(ident.clone());
        FlatExpr {
            ty,
            init: Term::Undefined,
            step: Term::Pre(ident),
            pre_vars,
        }
    }

    /// `a -> b`: `⟨a.init, b.step⟩` (§3, §4.3). Operates at the `FlatExpr`
    /// level, not as a `Term` variant — the arrow never appears inside a
    /// single instant's term.
    pub fn arrow(a: FlatExpr, b: FlatExpr) -> Result<FlatExpr, ExprError> {
        if !check_type(&a.ty, &b.ty) && !check_type(&b.ty, &a.ty) {
            return Err(ExprError::ArrowTypeMismatch {
                init_ty: a.ty,
                step_ty: b.ty,
            });
        }
        let ty = if check_type(&a.ty, &b.ty) { b.ty.clone() } else { a.ty.clone() };
        let mut pre_vars = a.pre_vars;
        pre_vars.extend(b.pre_vars);
        trace!(pre_var_count = pre_vars.len(), "constructing arrow");
        Ok(FlatExpr {
            ty,
            init: a.init,
            step: b.step,
            pre_vars,
        })
    }

    pub fn to_int(operand: FlatExpr) -> Result<FlatExpr, ExprError> {
        if operand.ty != Type::Real {
            return Err(ExprError::TypeMismatch {
                operator: "int",
                expected: "real",
                found: operand.ty,
            });
        }
        Ok(FlatExpr {
            ty: Type::Int,
            init: Term::ToInt(Box::new(operand.init)),
            step: Term::ToInt(Box::new(operand.step)),
            pre_vars: operand.pre_vars,
        })
    }

    pub fn to_real(operand: FlatExpr) -> Result<FlatExpr, ExprError> {
        if !operand.ty.is_int_like() {
            return Err(ExprError::TypeMismatch {
                operator: "real",
                expected: "an integer type",
                found: operand.ty,
            });
        }
        Ok(FlatExpr {
            ty: Type::Real,
            init: Term::ToReal(Box::new(operand.init)),
            step: Term::ToReal(Box::new(operand.step)),
            pre_vars: operand.pre_vars,
        })
    }
}

fn op_label(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "mod",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "=",
        BinaryOp::Ne => "<>",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
        BinaryOp::Xor => "xor",
        BinaryOp::Implies => "=>",
    }
}

/// Resolve the common numeric type of a binary arithmetic/relational
/// operator's operands: the narrower must widen to the wider (§4.2's
/// subtype lattice), and `mod` additionally requires both sides integral.
fn unify_numeric(op: BinaryOp, lhs: &Type, rhs: &Type) -> Result<Type, ExprError> {
    let numeric = |t: &Type| matches!(t, Type::Int | Type::IntRange(_, _) | Type::Real);
    if !numeric(lhs) {
        return Err(ExprError::TypeMismatch {
            operator: op_label(op),
            expected: "a numeric type",
            found: lhs.clone(),
        });
    }
    if !numeric(rhs) {
        return Err(ExprError::TypeMismatch {
            operator: op_label(op),
            expected: "a numeric type",
            found: rhs.clone(),
        });
    }
    if op == BinaryOp::Mod && (!lhs.is_int_like() || !rhs.is_int_like()) {
        return Err(ExprError::OperandMismatch {
            operator: op_label(op),
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
    }
    if check_type(lhs, rhs) {
        return Ok(rhs.clone());
    }
    if check_type(rhs, lhs) {
        return Ok(lhs.clone());
    }
    Err(ExprError::OperandMismatch {
        operator: op_label(op),
        lhs: lhs.clone(),
        rhs: rhs.clone(),
    })
}
