//! Source expressions (§4.6), the input to the expression evaluator.
//!
//! Operator vocabulary is shared with the flattened IR (`lustre_expr::ops`):
//! the same `+`, `and`, `<=`, … tokens mean the same thing before and after
//! elaboration, so the AST borrows the enum rather than duplicating it.

use lustre_common::{BigInt, Span};
use lustre_expr::{BinaryOp, UnaryOp};
use lustre_ident::Symbol;

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Ident(Symbol),
    BoolLit(bool),
    IntLit(BigInt),
    RealLit(f64),

    /// `e.field`
    FieldProj(Box<Expr>, Symbol),
    /// `e[index]`, for both tuple and array projection — disambiguated by
    /// the evaluator once `e`'s type is known.
    IndexProj(Box<Expr>, Box<Expr>),

    /// `(e1, e2, ...)` at statement scope — flattened into a tuple (§4.6).
    ExprList(Vec<Expr>),
    /// An explicit tuple constructor.
    TupleCtor(Vec<Expr>),
    /// `[e ; n]`
    ArrayCtor { elem: Box<Expr>, size: Box<Expr> },
    /// `Name { field = e, ... }`
    RecordCtor {
        type_name: Symbol,
        fields: Vec<(Symbol, Expr)>,
    },

    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ite {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    ToInt(Box<Expr>),
    ToReal(Box<Expr>),

    Pre(Box<Expr>),
    Arrow(Box<Expr>, Box<Expr>),

    /// `f(args)`
    Call { callee: Symbol, args: Vec<Expr> },
    /// `condact(c, f, args, defaults)`
    Condact {
        activation: Box<Expr>,
        callee: Symbol,
        args: Vec<Expr>,
        defaults: Vec<Expr>,
    },

    /// A syntactic form the core recognizes but never elaborates (§4.6,
    /// §7 `Unsupported`). Kept as its own variant rather than silently
    /// dropped, so the evaluator can name exactly which construct it saw.
    Unsupported(UnsupportedForm),
}

/// Forms the parser is expected to produce but this core rejects outright
/// (Non-goals, §7 `Unsupported`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnsupportedForm {
    Fby,
    When,
    Current,
    ArraySlice,
    ArrayConcat,
    OneHot,
    With,
    ParametricCall,
}

impl UnsupportedForm {
    /// Human-readable label used verbatim in the "not supported" diagnostic
    /// (§8 scenario 6: `"Fby operator not implemented"`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UnsupportedForm::Fby => "Fby operator",
            UnsupportedForm::When => "When operator",
            UnsupportedForm::Current => "Current operator",
            UnsupportedForm::ArraySlice => "Array slice",
            UnsupportedForm::ArrayConcat => "Array concatenation",
            UnsupportedForm::OneHot => "One-hot operator",
            UnsupportedForm::With => "With expression",
            UnsupportedForm::ParametricCall => "Parametric node call",
        }
    }
}
