//! Abstraction residue (§9 "Residue accumulators `(new_vars, new_calls)`").
//!
//! The evaluator never mutates node state directly — each call returns its
//! result alongside a `Residue` describing what must be folded into the
//! node's locals and call list. The node assembler folds residues after
//! each top-level statement, never mid-expression, so the evaluator cannot
//! observe its own abstraction side effects.

use lustre_ident::Ident;
use lustre_types::Type;

use crate::node::CallSite;

/// A fresh auxiliary variable introduced by `pre`-abstraction (§4.3, §4.6),
/// together with the equation that defines it.
#[derive(Clone, Debug, PartialEq)]
pub struct AuxVar {
    pub ident: Ident,
    pub ty: Type,
    pub value: lustre_expr::FlatExpr,
}

/// A node-call abstracted out of an expression (§4.7), together with the
/// `(ident, type)` pairs its bound outputs must be registered as locals
/// under.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCall {
    pub site: CallSite,
    pub output_locals: Vec<(Ident, Type)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Residue {
    pub new_vars: Vec<AuxVar>,
    pub new_calls: Vec<NewCall>,
}

impl Residue {
    #[must_use]
    pub fn new() -> Self {
        Residue::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_vars.is_empty() && self.new_calls.is_empty()
    }
}
