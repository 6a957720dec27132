//! The parsed-program input to the elaboration core (§6).
//!
//! This crate has no parser of its own — the concrete syntax is out of
//! scope (§1) — it only defines the tree a parser is expected to build and
//! that `lustre-elab` consumes.

pub mod decl;
pub mod expr;
pub mod type_expr;

pub use decl::{
    Contract, ConstDecl, Declaration, LhsVar, LocalDecl, NodeDecl, Param, Program, Statement,
    TypeDecl,
};
pub use expr::{Expr, ExprKind, UnsupportedForm};
pub use type_expr::{TypeExpr, TypeExprKind};
