//! Front-end elaboration core: typing context, type expansion, expression
//! evaluation, node assembly, and dependency analysis.
//!
//! [`driver::elaborate_program`] is the single entry point; everything else
//! in this crate is the machinery it orchestrates.

pub mod assembler;
pub mod context;
pub mod deps;
pub mod driver;
pub mod error;
pub mod eval;
pub mod node;
pub mod residue;
pub mod type_expander;

pub use context::TypingContext;
pub use driver::elaborate_program;
pub use error::{ElabError, ElabResult};
pub use lustre_common::Diagnostic;
pub use eval::{EvalMode, Evaluator};
pub use node::{CallSite, Equation, GlobalContext, InputParam, Node, OutputParam};
pub use residue::{AuxVar, NewCall, Residue};
pub use type_expander::{ConstIntEval, fold_type};
