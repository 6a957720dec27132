//! The closed error taxonomy (§7).
//!
//! Every fatal condition is a structured variant rather than a thrown
//! exception, carrying a source position and a human-readable message, so
//! callers can aggregate multiple errors (§9 "Error propagation") instead of
//! unwinding at the first one. `ForwardReference` is kept distinct from
//! `Undeclared` so the top-level driver can resolve it specially (§4.7).

use lustre_common::{Diagnostic, Span};
use lustre_types::Type;

#[derive(Clone, Debug, PartialEq)]
pub enum ElabError {
    /// An identifier, type, enum constant, or reserved prefix was declared
    /// twice, or declared to conflict with an existing binding.
    Redeclaration { name: String, span: Span },
    /// A name was referenced that is not bound in the current typing
    /// context.
    Undeclared { name: String, span: Span },
    /// Includes record-field shape mismatch, operator arity mismatch,
    /// non-Boolean guard/assert/property, and non-subtype assignment
    /// (aside from the `Int -> IntRange` relaxation of §4.8).
    TypeMismatch {
        expected: String,
        found: Type,
        span: Span,
    },
    /// A context demanded a compile-time integer constant and got a
    /// non-constant expression (§4.6 "Constant evaluation").
    ConstantRequired { span: Span },
    /// A syntactic form this core does not elaborate (`fby`, `when`,
    /// `current`, slices, concatenation, clocked I/O, parametric nodes,
    /// recursive `with`, functions).
    Unsupported { construct: String, span: Span },
    /// A call to a node not yet present in the node registry. Caught by the
    /// top-level driver (§4.7), never surfaced directly to the caller of
    /// `eval_expr`.
    ForwardReference { callee: String, span: Span },
    /// The node's equation dependency graph contains a strongly connected
    /// component of size greater than one, or a self-loop outside a `pre`.
    CyclicDependency { cycle: Vec<String>, span: Span },
}

impl ElabError {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            ElabError::Redeclaration { span, .. }
            | ElabError::Undeclared { span, .. }
            | ElabError::TypeMismatch { span, .. }
            | ElabError::ConstantRequired { span }
            | ElabError::Unsupported { span, .. }
            | ElabError::ForwardReference { span, .. }
            | ElabError::CyclicDependency { span, .. } => *span,
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.span(), self.to_string())
    }
}

impl std::fmt::Display for ElabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElabError::Redeclaration { name, .. } => {
                write!(f, "`{name}` is already declared")
            }
            ElabError::Undeclared { name, .. } => write!(f, "`{name}` is not declared"),
            ElabError::TypeMismatch {
                expected, found, ..
            } => write!(f, "expected {expected}, found {found}"),
            ElabError::ConstantRequired { .. } => {
                write!(f, "expression must be a constant integer")
            }
            ElabError::Unsupported { construct, .. } => {
                write!(f, "{construct} not implemented")
            }
            ElabError::ForwardReference { callee, .. } => {
                write!(f, "forward reference to `{callee}`")
            }
            ElabError::CyclicDependency { cycle, .. } => {
                write!(f, "cyclic dependency: {}", cycle.join(" -> "))
            }
        }
    }
}

impl std::error::Error for ElabError {}

pub type ElabResult<T> = Result<T, ElabError>;
