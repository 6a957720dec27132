//! Scenario 6 (spec §8): `y = fby(x, 1, 0)` is fatal, carries the position
//! of the construct, and leaves no partial output for the containing node.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
    UnsupportedForm,
};
use lustre_common::Span;
use lustre_elab::{ElabError, elaborate_program};
use lustre_ident::Symbol;

fn ty(kind: TypeExprKind) -> TypeExpr {
    TypeExpr::new(kind, Span::synthetic())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn fby_node() -> NodeDecl {
    NodeDecl {
        name: Symbol::new("uses_fby"),
        params: vec![],
        inputs: vec![Param {
            name: Symbol::new("x"),
            ty: ty(TypeExprKind::Int),
            is_const: false,
            clock: None,
            span: Span::synthetic(),
        }],
        outputs: vec![Param {
            name: Symbol::new("y"),
            ty: ty(TypeExprKind::Int),
            is_const: false,
            clock: None,
            span: Span::synthetic(),
        }],
        locals: vec![],
        contract: Contract::default(),
        body: vec![Statement::Equation {
            lhs: vec![LhsVar {
                name: Symbol::new("y"),
                span: Span::synthetic(),
            }],
            rhs: expr(ExprKind::Unsupported(UnsupportedForm::Fby)),
            span: Span::synthetic(),
        }],
        span: Span::synthetic(),
    }
}

#[test]
fn fby_is_rejected_as_unsupported_with_a_labeled_diagnostic() {
    let program = Program {
        declarations: vec![Declaration::Node(fby_node())],
    };
    let err = elaborate_program(&program).unwrap_err();
    match &err {
        ElabError::Unsupported { construct, .. } => assert_eq!(construct, "Fby operator"),
        other => panic!("expected Unsupported, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Fby operator not implemented");
}

#[test]
fn a_node_that_fails_to_elaborate_is_absent_from_the_registry() {
    let program = Program {
        declarations: vec![Declaration::Node(fby_node())],
    };
    assert!(elaborate_program(&program).is_err());
}
