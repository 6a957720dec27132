//! Scenario 5 (spec §8): a node calling another node declared later in the
//! file aborts with `ForwardReference`, not a generic `Undeclared`.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
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

fn passthrough(name: &str) -> NodeDecl {
    NodeDecl {
        name: Symbol::new(name),
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
            rhs: expr(ExprKind::Ident(Symbol::new("x"))),
            span: Span::synthetic(),
        }],
        span: Span::synthetic(),
    }
}

fn caller(name: &str, callee: &str) -> NodeDecl {
    let mut decl = passthrough(name);
    decl.body = vec![Statement::Equation {
        lhs: vec![LhsVar {
            name: Symbol::new("y"),
            span: Span::synthetic(),
        }],
        rhs: expr(ExprKind::Call {
            callee: Symbol::new(callee),
            args: vec![expr(ExprKind::Ident(Symbol::new("x")))],
        }),
        span: Span::synthetic(),
    }];
    decl
}

#[test]
fn calling_a_node_declared_later_aborts_with_forward_reference() {
    let program = Program {
        declarations: vec![
            Declaration::Node(caller("top", "lower")),
            Declaration::Node(passthrough("lower")),
        ],
    };
    let err = elaborate_program(&program).unwrap_err();
    match err {
        ElabError::ForwardReference { callee, .. } => assert_eq!(callee, "lower"),
        other => panic!("expected ForwardReference, got {other:?}"),
    }
}
