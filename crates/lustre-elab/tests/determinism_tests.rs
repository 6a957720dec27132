//! §8 "Determinism": two elaborations of structurally equal ASTs produce
//! structurally equal outputs, including fresh identifier numbering and
//! equation ordering.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
};
use lustre_common::Span;
use lustre_elab::elaborate_program;
use lustre_ident::Symbol;

fn ty(kind: TypeExprKind) -> TypeExpr {
    TypeExpr::new(kind, Span::synthetic())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn program_with_a_pre_of_a_sum() -> Program {
    let sum = expr(ExprKind::Binary(
        lustre_expr::BinaryOp::Add,
        Box::new(expr(ExprKind::Ident(Symbol::new("a")))),
        Box::new(expr(ExprKind::Ident(Symbol::new("b")))),
    ));
    let node = NodeDecl {
        name: Symbol::new("h"),
        params: vec![],
        inputs: vec![
            Param {
                name: Symbol::new("a"),
                ty: ty(TypeExprKind::Int),
                is_const: false,
                clock: None,
                span: Span::synthetic(),
            },
            Param {
                name: Symbol::new("b"),
                ty: ty(TypeExprKind::Int),
                is_const: false,
                clock: None,
                span: Span::synthetic(),
            },
        ],
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
            rhs: expr(ExprKind::Pre(Box::new(sum))),
            span: Span::synthetic(),
        }],
        span: Span::synthetic(),
    };
    Program {
        declarations: vec![Declaration::Node(node)],
    }
}

#[test]
fn elaborating_the_same_program_twice_yields_structurally_equal_nodes() {
    let program = program_with_a_pre_of_a_sum();
    let (first, first_diagnostics) = elaborate_program(&program).expect("first elaboration should succeed");
    let (second, second_diagnostics) = elaborate_program(&program).expect("second elaboration should succeed");

    let first_node = first.get(&Symbol::new("h")).expect("node h");
    let second_node = second.get(&Symbol::new("h")).expect("node h");
    assert_eq!(first_node, second_node);
    assert_eq!(first_diagnostics, second_diagnostics);
}
