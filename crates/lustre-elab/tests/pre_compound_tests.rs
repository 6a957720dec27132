//! Scenario 4 (spec §8): `y = pre (a + b)` abstracts the non-variable
//! operand of `pre` into a fresh auxiliary equation.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
};
use lustre_common::Span;
use lustre_elab::elaborate_program;
use lustre_expr::Term;
use lustre_ident::Symbol;

fn ty(kind: TypeExprKind) -> TypeExpr {
    TypeExpr::new(kind, Span::synthetic())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn pre_sum_node() -> NodeDecl {
    let sum = expr(ExprKind::Binary(
        lustre_expr::BinaryOp::Add,
        Box::new(expr(ExprKind::Ident(Symbol::new("a")))),
        Box::new(expr(ExprKind::Ident(Symbol::new("b")))),
    ));
    NodeDecl {
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
    }
}

#[test]
fn pre_of_a_sum_introduces_one_fresh_auxiliary_equation() {
    let program = Program {
        declarations: vec![Declaration::Node(pre_sum_node())],
    };
    let (nodes, diagnostics) = elaborate_program(&program).expect("elaboration should succeed");
    let node = nodes.get(&Symbol::new("h")).expect("node h");

    // `pre (a + b)` sits under no enclosing `->`, so it is reported as an
    // unguarded `pre` even though elaboration itself succeeds.
    assert_eq!(diagnostics.len(), 1);

    // One equation defines the aux var from `a + b`, one defines `y` from
    // `pre` of that aux var.
    assert_eq!(node.equations.len(), 2);

    let y_eq = node
        .equations
        .iter()
        .find(|eq| eq.lhs.to_string() == "y")
        .expect("y equation present");
    let Term::Pre(pre_target) = &y_eq.rhs.step else {
        panic!("expected y's step term to be Pre(_), got {:?}", y_eq.rhs.step);
    };

    let aux_eq = node
        .equations
        .iter()
        .find(|eq| &eq.lhs == pre_target)
        .expect("aux equation defining the pre'd identifier");
    assert!(matches!(aux_eq.rhs.step, Term::Binary(lustre_expr::BinaryOp::Add, _, _)));
    assert!(aux_eq.lhs.base().as_str().starts_with("__abs"));
}
