//! §8 "Dependency soundness": a node with out-of-order equations is
//! reordered so each equation follows everything it reads, and a node-call
//! result is reachable through the callee's own `output_input_dep` table.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
};
use lustre_common::{BigInt, Span};
use lustre_elab::elaborate_program;
use lustre_expr::BinaryOp;
use lustre_ident::Symbol;

fn ty(kind: TypeExprKind) -> TypeExpr {
    TypeExpr::new(kind, Span::synthetic())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn int_param(name: &str) -> Param {
    Param {
        name: Symbol::new(name),
        ty: ty(TypeExprKind::Int),
        is_const: false,
        clock: None,
        span: Span::synthetic(),
    }
}

fn eq(lhs: &str, rhs: Expr) -> Statement {
    Statement::Equation {
        lhs: vec![LhsVar {
            name: Symbol::new(lhs),
            span: Span::synthetic(),
        }],
        rhs,
        span: Span::synthetic(),
    }
}

/// `out` is declared (written) first but reads `mid`, which is declared
/// second — the assembler must still reorder so `mid`'s equation precedes
/// `out`'s.
fn chain_node() -> NodeDecl {
    let mid_plus_one = expr(ExprKind::Binary(
        BinaryOp::Add,
        Box::new(expr(ExprKind::Ident(Symbol::new("mid")))),
        Box::new(expr(ExprKind::IntLit(BigInt::from(1)))),
    ));
    let x_plus_one = expr(ExprKind::Binary(
        BinaryOp::Add,
        Box::new(expr(ExprKind::Ident(Symbol::new("x")))),
        Box::new(expr(ExprKind::IntLit(BigInt::from(1)))),
    ));
    NodeDecl {
        name: Symbol::new("chain"),
        params: vec![],
        inputs: vec![int_param("x")],
        outputs: vec![int_param("out")],
        locals: vec![lustre_ast::LocalDecl::Var {
            name: Symbol::new("mid"),
            ty: ty(TypeExprKind::Int),
            span: Span::synthetic(),
        }],
        contract: Contract::default(),
        body: vec![eq("out", mid_plus_one), eq("mid", x_plus_one)],
        span: Span::synthetic(),
    }
}

#[test]
fn an_equation_is_reordered_after_what_it_reads() {
    let program = Program {
        declarations: vec![Declaration::Node(chain_node())],
    };
    let (nodes, _diagnostics) = elaborate_program(&program).expect("elaboration should succeed");
    let node = nodes.get(&Symbol::new("chain")).expect("node chain");

    let positions: Vec<String> = node.equations.iter().map(|e| e.lhs.to_string()).collect();
    let mid_pos = positions.iter().position(|n| n == "mid").unwrap();
    let out_pos = positions.iter().position(|n| n == "out").unwrap();
    assert!(mid_pos < out_pos);
}

#[test]
fn a_direct_cycle_is_a_cyclic_dependency_error() {
    let a_reads_b = expr(ExprKind::Ident(Symbol::new("b")));
    let b_reads_a = expr(ExprKind::Ident(Symbol::new("a")));
    let node = NodeDecl {
        name: Symbol::new("cyc"),
        params: vec![],
        inputs: vec![],
        outputs: vec![int_param("a"), int_param("b")],
        locals: vec![],
        contract: Contract::default(),
        body: vec![eq("a", a_reads_b), eq("b", b_reads_a)],
        span: Span::synthetic(),
    };
    let program = Program {
        declarations: vec![Declaration::Node(node)],
    };
    let err = elaborate_program(&program).unwrap_err();
    assert!(matches!(err, lustre_elab::ElabError::CyclicDependency { .. }));
}

/// `wrapper.y` calls `base`, whose single output depends on its single
/// input; `wrapper`'s own `output_input_dep` for `y` must transitively
/// include `wrapper`'s own input `x`.
#[test]
fn a_callers_output_input_dep_sees_through_the_callee() {
    let base = NodeDecl {
        name: Symbol::new("base"),
        params: vec![],
        inputs: vec![int_param("x")],
        outputs: vec![int_param("y")],
        locals: vec![],
        contract: Contract::default(),
        body: vec![eq("y", expr(ExprKind::Ident(Symbol::new("x"))))],
        span: Span::synthetic(),
    };
    let wrapper = NodeDecl {
        name: Symbol::new("wrapper"),
        params: vec![],
        inputs: vec![int_param("x")],
        outputs: vec![int_param("y")],
        locals: vec![],
        contract: Contract::default(),
        body: vec![eq(
            "y",
            expr(ExprKind::Call {
                callee: Symbol::new("base"),
                args: vec![expr(ExprKind::Ident(Symbol::new("x")))],
            }),
        )],
        span: Span::synthetic(),
    };
    let program = Program {
        declarations: vec![Declaration::Node(base), Declaration::Node(wrapper)],
    };
    let (nodes, _diagnostics) = elaborate_program(&program).expect("elaboration should succeed");
    let wrapper_node = nodes.get(&Symbol::new("wrapper")).expect("node wrapper");
    let y_ident = lustre_ident::Ident::new("y");
    let deps = wrapper_node
        .output_input_dep
        .get(&y_ident)
        .expect("output_input_dep entry for y");
    assert!(deps.contains(&lustre_ident::Ident::new("x")));
}
