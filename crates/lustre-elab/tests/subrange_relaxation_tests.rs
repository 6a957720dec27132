//! Scenario 3 (spec §8): `o: subrange[0,10] of int; o = x + 1` with `x: int`
//! widens `o` to `Int` and appends a range property instead of a fatal
//! `TypeMismatch`.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeExpr, TypeExprKind,
};
use lustre_common::{BigInt, Span};
use lustre_elab::elaborate_program;
use lustre_expr::BinaryOp;
use lustre_ident::Symbol;
use lustre_types::Type;

fn ty(kind: TypeExprKind) -> TypeExpr {
    TypeExpr::new(kind, Span::synthetic())
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::synthetic())
}

fn int_lit(n: i64) -> Expr {
    expr(ExprKind::IntLit(BigInt::from(n)))
}

fn subrange_node() -> NodeDecl {
    NodeDecl {
        name: Symbol::new("g"),
        params: vec![],
        inputs: vec![Param {
            name: Symbol::new("x"),
            ty: ty(TypeExprKind::Int),
            is_const: false,
            clock: None,
            span: Span::synthetic(),
        }],
        outputs: vec![Param {
            name: Symbol::new("o"),
            ty: ty(TypeExprKind::IntRange {
                lo: Box::new(int_lit(0)),
                hi: Box::new(int_lit(10)),
            }),
            is_const: false,
            clock: None,
            span: Span::synthetic(),
        }],
        locals: vec![],
        contract: Contract::default(),
        body: vec![Statement::Equation {
            lhs: vec![LhsVar {
                name: Symbol::new("o"),
                span: Span::synthetic(),
            }],
            rhs: expr(ExprKind::Binary(
                BinaryOp::Add,
                Box::new(expr(ExprKind::Ident(Symbol::new("x")))),
                Box::new(int_lit(1)),
            )),
            span: Span::synthetic(),
        }],
        span: Span::synthetic(),
    }
}

#[test]
fn out_of_range_sum_widens_output_and_injects_range_property() {
    let program = Program {
        declarations: vec![Declaration::Node(subrange_node())],
    };
    let (nodes, _diagnostics) = elaborate_program(&program).expect("elaboration should succeed");
    let node = nodes.get(&Symbol::new("g")).expect("node g");

    assert_eq!(node.outputs[0].leaves[0].1, Type::Int);
    assert_eq!(node.equations.len(), 1);
    assert_eq!(node.properties.len(), 1);
    assert_eq!(node.properties[0].ty, Type::Bool);
}
