//! Scenario 2 (spec §8): a record-typed passthrough node flattens to one
//! equation per leaf, with indexes sorted per Open Question 9(a)'s order.

use lustre_ast::{
    Contract, Declaration, Expr, ExprKind, LhsVar, NodeDecl, Param, Program, Statement, TypeDecl, TypeExpr,
    TypeExprKind,
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

fn record_type_decl() -> TypeDecl {
    TypeDecl {
        name: Symbol::new("T"),
        def: Some(ty(TypeExprKind::RecordType(vec![
            (Symbol::new("a"), ty(TypeExprKind::Int)),
            (Symbol::new("b"), ty(TypeExprKind::Bool)),
        ]))),
        span: Span::synthetic(),
    }
}

fn passthrough_record_node() -> NodeDecl {
    NodeDecl {
        name: Symbol::new("f"),
        params: vec![],
        inputs: vec![Param {
            name: Symbol::new("x"),
            ty: ty(TypeExprKind::UserType(Symbol::new("T"))),
            is_const: false,
            clock: None,
            span: Span::synthetic(),
        }],
        outputs: vec![Param {
            name: Symbol::new("y"),
            ty: ty(TypeExprKind::UserType(Symbol::new("T"))),
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

#[test]
fn record_passthrough_flattens_to_one_equation_per_leaf() {
    let program = Program {
        declarations: vec![
            Declaration::Type(record_type_decl()),
            Declaration::Node(passthrough_record_node()),
        ],
    };
    let (nodes, _diagnostics) = elaborate_program(&program).expect("elaboration should succeed");
    let node = nodes.get(&Symbol::new("f")).expect("node f");

    assert_eq!(node.inputs.len(), 1);
    assert_eq!(node.inputs[0].leaves.len(), 2);
    assert_eq!(node.outputs[0].leaves.len(), 2);

    assert_eq!(node.equations.len(), 2);
    let lhs_names: Vec<String> = node.equations.iter().map(|eq| eq.lhs.to_string()).collect();
    assert!(lhs_names.contains(&"y.a".to_string()));
    assert!(lhs_names.contains(&"y.b".to_string()));
}
