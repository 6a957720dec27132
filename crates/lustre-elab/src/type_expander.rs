//! `fold_type`: walk a source type expression into a flat list of
//! ⟨index, scalar type⟩ leaves (§4.5).

use lustre_ast::{TypeExpr, TypeExprKind};
use lustre_common::numeric::is_non_negative;
use lustre_common::BigInt;
use lustre_ident::{Ident, Index, Symbol};
use lustre_types::Type;

use crate::context::{IndexedLeaf, TypingContext};
use crate::error::{ElabError, ElabResult};

/// Evaluates an AST expression to a literal integer in constant mode
/// (§4.6 "Constant evaluation"). `fold_type` is generic over this so it does
/// not need to depend on the expression evaluator directly — the evaluator
/// module supplies the real implementation; tests can supply a stub.
pub trait ConstIntEval {
    fn eval_const_int(&mut self, expr: &lustre_ast::Expr) -> ElabResult<BigInt>;
}

/// Walk `type_expr`, applying the type declaration's structural shape and
/// producing one leaf per scalar component, indexed relative to
/// `type_expr`'s own root (the caller is responsible for prefixing these
/// onto whatever identifier is being declared).
pub fn fold_type(
    ctx: &TypingContext,
    eval: &mut dyn ConstIntEval,
    type_expr: &TypeExpr,
) -> ElabResult<Vec<IndexedLeaf>> {
    match &type_expr.kind {
        TypeExprKind::Bool => Ok(vec![(vec![], Type::Bool)]),
        TypeExprKind::Int => Ok(vec![(vec![], Type::Int)]),
        TypeExprKind::Real => Ok(vec![(vec![], Type::Real)]),
        TypeExprKind::IntRange { lo, hi } => {
            let lo = eval.eval_const_int(lo)?;
            let hi = eval.eval_const_int(hi)?;
            let ty = Type::int_range(lo, hi).map_err(|_| ElabError::TypeMismatch {
                expected: "a non-empty integer subrange".to_string(),
                found: Type::Int,
                span: type_expr.span,
            })?;
            Ok(vec![(vec![], ty)])
        }
        TypeExprKind::EnumType(constructors) => {
            let ty = Type::enum_type(constructors.clone()).map_err(|_| ElabError::Redeclaration {
                name: constructors
                    .first()
                    .map(Symbol::as_str)
                    .unwrap_or_default()
                    .to_string(),
                span: type_expr.span,
            })?;
            Ok(vec![(vec![], ty)])
        }
        TypeExprKind::UserType(name) => fold_user_type(ctx, name, type_expr),
        TypeExprKind::RecordType(fields) => {
            let mut leaves = Vec::new();
            for (field_name, field_ty) in fields {
                for (suffix, scalar) in fold_type(ctx, eval, field_ty)? {
                    let mut path = vec![Index::Field(field_name.clone())];
                    path.extend(suffix);
                    leaves.push((path, scalar));
                }
            }
            Ok(leaves)
        }
        TypeExprKind::TupleType(elements) => {
            let mut leaves = Vec::new();
            for (pos, elem_ty) in elements.iter().enumerate() {
                for (suffix, scalar) in fold_type(ctx, eval, elem_ty)? {
                    let mut path = vec![Index::Pos(u32::try_from(pos).unwrap_or(u32::MAX))];
                    path.extend(suffix);
                    leaves.push((path, scalar));
                }
            }
            Ok(leaves)
        }
        TypeExprKind::ArrayType { elem, size } => {
            let size = eval.eval_const_int(size)?;
            if !is_non_negative(&size) {
                return Err(ElabError::TypeMismatch {
                    expected: "a positive array size".to_string(),
                    found: Type::Int,
                    span: type_expr.span,
                });
            }
            let size: u64 = size
                .try_into()
                .map_err(|_| ElabError::TypeMismatch {
                    expected: "a positive array size".to_string(),
                    found: Type::Int,
                    span: type_expr.span,
                })?;
            if size < 1 {
                return Err(ElabError::TypeMismatch {
                    expected: "a positive array size".to_string(),
                    found: Type::Int,
                    span: type_expr.span,
                });
            }
            let elem_leaves = fold_type(ctx, eval, elem)?;
            let mut leaves = Vec::with_capacity(elem_leaves.len() * size as usize);
            for i in 0..size {
                for (suffix, scalar) in &elem_leaves {
                    let mut path = vec![Index::Pos(u32::try_from(i).unwrap_or(u32::MAX))];
                    path.extend(suffix.clone());
                    leaves.push((path, scalar.clone()));
                }
            }
            Ok(leaves)
        }
    }
}

fn fold_user_type(
    ctx: &TypingContext,
    name: &Symbol,
    type_expr: &TypeExpr,
) -> ElabResult<Vec<IndexedLeaf>> {
    let ident = Ident::new(name.clone());
    if let Some(indexed) = ctx.indexed_types.get(&ident) {
        return Ok(indexed.clone());
    }
    if let Some(scalar) = ctx.basic_types.get(&ident) {
        return Ok(vec![(vec![], scalar.clone())]);
    }
    if ctx.free_types.contains(name) {
        return Ok(vec![(vec![], Type::FreeType(name.clone()))]);
    }
    Err(ElabError::Undeclared {
        name: name.as_str().to_string(),
        span: type_expr.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lustre_common::Span;

    struct NoConstEval;
    impl ConstIntEval for NoConstEval {
        fn eval_const_int(&mut self, _expr: &lustre_ast::Expr) -> ElabResult<BigInt> {
            Err(ElabError::ConstantRequired {
                span: Span::synthetic(),
            })
        }
    }

    fn scalar(kind: TypeExprKind) -> TypeExpr {
        TypeExpr::new(kind, Span::synthetic())
    }

    #[test]
    fn scalar_types_produce_a_single_empty_index_leaf() {
        let ctx = TypingContext::new();
        let mut eval = NoConstEval;
        let leaves = fold_type(&ctx, &mut eval, &scalar(TypeExprKind::Bool)).unwrap();
        assert_eq!(leaves, vec![(vec![], Type::Bool)]);
    }

    #[test]
    fn record_type_expands_field_by_field() {
        let ctx = TypingContext::new();
        let mut eval = NoConstEval;
        let record = scalar(TypeExprKind::RecordType(vec![
            (Symbol::new("a"), scalar(TypeExprKind::Int)),
            (Symbol::new("b"), scalar(TypeExprKind::Bool)),
        ]));
        let leaves = fold_type(&ctx, &mut eval, &record).unwrap();
        assert_eq!(
            leaves,
            vec![
                (vec![Index::Field(Symbol::new("a"))], Type::Int),
                (vec![Index::Field(Symbol::new("b"))], Type::Bool),
            ]
        );
    }

    #[test]
    fn undeclared_user_type_is_rejected() {
        let ctx = TypingContext::new();
        let mut eval = NoConstEval;
        let result = fold_type(&ctx, &mut eval, &scalar(TypeExprKind::UserType(Symbol::new("T"))));
        assert!(result.is_err());
    }
}
