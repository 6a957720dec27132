//! The top-level driver (§4.7, §7): walks a program's declarations in
//! order, threading the typing context and node registry, and resolves a
//! node-call `ForwardReference` into one of the two diagnostics the
//! top-level pass is responsible for distinguishing.

use tracing::{debug, info, instrument, warn};

use lustre_ast::{ConstDecl, Declaration, NodeDecl, Program, TypeDecl};
use lustre_common::Diagnostic;
use lustre_ident::{FreshCallGen, FreshVarGen, Ident};
use lustre_types::Type;

use crate::assembler::assemble_node;
use crate::context::TypingContext;
use crate::deps::sort_and_analyze;
use crate::error::{ElabError, ElabResult};
use crate::eval::{EvalMode, Evaluator};
use crate::node::{GlobalContext, Node};
use crate::type_expander::fold_type;

/// Elaborate an entire program, in declaration order (§4.7): a node may
/// only call a node declared earlier in the file, so a single left-to-right
/// pass, threading the growing `TypingContext` and `GlobalContext`, is
/// sufficient — no fixpoint iteration is needed.
#[instrument(skip_all)]
pub fn elaborate_program(program: &Program) -> ElabResult<(GlobalContext, Vec<Diagnostic>)> {
    let mut ctx = TypingContext::new();
    let mut nodes: GlobalContext = GlobalContext::default();
    let mut declared_node_names: Vec<String> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for decl in &program.declarations {
        match decl {
            Declaration::Type(type_decl) => elaborate_type_decl(&mut ctx, type_decl)?,
            Declaration::Const(const_decl) => elaborate_const_decl(&mut ctx, const_decl)?,
            Declaration::Node(node_decl) => {
                let node_diagnostics =
                    elaborate_node_decl(&mut ctx, &mut nodes, &declared_node_names, node_decl)?;
                diagnostics.extend(node_diagnostics);
                declared_node_names.push(node_decl.name.as_str().to_string());
            }
        }
    }

    if !diagnostics.is_empty() {
        warn!(count = diagnostics.len(), "elaboration produced warnings");
    }
    info!(node_count = nodes.len(), "elaboration complete");
    Ok((nodes, diagnostics))
}

fn elaborate_type_decl(ctx: &mut TypingContext, decl: &TypeDecl) -> ElabResult<()> {
    debug!(name = decl.name.as_str(), "elaborating type declaration");
    let Some(def) = &decl.def else {
        ctx.declare_free_type(decl.name.clone());
        return Ok(());
    };

    let mut fresh_vars = FreshVarGen::new();
    let mut fresh_calls = FreshCallGen::new();
    let empty_nodes = GlobalContext::default();
    let mut evaluator = Evaluator::new(ctx, &empty_nodes, &mut fresh_vars, &mut fresh_calls, EvalMode::ConstantOnly);
    let leaves = fold_type(ctx, &mut evaluator, def)?;

    if let [(path, ty)] = leaves.as_slice() {
        if path.is_empty() {
            ctx.add_enum_to_context(ty, decl.span)?;
        }
    }
    let base = Ident::new(decl.name.clone());
    for (path, ty) in leaves {
        ctx.declare_type_leaf(base.extend(path), ty);
    }
    Ok(())
}

fn elaborate_const_decl(ctx: &mut TypingContext, decl: &ConstDecl) -> ElabResult<()> {
    debug!(name = decl.name().as_str(), "elaborating const declaration");
    match decl {
        ConstDecl::Free { name, .. } => {
            let ident = Ident::new(name.clone());
            ctx.bind_value_leaf(ident, Type::FreeType(name.clone()));
            Ok(())
        }
        ConstDecl::Untyped { name, value, span } => {
            let leaves = eval_top_level_const(ctx, value)?;
            register_const_leaves(ctx, name, leaves, None, *span)
        }
        ConstDecl::Typed {
            name,
            ty,
            value,
            span,
        } => {
            let mut fresh_vars = FreshVarGen::new();
            let mut fresh_calls = FreshCallGen::new();
            let empty_nodes = GlobalContext::default();
            let mut evaluator =
                Evaluator::new(ctx, &empty_nodes, &mut fresh_vars, &mut fresh_calls, EvalMode::ConstantOnly);
            let declared = fold_type(ctx, &mut evaluator, ty)?;
            let leaves = eval_top_level_const(ctx, value)?;
            register_const_leaves(ctx, name, leaves, Some(declared), *span)
        }
    }
}

fn eval_top_level_const(
    ctx: &TypingContext,
    value: &lustre_ast::Expr,
) -> ElabResult<Vec<(Vec<lustre_ident::Index>, lustre_expr::FlatExpr)>> {
    let mut fresh_vars = FreshVarGen::new();
    let mut fresh_calls = FreshCallGen::new();
    let empty_nodes = GlobalContext::default();
    let mut evaluator = Evaluator::new(ctx, &empty_nodes, &mut fresh_vars, &mut fresh_calls, EvalMode::ConstantOnly);
    evaluator.eval_expr(value)
}

fn register_const_leaves(
    ctx: &mut TypingContext,
    name: &lustre_ident::Symbol,
    leaves: Vec<(Vec<lustre_ident::Index>, lustre_expr::FlatExpr)>,
    declared: Option<Vec<(Vec<lustre_ident::Index>, Type)>>,
    span: lustre_common::Span,
) -> ElabResult<()> {
    let base = Ident::new(name.clone());
    for (path, flat) in leaves {
        if let Some(declared_leaves) = &declared {
            let declared_ty = declared_leaves
                .iter()
                .find(|(p, _)| p.as_slice() == path.as_slice())
                .map(|(_, t)| t.clone())
                .unwrap_or(Type::Bool);
            if !lustre_types::check_type(&flat.ty, &declared_ty) {
                return Err(ElabError::TypeMismatch {
                    expected: format!("{declared_ty:?}"),
                    found: flat.ty.clone(),
                    span,
                });
            }
        }
        let ident = base.extend(path);
        ctx.bind_value_leaf(ident.clone(), flat.ty.clone());
        ctx.insert_const(ident, flat);
    }
    Ok(())
}

fn elaborate_node_decl(
    ctx: &mut TypingContext,
    nodes: &mut GlobalContext,
    declared_so_far: &[String],
    decl: &NodeDecl,
) -> ElabResult<Vec<Diagnostic>> {
    debug!(name = decl.name.as_str(), "elaborating node declaration");
    let (mut node, diagnostics) = match assemble_node(ctx, nodes, decl) {
        Ok(result) => result,
        Err(ElabError::ForwardReference { callee, span }) => {
            return Err(resolve_forward_reference(callee, span, declared_so_far));
        }
        Err(other) => return Err(other),
    };

    sort_and_analyze(&mut node, nodes)?;
    nodes.insert(decl.name.clone(), node);
    Ok(diagnostics)
}

/// Distinguish "calls a node that exists but is declared later in the
/// file" from "calls a node that is never declared at all" (§4.7) — the
/// only place these two diagnostics are told apart.
fn resolve_forward_reference(callee: String, span: lustre_common::Span, declared_so_far: &[String]) -> ElabError {
    if declared_so_far.iter().any(|n| n == &callee) {
        ElabError::ForwardReference { callee, span }
    } else {
        ElabError::Undeclared { name: callee, span }
    }
}
