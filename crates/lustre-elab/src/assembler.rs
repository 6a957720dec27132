//! The node assembler (§4.8): orchestrates input/output/contract/local/body
//! elaboration and maintains per-node state.

use rustc_hash::FxHashMap;

use lustre_ast::{LocalDecl, NodeDecl, Param, Statement};
use lustre_common::{Diagnostic, Span};
use lustre_expr::{BinaryOp, FlatExpr};
use lustre_ident::{FreshCallGen, FreshVarGen, Ident, Index, Symbol, is_reserved_base};
use lustre_types::{Type, check_type};

use crate::context::TypingContext;
use crate::error::{ElabError, ElabResult};
use crate::eval::{EvalMode, Evaluator};
use crate::node::{GlobalContext, InputParam, Node, OutputParam};
use crate::residue::Residue;
use crate::type_expander::fold_type;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VarRole {
    Input,
    Output,
    Local,
}

#[derive(Clone, Debug)]
struct NodeVarInfo {
    role: VarRole,
    leaves: Vec<crate::node::ParamLeaf>,
}

/// Per-node elaboration state threaded through the five body-statement
/// handlers below.
struct Assembly<'a> {
    ctx: TypingContext,
    nodes: &'a GlobalContext,
    fresh_vars: FreshVarGen,
    fresh_calls: FreshCallGen,
    node: Node,
    vars: FxHashMap<Symbol, NodeVarInfo>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Assembly<'a> {
    fn declare(&mut self, name: &Symbol, span: Span) -> ElabResult<()> {
        if is_reserved_base(name.as_str()) || self.vars.contains_key(name) {
            return Err(ElabError::Redeclaration {
                name: name.as_str().to_string(),
                span,
            });
        }
        Ok(())
    }

    fn evaluator(&mut self, mode: EvalMode) -> Evaluator<'_> {
        Evaluator::new(&self.ctx, self.nodes, &mut self.fresh_vars, &mut self.fresh_calls, mode)
    }

    /// Fold an evaluator's abstraction residue into the node's locals and
    /// call list (§9 "Residue accumulators"): the evaluator never does this
    /// itself so it never observes its own side effects mid-expression.
    fn fold_residue(&mut self, residue: Residue) {
        if residue.is_empty() {
            return;
        }
        for aux in residue.new_vars {
            self.ctx.bind_value_leaf(aux.ident.clone(), aux.ty.clone());
            self.node.locals.insert(aux.ident.clone());
            self.node.equations.push(crate::node::Equation {
                lhs: aux.ident,
                rhs: aux.value,
            });
        }
        for call in residue.new_calls {
            for (ident, ty) in &call.output_locals {
                self.ctx.bind_value_leaf(ident.clone(), ty.clone());
                self.node.locals.insert(ident.clone());
            }
            self.node.calls.push(call.site);
        }
    }

    fn eval_scalar_bool(&mut self, expr: &lustre_ast::Expr) -> ElabResult<FlatExpr> {
        let mut evaluator = self.evaluator(EvalMode::Normal);
        let mut leaves = evaluator.eval_expr(expr)?;
        let residue = std::mem::take(&mut evaluator.residue);
        self.fold_residue(residue);
        self.diagnostics.append(&mut evaluator.diagnostics);
        if leaves.len() != 1 || leaves[0].1.ty != Type::Bool {
            return Err(ElabError::TypeMismatch {
                expected: "a scalar bool".to_string(),
                found: leaves
                    .first()
                    .map(|(_, f)| f.ty.clone())
                    .unwrap_or(Type::Bool),
                span: expr.span,
            });
        }
        Ok(leaves.remove(0).1)
    }

    fn declare_param(&mut self, param: &Param, role: VarRole) -> ElabResult<()> {
        if param.clock.is_some() {
            return Err(ElabError::Unsupported {
                construct: "clocked input".to_string(),
                span: param.span,
            });
        }
        self.declare(&param.name, param.span)?;
        let leaves = {
            let mut evaluator = self.evaluator(EvalMode::ConstantOnly);
            let ctx_ref = evaluator.ctx;
            fold_type(ctx_ref, &mut evaluator, &param.ty)?
        };
        let base = Ident::new(param.name.clone());
        for (path, ty) in &leaves {
            self.ctx
                .bind_value_leaf(base.extend(path.iter().cloned()), ty.clone());
        }
        match role {
            VarRole::Input => self.node.inputs.push(InputParam {
                name: param.name.clone(),
                leaves: leaves.clone(),
                is_const: param.is_const,
            }),
            VarRole::Output => {
                self.node.outputs.push(OutputParam {
                    name: param.name.clone(),
                    leaves: leaves.clone(),
                });
            }
            VarRole::Local => unreachable!("parameters are never locals"),
        }
        self.vars
            .insert(param.name.clone(), NodeVarInfo { role, leaves });
        Ok(())
    }

    fn declare_local(&mut self, local: &LocalDecl) -> ElabResult<()> {
        match local {
            LocalDecl::Var { name, ty, span } => {
                self.declare(name, *span)?;
                let leaves = {
                    let mut evaluator = self.evaluator(EvalMode::ConstantOnly);
                    let ctx_ref = evaluator.ctx;
                    fold_type(ctx_ref, &mut evaluator, ty)?
                };
                let base = Ident::new(name.clone());
                for (path, leaf_ty) in &leaves {
                    let ident = base.extend(path.iter().cloned());
                    self.ctx.bind_value_leaf(ident.clone(), leaf_ty.clone());
                    self.node.locals.insert(ident);
                }
                self.vars.insert(
                    name.clone(),
                    NodeVarInfo {
                        role: VarRole::Local,
                        leaves,
                    },
                );
            }
            LocalDecl::Const {
                name,
                ty,
                value,
                span,
            } => {
                self.declare(name, *span)?;

                let declared_leaves = match ty {
                    Some(declared_ty) => {
                        let mut evaluator = self.evaluator(EvalMode::ConstantOnly);
                        let ctx_ref = evaluator.ctx;
                        Some(fold_type(ctx_ref, &mut evaluator, declared_ty)?)
                    }
                    None => None,
                };

                let mut evaluator = self.evaluator(EvalMode::ConstantOnly);
                let leaves = evaluator.eval_expr(value)?;

                let base = Ident::new(name.clone());
                let mut recorded = Vec::with_capacity(leaves.len());
                for (path, flat) in leaves {
                    if let Some(declared) = &declared_leaves {
                        let declared_ty = declared
                            .iter()
                            .find(|(p, _)| *p == path)
                            .map(|(_, t)| t.clone())
                            .unwrap_or(Type::Bool);
                        if !check_type(&flat.ty, &declared_ty) {
                            return Err(ElabError::TypeMismatch {
                                expected: format!("{declared_ty:?}"),
                                found: flat.ty.clone(),
                                span: *span,
                            });
                        }
                    }
                    let ident = base.extend(path.iter().cloned());
                    self.ctx.bind_value_leaf(ident.clone(), flat.ty.clone());
                    self.ctx.insert_const(ident.clone(), flat.clone());
                    self.node.locals.insert(ident.clone());
                    recorded.push((path, flat.ty));
                }
                self.vars.insert(
                    name.clone(),
                    NodeVarInfo {
                        role: VarRole::Local,
                        leaves: recorded,
                    },
                );
            }
        }
        Ok(())
    }

    fn resolve_lhs_leaves(
        &mut self,
        lhs: &[lustre_ast::LhsVar],
        rhs_leaves: &[(Vec<Index>, FlatExpr)],
        span: Span,
    ) -> ElabResult<()> {
        for (pos, lhs_var) in lhs.iter().enumerate() {
            let info = self
                .vars
                .get(&lhs_var.name)
                .cloned()
                .ok_or_else(|| ElabError::Undeclared {
                    name: lhs_var.name.as_str().to_string(),
                    span: lhs_var.span,
                })?;
            if info.role == VarRole::Input {
                return Err(ElabError::Undeclared {
                    name: lhs_var.name.as_str().to_string(),
                    span: lhs_var.span,
                });
            }

            let slot: Vec<(Vec<Index>, FlatExpr)> = if lhs.len() > 1 {
                let target = Index::Pos(u32::try_from(pos).unwrap_or(u32::MAX));
                rhs_leaves
                    .iter()
                    .filter_map(|(path, flat)| match path.split_first() {
                        Some((p, rest)) if *p == target => Some((rest.to_vec(), flat.clone())),
                        _ => None,
                    })
                    .collect()
            } else {
                rhs_leaves.to_vec()
            };

            let mut declared_leaves = info.leaves.clone();
            declared_leaves.sort_by(|a, b| a.0.cmp(&b.0));
            let mut slot_sorted = slot;
            slot_sorted.sort_by(|a, b| a.0.cmp(&b.0));
            if declared_leaves.len() != slot_sorted.len() {
                return Err(ElabError::TypeMismatch {
                    expected: format!("{} scalar leaf(ves)", declared_leaves.len()),
                    found: Type::Bool,
                    span,
                });
            }

            let base = Ident::new(lhs_var.name.clone());
            for ((declared_path, declared_ty), (actual_path, flat)) in
                declared_leaves.iter().zip(slot_sorted.iter())
            {
                if declared_path != actual_path {
                    return Err(ElabError::TypeMismatch {
                        expected: "matching leaf index".to_string(),
                        found: flat.ty.clone(),
                        span,
                    });
                }
                let leaf_ident = base.extend(declared_path.iter().cloned());

                if check_type(&flat.ty, declared_ty) {
                    self.node.equations.push(crate::node::Equation {
                        lhs: leaf_ident,
                        rhs: flat.clone(),
                    });
                    continue;
                }

                if let (Type::IntRange(lo, hi), Type::Int) = (declared_ty, &flat.ty) {
                    self.relax_to_int(&lhs_var.name, declared_path, lo.clone(), hi.clone());
                    let range_property = range_property_expr(&leaf_ident, lo.clone(), hi.clone());
                    self.node.properties.push(range_property);
                    self.node.equations.push(crate::node::Equation {
                        lhs: leaf_ident,
                        rhs: flat.clone(),
                    });
                    continue;
                }

                return Err(ElabError::TypeMismatch {
                    expected: format!("{declared_ty:?}"),
                    found: flat.ty.clone(),
                    span,
                });
            }
        }
        Ok(())
    }

    /// Widen `name`'s recorded leaf type from `IntRange(lo, hi)` to `Int`
    /// (§3 "Invariants", §4.8 step 5) in every table that remembers it.
    fn relax_to_int(&mut self, name: &Symbol, path: &[Index], _lo: lustre_common::BigInt, _hi: lustre_common::BigInt) {
        if let Some(info) = self.vars.get_mut(name) {
            if let Some(entry) = info.leaves.iter_mut().find(|(p, _)| p.as_slice() == path) {
                entry.1 = Type::Int;
            }
            if info.role == VarRole::Output {
                if let Some(out) = self.node.outputs.iter_mut().find(|o| &o.name == name) {
                    if let Some(entry) = out.leaves.iter_mut().find(|(p, _)| p.as_slice() == path) {
                        entry.1 = Type::Int;
                    }
                }
            }
        }
        let ident = Ident::new(name.clone()).extend(path.iter().cloned());
        self.ctx.bind_value_leaf(ident, Type::Int);
    }
}

fn range_property_expr(
    ident: &Ident,
    lo: lustre_common::BigInt,
    hi: lustre_common::BigInt,
) -> FlatExpr {
    let var = FlatExpr::var_ref(ident.clone(), Type::Int);
    let lo_bound = FlatExpr::relational(BinaryOp::Le, FlatExpr::int_const(lo), var.clone())
        .expect("int <= int is always well-typed");
    let hi_bound = FlatExpr::relational(BinaryOp::Le, var, FlatExpr::int_const(hi))
        .expect("int <= int is always well-typed");
    FlatExpr::boolean(BinaryOp::And, lo_bound, hi_bound).expect("bool and bool is always well-typed")
}

/// Elaborate a single node declaration against the (already-finalized)
/// global typing context and node registry (§4.8).
pub fn assemble_node(
    global_ctx: &TypingContext,
    nodes: &GlobalContext,
    decl: &NodeDecl,
) -> ElabResult<(Node, Vec<Diagnostic>)> {
    if !decl.params.is_empty() {
        return Err(ElabError::Unsupported {
            construct: "Parametric node".to_string(),
            span: decl.span,
        });
    }

    let mut asm = Assembly {
        ctx: global_ctx.clone(),
        nodes,
        fresh_vars: FreshVarGen::new(),
        fresh_calls: FreshCallGen::new(),
        node: Node {
            name: decl.name.as_str().to_string(),
            ..Node::default()
        },
        vars: FxHashMap::default(),
        diagnostics: Vec::new(),
    };

    for input in &decl.inputs {
        asm.declare_param(input, VarRole::Input)?;
    }
    for output in &decl.outputs {
        asm.declare_param(output, VarRole::Output)?;
    }

    for requires in &decl.contract.requires {
        let flat = asm.eval_scalar_bool(requires)?;
        asm.node.requires.push(flat);
    }
    for ensures in &decl.contract.ensures {
        let flat = asm.eval_scalar_bool(ensures)?;
        asm.node.ensures.push(flat);
    }

    for local in &decl.locals {
        asm.declare_local(local)?;
    }

    for stmt in &decl.body {
        match stmt {
            Statement::Assert { condition, .. } => {
                let flat = asm.eval_scalar_bool(condition)?;
                asm.node.asserts.push(flat);
            }
            Statement::Property { condition, .. } => {
                let flat = asm.eval_scalar_bool(condition)?;
                asm.node.properties.push(flat);
            }
            Statement::Main { .. } => asm.node.is_main = true,
            Statement::Equation { lhs, rhs, span } => {
                let mut evaluator = asm.evaluator(EvalMode::Normal);
                let rhs_leaves = evaluator.eval_expr(rhs)?;
                let residue = std::mem::take(&mut evaluator.residue);
                asm.fold_residue(residue);
                asm.diagnostics.append(&mut evaluator.diagnostics);
                asm.resolve_lhs_leaves(lhs, &rhs_leaves, *span)?;
            }
        }
    }

    Ok((asm.node, asm.diagnostics))
}
