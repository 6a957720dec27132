//! The expression evaluator (§4.6): the main recursive traversal from AST
//! expressions to indexed flat expressions.

use lustre_ast::{Expr, ExprKind};
use lustre_common::{BigInt, Diagnostic};
use lustre_expr::{BinaryOp, FlatExpr, Term};
use lustre_ident::{FreshCallGen, FreshVarGen, Ident, Index, Symbol};
use lustre_types::{Type, check_type};

use crate::context::TypingContext;
use crate::error::{ElabError, ElabResult};
use crate::node::{CallSite, GlobalContext};
use crate::residue::{AuxVar, NewCall, Residue};
use crate::type_expander::ConstIntEval;

/// One scalar result of evaluating an expression: its index relative to the
/// expression's own root, and the flat expression at that leaf.
pub type IndexedResult = (Vec<Index>, FlatExpr);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvalMode {
    Normal,
    /// Abstraction-suppressing: introducing an auxiliary variable or a
    /// node call is a fatal `ConstantRequired` error (§4.6 "Constant
    /// evaluation").
    ConstantOnly,
}

pub struct Evaluator<'a> {
    pub ctx: &'a TypingContext,
    pub nodes: &'a GlobalContext,
    pub fresh_vars: &'a mut FreshVarGen,
    pub fresh_calls: &'a mut FreshCallGen,
    pub mode: EvalMode,
    pub residue: Residue,
    /// Set while evaluating the step operand of an enclosing `->` (§4.3): a
    /// `pre` reached only while this is `false` is unguarded.
    guarded: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        ctx: &'a TypingContext,
        nodes: &'a GlobalContext,
        fresh_vars: &'a mut FreshVarGen,
        fresh_calls: &'a mut FreshCallGen,
        mode: EvalMode,
    ) -> Self {
        Evaluator {
            ctx,
            nodes,
            fresh_vars,
            fresh_calls,
            mode,
            residue: Residue::new(),
            guarded: false,
            diagnostics: Vec::new(),
        }
    }

    /// Evaluate `expr`, returning its scalar leaves sorted by index (§5
    /// ordering guarantee: "expression-evaluator results are sorted by
    /// index before return").
    pub fn eval_expr(&mut self, expr: &Expr) -> ElabResult<Vec<IndexedResult>> {
        let mut results = self.eval_inner(expr)?;
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    fn eval_inner(&mut self, expr: &Expr) -> ElabResult<Vec<IndexedResult>> {
        match &expr.kind {
            ExprKind::Ident(name) => self.eval_ident(name, expr),
            ExprKind::BoolLit(b) => Ok(vec![(vec![], FlatExpr::bool_const(*b))]),
            ExprKind::IntLit(i) => Ok(vec![(vec![], FlatExpr::int_const(i.clone()))]),
            ExprKind::RealLit(r) => Ok(vec![(vec![], FlatExpr::real_const(*r))]),
            ExprKind::FieldProj(inner, field) => self.eval_field_proj(inner, field, expr),
            ExprKind::IndexProj(inner, index_expr) => self.eval_index_proj(inner, index_expr, expr),
            ExprKind::ExprList(items) | ExprKind::TupleCtor(items) => {
                self.eval_positional_list(items)
            }
            ExprKind::ArrayCtor { elem, size } => self.eval_array_ctor(elem, size, expr),
            ExprKind::RecordCtor { type_name, fields } => {
                self.eval_record_ctor(type_name, fields, expr)
            }
            ExprKind::Unary(op, operand) => self.eval_unary(*op, operand, expr),
            ExprKind::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs, expr),
            ExprKind::Ite {
                cond,
                then_branch,
                else_branch,
            } => self.eval_ite(cond, then_branch, else_branch, expr),
            ExprKind::ToInt(inner) => self.eval_conversion(inner, true, expr),
            ExprKind::ToReal(inner) => self.eval_conversion(inner, false, expr),
            ExprKind::Pre(inner) => self.eval_pre(inner, expr),
            ExprKind::Arrow(a, b) => self.eval_arrow(a, b, expr),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, None, &[], expr),
            ExprKind::Condact {
                activation,
                callee,
                args,
                defaults,
            } => self.eval_call(callee, args, Some(activation.as_ref()), defaults, expr),
            ExprKind::Unsupported(form) => Err(ElabError::Unsupported {
                construct: form.label().to_string(),
                span: expr.span,
            }),
        }
    }

    fn eval_ident(&mut self, name: &Symbol, expr: &Expr) -> ElabResult<Vec<IndexedResult>> {
        let ident = Ident::new(name.clone());
        if let Some(ty) = self.ctx.type_ctx.get(&ident) {
            if let Some(flat) = self.ctx.consts.get(&ident) {
                return Ok(vec![(vec![], flat.clone())]);
            }
            return Ok(vec![(vec![], FlatExpr::var_ref(ident, ty.clone()))]);
        }
        if let Some(suffixes) = self.ctx.index_ctx.get(&ident) {
            return Ok(suffixes
                .iter()
                .map(|(suffix, ty)| {
                    let leaf_ident = ident.extend(suffix.iter().cloned());
                    (suffix.clone(), FlatExpr::var_ref(leaf_ident, ty.clone()))
                })
                .collect());
        }
        Err(ElabError::Undeclared {
            name: name.as_str().to_string(),
            span: expr.span,
        })
    }

    fn eval_field_proj(
        &mut self,
        inner: &Expr,
        field: &Symbol,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let leaves = self.eval_inner(inner)?;
        let selected: Vec<IndexedResult> = leaves
            .into_iter()
            .filter_map(|(path, flat)| match path.split_first() {
                Some((Index::Field(f), rest)) if f == field => Some((rest.to_vec(), flat)),
                _ => None,
            })
            .collect();
        if selected.is_empty() {
            return Err(ElabError::Undeclared {
                name: field.as_str().to_string(),
                span: expr.span,
            });
        }
        Ok(selected)
    }

    fn eval_index_proj(
        &mut self,
        inner: &Expr,
        index_expr: &Expr,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let pos = self.eval_const_int(index_expr)?;
        let pos: u32 = pos.try_into().map_err(|_| ElabError::ConstantRequired {
            span: index_expr.span,
        })?;
        let leaves = self.eval_inner(inner)?;
        let selected: Vec<IndexedResult> = leaves
            .into_iter()
            .filter_map(|(path, flat)| match path.split_first() {
                Some((Index::Pos(p), rest)) if *p == pos => Some((rest.to_vec(), flat)),
                _ => None,
            })
            .collect();
        if selected.is_empty() {
            return Err(ElabError::Undeclared {
                name: format!("[{pos}]"),
                span: expr.span,
            });
        }
        Ok(selected)
    }

    fn eval_positional_list(&mut self, items: &[Expr]) -> ElabResult<Vec<IndexedResult>> {
        let mut results = Vec::new();
        for (pos, item) in items.iter().enumerate() {
            let pos = u32::try_from(pos).unwrap_or(u32::MAX);
            for (suffix, flat) in self.eval_inner(item)? {
                let mut path = vec![Index::Pos(pos)];
                path.extend(suffix);
                results.push((path, flat));
            }
        }
        Ok(results)
    }

    fn eval_array_ctor(
        &mut self,
        elem: &Expr,
        size: &Expr,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let n = self.eval_const_int(size)?;
        let n: u32 = n.try_into().map_err(|_| ElabError::TypeMismatch {
            expected: "a positive array size".to_string(),
            found: Type::Int,
            span: expr.span,
        })?;
        let elem_leaves = self.eval_inner(elem)?;
        let mut results = Vec::with_capacity(elem_leaves.len() * n as usize);
        for i in 0..n {
            for (suffix, flat) in &elem_leaves {
                let mut path = vec![Index::Pos(i)];
                path.extend(suffix.clone());
                results.push((path, flat.clone()));
            }
        }
        Ok(results)
    }

    fn eval_record_ctor(
        &mut self,
        type_name: &Symbol,
        fields: &[(Symbol, Expr)],
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let type_ident = Ident::new(type_name.clone());
        let declared = self
            .ctx
            .indexed_types
            .get(&type_ident)
            .cloned()
            .ok_or_else(|| ElabError::Undeclared {
                name: type_name.as_str().to_string(),
                span: expr.span,
            })?;

        let mut actual = Vec::new();
        for (field_name, field_expr) in fields {
            for (suffix, flat) in self.eval_inner(field_expr)? {
                let mut path = vec![Index::Field(field_name.clone())];
                path.extend(suffix);
                actual.push((path, flat));
            }
        }
        actual.sort_by(|a, b| a.0.cmp(&b.0));
        let mut declared = declared;
        declared.sort_by(|a, b| a.0.cmp(&b.0));

        if actual.len() != declared.len() {
            return Err(ElabError::TypeMismatch {
                expected: format!("record shape of `{}`", type_name.as_str()),
                found: Type::FreeType(type_name.clone()),
                span: expr.span,
            });
        }
        for ((actual_path, flat), (declared_path, declared_ty)) in actual.iter().zip(declared.iter()) {
            if actual_path != declared_path {
                return Err(ElabError::TypeMismatch {
                    expected: format!("record shape of `{}`", type_name.as_str()),
                    found: flat.ty.clone(),
                    span: expr.span,
                });
            }
            if !check_type(&flat.ty, declared_ty) {
                return Err(ElabError::TypeMismatch {
                    expected: format!("{declared_ty:?}"),
                    found: flat.ty.clone(),
                    span: expr.span,
                });
            }
        }
        Ok(actual)
    }

    fn eval_unary(
        &mut self,
        op: lustre_expr::UnaryOp,
        operand: &Expr,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let leaves = self.eval_inner(operand)?;
        leaves
            .into_iter()
            .map(|(idx, flat)| {
                let result = match op {
                    lustre_expr::UnaryOp::Neg => FlatExpr::neg(flat),
                    lustre_expr::UnaryOp::Not => FlatExpr::not(flat),
                };
                result
                    .map(|f| (idx, f))
                    .map_err(|e| to_type_mismatch(e, expr.span))
            })
            .collect()
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let mut lhs_leaves = self.eval_inner(lhs)?;
        let mut rhs_leaves = self.eval_inner(rhs)?;
        lhs_leaves.sort_by(|a, b| a.0.cmp(&b.0));
        rhs_leaves.sort_by(|a, b| a.0.cmp(&b.0));
        if lhs_leaves.len() != rhs_leaves.len() {
            return Err(ElabError::TypeMismatch {
                expected: "operands of the same shape".to_string(),
                found: Type::Bool,
                span: expr.span,
            });
        }
        lhs_leaves
            .into_iter()
            .zip(rhs_leaves)
            .map(|((idx_a, a), (idx_b, b))| {
                if idx_a != idx_b {
                    return Err(ElabError::TypeMismatch {
                        expected: "operands of the same shape".to_string(),
                        found: b.ty,
                        span: expr.span,
                    });
                }
                let result = if op.is_arithmetic() {
                    FlatExpr::arithmetic(op, a, b)
                } else if op.is_relational() {
                    FlatExpr::relational(op, a, b)
                } else {
                    FlatExpr::boolean(op, a, b)
                };
                result
                    .map(|f| (idx_a, f))
                    .map_err(|e| to_type_mismatch(e, expr.span))
            })
            .collect()
    }

    fn eval_ite(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let cond_leaves = self.eval_inner(cond)?;
        if cond_leaves.len() != 1 || cond_leaves[0].1.ty != Type::Bool {
            return Err(ElabError::TypeMismatch {
                expected: "a scalar bool".to_string(),
                found: cond_leaves
                    .first()
                    .map(|(_, f)| f.ty.clone())
                    .unwrap_or(Type::Bool),
                span: cond.span,
            });
        }
        let cond_flat = cond_leaves.into_iter().next().unwrap().1;

        let mut then_leaves = self.eval_inner(then_branch)?;
        let mut else_leaves = self.eval_inner(else_branch)?;
        then_leaves.sort_by(|a, b| a.0.cmp(&b.0));
        else_leaves.sort_by(|a, b| a.0.cmp(&b.0));
        if then_leaves.len() != else_leaves.len() {
            return Err(ElabError::TypeMismatch {
                expected: "branches of the same shape".to_string(),
                found: Type::Bool,
                span: expr.span,
            });
        }
        then_leaves
            .into_iter()
            .zip(else_leaves)
            .map(|((idx_t, t), (idx_e, e))| {
                if idx_t != idx_e {
                    return Err(ElabError::TypeMismatch {
                        expected: "branches of the same shape".to_string(),
                        found: e.ty,
                        span: expr.span,
                    });
                }
                FlatExpr::ite(cond_flat.clone(), t, e)
                    .map(|f| (idx_t, f))
                    .map_err(|err| to_type_mismatch(err, expr.span))
            })
            .collect()
    }

    fn eval_conversion(
        &mut self,
        inner: &Expr,
        to_int: bool,
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        let leaves = self.eval_inner(inner)?;
        leaves
            .into_iter()
            .map(|(idx, flat)| {
                let result = if to_int {
                    FlatExpr::to_int(flat)
                } else {
                    FlatExpr::to_real(flat)
                };
                result
                    .map(|f| (idx, f))
                    .map_err(|e| to_type_mismatch(e, expr.span))
            })
            .collect()
    }

    /// `pre e` (§4.3, §4.6): a bare variable is wrapped directly; anything
    /// else is abstracted to a fresh equation first. A `pre` reached without
    /// passing through the step branch of an enclosing `->` is flagged as an
    /// unguarded-`pre` warning (§7) rather than rejected outright.
    fn eval_pre(&mut self, inner: &Expr, expr: &Expr) -> ElabResult<Vec<IndexedResult>> {
        if !self.guarded {
            self.diagnostics.push(Diagnostic::warning(expr.span, "unguarded pre"));
        }
        let leaves = self.eval_inner(inner)?;
        let mut results = Vec::with_capacity(leaves.len());
        for (idx, flat) in leaves {
            if let (Term::Var(v_init), Term::Var(v_step)) = (&flat.init, &flat.step) {
                if v_init == v_step {
                    results.push((idx, FlatExpr::pre(v_init.clone(), flat.ty.clone())));
                    continue;
                }
            }
            let ty = flat.ty.clone();
            let aux = self.alloc_aux_var(ty.clone(), flat, expr.span)?;
            results.push((idx, FlatExpr::pre(aux, ty)));
        }
        Ok(results)
    }

    /// `a -> b` (§3, §4.3): `b` is the step branch, so any `pre` reached
    /// while evaluating it is guarded. `a` is evaluated with whatever
    /// guardedness already held on entry.
    fn eval_arrow(&mut self, a: &Expr, b: &Expr, expr: &Expr) -> ElabResult<Vec<IndexedResult>> {
        let mut a_leaves = self.eval_inner(a)?;
        let previously_guarded = self.guarded;
        self.guarded = true;
        let b_result = self.eval_inner(b);
        self.guarded = previously_guarded;
        let mut b_leaves = b_result?;
        a_leaves.sort_by(|x, y| x.0.cmp(&y.0));
        b_leaves.sort_by(|x, y| x.0.cmp(&y.0));
        if a_leaves.len() != b_leaves.len() {
            return Err(ElabError::TypeMismatch {
                expected: "operands of the same shape".to_string(),
                found: Type::Bool,
                span: expr.span,
            });
        }
        a_leaves
            .into_iter()
            .zip(b_leaves)
            .map(|((idx_a, a), (idx_b, b))| {
                if idx_a != idx_b {
                    return Err(ElabError::TypeMismatch {
                        expected: "operands of the same shape".to_string(),
                        found: b.ty,
                        span: expr.span,
                    });
                }
                FlatExpr::arrow(a, b)
                    .map(|f| (idx_a, f))
                    .map_err(|e| to_type_mismatch(e, expr.span))
            })
            .collect()
    }

    /// Allocate a fresh `__abs.k = value` auxiliary equation and return its
    /// identifier (§4.3, §4.6). Fatal in constant-evaluation mode.
    fn alloc_aux_var(&mut self, ty: Type, value: FlatExpr, span: lustre_common::Span) -> ElabResult<Ident> {
        if self.mode == EvalMode::ConstantOnly {
            return Err(ElabError::ConstantRequired { span });
        }
        let ident = self.fresh_vars.next_ident();
        self.residue.new_vars.push(AuxVar {
            ident: ident.clone(),
            ty,
            value,
        });
        Ok(ident)
    }

    /// Node-call elaboration (§4.7): extract a named call site and return
    /// variable references to its bound outputs.
    fn eval_call(
        &mut self,
        callee: &Symbol,
        args: &[Expr],
        activation: Option<&Expr>,
        defaults: &[Expr],
        expr: &Expr,
    ) -> ElabResult<Vec<IndexedResult>> {
        if self.mode == EvalMode::ConstantOnly {
            return Err(ElabError::ConstantRequired { span: expr.span });
        }
        let callee_node = self
            .nodes
            .get(callee)
            .ok_or_else(|| ElabError::ForwardReference {
                callee: callee.as_str().to_string(),
                span: expr.span,
            })?
            .clone();

        let mut input_flats = Vec::new();
        for arg in args {
            for (_, flat) in self.eval_expr(arg)? {
                input_flats.push(flat);
            }
        }
        let declared_inputs: Vec<Type> = callee_node
            .inputs
            .iter()
            .flat_map(|p| p.leaves.iter().map(|(_, ty)| ty.clone()))
            .collect();
        if input_flats.len() != declared_inputs.len() {
            return Err(ElabError::TypeMismatch {
                expected: format!("{} input argument(s)", declared_inputs.len()),
                found: Type::Bool,
                span: expr.span,
            });
        }
        for (flat, declared) in input_flats.iter().zip(declared_inputs.iter()) {
            if !check_type(&flat.ty, declared) {
                return Err(ElabError::TypeMismatch {
                    expected: format!("{declared:?}"),
                    found: flat.ty.clone(),
                    span: expr.span,
                });
            }
        }

        let activation_flat = match activation {
            Some(cond_expr) => {
                let mut leaves = self.eval_expr(cond_expr)?;
                if leaves.len() != 1 || leaves[0].1.ty != Type::Bool {
                    return Err(ElabError::TypeMismatch {
                        expected: "a scalar bool activation condition".to_string(),
                        found: Type::Bool,
                        span: cond_expr.span,
                    });
                }
                leaves.remove(0).1
            }
            None => FlatExpr::bool_const(true),
        };

        let mut default_flats = Vec::new();
        for default_expr in defaults {
            for (_, flat) in self.eval_expr(default_expr)? {
                default_flats.push(flat);
            }
        }
        let declared_outputs: Vec<Type> = callee_node
            .outputs
            .iter()
            .flat_map(|p| p.leaves.iter().map(|(_, ty)| ty.clone()))
            .collect();
        if !default_flats.is_empty() {
            if default_flats.len() != declared_outputs.len() {
                return Err(ElabError::TypeMismatch {
                    expected: format!("{} default value(s)", declared_outputs.len()),
                    found: Type::Bool,
                    span: expr.span,
                });
            }
            for (flat, declared) in default_flats.iter().zip(declared_outputs.iter()) {
                if !check_type(&flat.ty, declared) {
                    return Err(ElabError::TypeMismatch {
                        expected: format!("{declared:?}"),
                        found: flat.ty.clone(),
                        span: expr.span,
                    });
                }
            }
        }

        let call_ident = self.fresh_calls.next_ident(callee);

        let mut bound_outputs = Vec::new();
        let mut output_locals = Vec::new();
        let mut results = Vec::new();
        let multi_output = callee_node.outputs.len() > 1;
        for (out_pos, out_param) in callee_node.outputs.iter().enumerate() {
            let out_base = call_ident.push(Index::Field(out_param.name.clone()));
            for (suffix, ty) in &out_param.leaves {
                let bound = out_base.extend(suffix.iter().cloned());
                bound_outputs.push(bound.clone());
                output_locals.push((bound.clone(), ty.clone()));
                let mut result_idx = if multi_output {
                    vec![Index::Pos(u32::try_from(out_pos).unwrap_or(u32::MAX))]
                } else {
                    vec![]
                };
                result_idx.extend(suffix.iter().cloned());
                results.push((result_idx, FlatExpr::var_ref(bound, ty.clone())));
            }
        }

        self.residue.new_calls.push(NewCall {
            site: CallSite {
                bound_outputs,
                activation: activation_flat,
                callee: callee.clone(),
                inputs: input_flats,
                init_defaults: default_flats,
            },
            output_locals,
        });

        Ok(results)
    }
}

impl ConstIntEval for Evaluator<'_> {
    fn eval_const_int(&mut self, expr: &Expr) -> ElabResult<BigInt> {
        let previous_mode = self.mode;
        self.mode = EvalMode::ConstantOnly;
        let result = self.eval_expr(expr);
        self.mode = previous_mode;
        let leaves = result?;
        if leaves.len() != 1 {
            return Err(ElabError::ConstantRequired { span: expr.span });
        }
        let (_, flat) = leaves.into_iter().next().unwrap();
        if !flat.pre_vars.is_empty() {
            return Err(ElabError::ConstantRequired { span: expr.span });
        }
        match (&flat.init, &flat.step) {
            (Term::IntConst(a), Term::IntConst(b)) if a == b => Ok(a.clone()),
            _ => Err(ElabError::ConstantRequired { span: expr.span }),
        }
    }
}

fn to_type_mismatch(err: lustre_expr::ExprError, span: lustre_common::Span) -> ElabError {
    ElabError::TypeMismatch {
        expected: err.to_string(),
        found: Type::Bool,
        span,
    }
}
