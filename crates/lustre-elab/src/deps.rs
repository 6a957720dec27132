//! Equation dependency analysis and topological sort (§4.9).
//!
//! Builds a directed graph over a node's own leaf identifiers, rejects any
//! strongly connected component bigger than a single node (a cycle that
//! isn't broken by `pre`), reorders equations so each leaf's defining
//! equation comes after everything it reads, and records the node's own
//! `output_input_dep` table for callers higher up (Open Question 9(b):
//! index-exact, not positional).

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use lustre_common::Span;
use lustre_expr::Term;
use lustre_ident::Ident;

use crate::error::{ElabError, ElabResult};
use crate::node::{GlobalContext, Node};

/// Collect every `Var` identifier reachable from `term`, not descending
/// into the identifier guarded by a `Pre` (that read is satisfied by the
/// previous tick's value, so it never participates in this tick's
/// dependency graph).
fn collect_vars(term: &Term, out: &mut FxHashSet<Ident>) {
    match term {
        Term::Var(id) => {
            out.insert(id.clone());
        }
        Term::Unary(_, inner) | Term::ToInt(inner) | Term::ToReal(inner) => collect_vars(inner, out),
        Term::Binary(_, lhs, rhs) => {
            collect_vars(lhs, out);
            collect_vars(rhs, out);
        }
        Term::Ite(c, a, b) => {
            collect_vars(c, out);
            collect_vars(a, out);
            collect_vars(b, out);
        }
        Term::Pre(_) | Term::BoolConst(_) | Term::IntConst(_) | Term::RealConst(_) | Term::Undefined => {}
    }
}

/// The "depends on" adjacency for every leaf identifier this node defines.
type DepGraph = FxHashMap<Ident, FxHashSet<Ident>>;

fn build_graph(node: &Node, nodes: &GlobalContext) -> DepGraph {
    let mut edges: DepGraph = FxHashMap::default();

    for eq in &node.equations {
        let mut deps = FxHashSet::default();
        collect_vars(&eq.rhs.step, &mut deps);
        edges.entry(eq.lhs.clone()).or_default().extend(deps);
    }

    for call in &node.calls {
        let Some(callee_node) = nodes.get(&call.callee) else {
            continue;
        };
        let callee_inputs = callee_node.input_leaf_idents();
        let callee_outputs = callee_node.output_leaf_idents();

        for (bound_ident, callee_out_ident) in call.bound_outputs.iter().zip(callee_outputs.iter()) {
            let mut deps = FxHashSet::default();
            collect_vars(&call.activation.step, &mut deps);
            if let Some(callee_deps) = callee_node.output_input_dep.get(callee_out_ident) {
                for callee_in_ident in callee_deps {
                    if let Some(pos) = callee_inputs.iter().position(|i| i == callee_in_ident) {
                        if let Some(input_flat) = call.inputs.get(pos) {
                            collect_vars(&input_flat.step, &mut deps);
                        }
                    }
                }
            }
            edges.entry(bound_ident.clone()).or_default().extend(deps);
        }
    }

    edges
}

/// Kahn's algorithm restricted to this node's own equation left-hand sides,
/// picking the lexicographically smallest ready identifier at each step so
/// the result is stable across runs (§4.9 "stable tie-break").
fn topological_sort(lhs_list: &[Ident], edges: &DepGraph) -> Result<Vec<Ident>, Vec<String>> {
    let lhs_set: FxHashSet<Ident> = lhs_list.iter().cloned().collect();

    let mut remaining: FxHashMap<Ident, FxHashSet<Ident>> = lhs_list
        .iter()
        .map(|id| {
            let deps = edges
                .get(id)
                .map(|d| d.iter().filter(|x| lhs_set.contains(*x)).cloned().collect())
                .unwrap_or_default();
            (id.clone(), deps)
        })
        .collect();

    let mut dependents: FxHashMap<Ident, Vec<Ident>> = FxHashMap::default();
    for (id, deps) in &remaining {
        for dep in deps {
            dependents.entry(dep.clone()).or_default().push(id.clone());
        }
    }

    let mut ready: BTreeSet<Ident> = remaining
        .iter()
        .filter(|(_, deps)| deps.is_empty())
        .map(|(id, _)| id.clone())
        .collect();

    let mut order = Vec::with_capacity(lhs_list.len());
    let mut emitted: FxHashSet<Ident> = FxHashSet::default();

    while let Some(next) = ready.iter().next().cloned() {
        ready.remove(&next);
        emitted.insert(next.clone());
        order.push(next.clone());
        if let Some(waiting) = dependents.get(&next) {
            for v in waiting {
                if let Some(deps) = remaining.get_mut(v) {
                    deps.remove(&next);
                    if deps.is_empty() && !emitted.contains(v) {
                        ready.insert(v.clone());
                    }
                }
            }
        }
    }

    if order.len() != lhs_list.len() {
        let mut cycle: Vec<String> = lhs_list
            .iter()
            .filter(|id| !emitted.contains(*id))
            .map(std::string::ToString::to_string)
            .collect();
        cycle.sort();
        return Err(cycle);
    }
    Ok(order)
}

fn reachable_inputs(start: &Ident, edges: &DepGraph, input_set: &FxHashSet<Ident>) -> FxHashSet<Ident> {
    let mut visited = FxHashSet::default();
    let mut found = FxHashSet::default();
    let mut stack = vec![start.clone()];
    while let Some(cur) = stack.pop() {
        if !visited.insert(cur.clone()) {
            continue;
        }
        if let Some(deps) = edges.get(&cur) {
            for dep in deps {
                if input_set.contains(dep) {
                    found.insert(dep.clone());
                }
                stack.push(dep.clone());
            }
        }
    }
    found
}

/// Sort `node`'s equations into dependency order and populate its
/// `output_input_dep` table. Mutates `node` in place; `nodes` supplies the
/// already-analyzed callees referenced from `node.calls`.
pub fn sort_and_analyze(node: &mut Node, nodes: &GlobalContext) -> ElabResult<()> {
    let edges = build_graph(node, nodes);
    let lhs_list: Vec<Ident> = node.equations.iter().map(|eq| eq.lhs.clone()).collect();

    let order = topological_sort(&lhs_list, &edges).map_err(|cycle| ElabError::CyclicDependency {
        cycle,
        span: Span::synthetic(),
    })?;

    let mut by_lhs: FxHashMap<Ident, crate::node::Equation> = node
        .equations
        .drain(..)
        .map(|eq| (eq.lhs.clone(), eq))
        .collect();
    node.equations = order
        .into_iter()
        .filter_map(|id| by_lhs.remove(&id))
        .collect();

    let input_set: FxHashSet<Ident> = node.input_leaf_idents().into_iter().collect();
    node.output_input_dep = node
        .output_leaf_idents()
        .into_iter()
        .map(|out| {
            let deps = reachable_inputs(&out, &edges, &input_set);
            (out, deps)
        })
        .collect();

    Ok(())
}
