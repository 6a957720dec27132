//! The elaborated output IR (§3 "Node", §6 "Output").

use rustc_hash::{FxHashMap, FxHashSet};

use lustre_expr::FlatExpr;
use lustre_ident::{Ident, Index, Symbol};
use lustre_types::Type;

/// One flattened leaf of an input or output parameter.
pub type ParamLeaf = (Vec<Index>, Type);

#[derive(Clone, Debug, PartialEq)]
pub struct InputParam {
    pub name: Symbol,
    pub leaves: Vec<ParamLeaf>,
    pub is_const: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputParam {
    pub name: Symbol,
    pub leaves: Vec<ParamLeaf>,
}

/// `x = e`, both already reduced to a single scalar leaf and flat
/// expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub lhs: Ident,
    pub rhs: FlatExpr,
}

/// A node-call site abstracted out of the caller's body (§4.7).
#[derive(Clone, Debug, PartialEq)]
pub struct CallSite {
    /// Bound output identifiers, in the callee's output order.
    pub bound_outputs: Vec<Ident>,
    /// `true` for a plain call; the evaluated condition for a `condact`.
    pub activation: FlatExpr,
    pub callee: Symbol,
    /// Positionally sorted list of flattened input-argument expressions.
    pub inputs: Vec<FlatExpr>,
    /// Flattened default values for a `condact`'s inactive initial tick;
    /// empty for a plain call.
    pub init_defaults: Vec<FlatExpr>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub inputs: Vec<InputParam>,
    pub outputs: Vec<OutputParam>,
    pub locals: FxHashSet<Ident>,
    pub asserts: Vec<FlatExpr>,
    pub properties: Vec<FlatExpr>,
    pub requires: Vec<FlatExpr>,
    pub ensures: Vec<FlatExpr>,
    /// Dependency-sorted: for any edge `u -> v`, `v`'s equation precedes
    /// `u`'s (§4.9).
    pub equations: Vec<Equation>,
    pub calls: Vec<CallSite>,
    pub is_main: bool,
    /// For each output leaf, the set of input leaves it transitively
    /// depends on (§4.9, Open Question 9(b): matched index-exact, not
    /// merely by input position).
    pub output_input_dep: FxHashMap<Ident, FxHashSet<Ident>>,
}

impl Node {
    #[must_use]
    pub fn input_leaf_idents(&self) -> Vec<Ident> {
        self.inputs
            .iter()
            .flat_map(|p| {
                let base = Ident::new(p.name.clone());
                p.leaves
                    .iter()
                    .map(move |(path, _)| base.extend(path.iter().cloned()))
            })
            .collect()
    }

    #[must_use]
    pub fn output_leaf_idents(&self) -> Vec<Ident> {
        self.outputs
            .iter()
            .flat_map(|p| {
                let base = Ident::new(p.name.clone());
                p.leaves
                    .iter()
                    .map(move |(path, _)| base.extend(path.iter().cloned()))
            })
            .collect()
    }
}

/// Maps each elaborated node's name to its record (§6 "Output").
pub type GlobalContext = FxHashMap<Symbol, Node>;
