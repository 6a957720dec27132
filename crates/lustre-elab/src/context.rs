//! The typing context (§3 "Typing context", §4.4).
//!
//! A record of six mappings that grows monotonically as top-level
//! declarations are processed. Every operation here takes the context by
//! reference and returns a new binding to add — nothing is mutated in
//! place from the caller's point of view except via the explicit `insert_*`
//! methods, which are the only place state changes (§9 "Threaded-context
//! style").

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lustre_common::Span;
use lustre_expr::FlatExpr;
use lustre_ident::{Ident, Index, is_reserved_base};
use lustre_types::Type;

use crate::error::{ElabError, ElabResult};

/// One leaf of an expanded aggregate: the remaining index path from some
/// prefix, paired with its scalar type.
pub type IndexedLeaf = (Vec<Index>, Type);

#[derive(Clone, Debug, Default)]
pub struct TypingContext {
    /// Fully-qualified leaf identifier -> scalar type, for leaves introduced
    /// by a type declaration.
    pub basic_types: FxHashMap<Ident, Type>,
    /// Identifier prefix -> list of (remaining index, scalar type), a
    /// materialized trie over `basic_types` allowing whole-aggregate
    /// dereference.
    pub indexed_types: FxHashMap<Ident, Vec<IndexedLeaf>>,
    /// Free (abstract) type names.
    pub free_types: rustc_hash::FxHashSet<lustre_ident::Symbol>,
    /// In-scope value identifier -> scalar type (signals and enum
    /// constants).
    pub type_ctx: FxHashMap<Ident, Type>,
    /// Identifier prefix -> list of remaining-index suffixes in scope; the
    /// projection of `type_ctx` to the prefix structure.
    pub index_ctx: FxHashMap<Ident, Vec<IndexedLeaf>>,
    /// In-scope constant identifier -> its already-elaborated value.
    pub consts: FxHashMap<Ident, FlatExpr>,
}

impl TypingContext {
    #[must_use]
    pub fn new() -> Self {
        TypingContext::default()
    }

    /// True iff `id` names a known type alias or a free type (§4.4).
    #[must_use]
    pub fn type_in_context(&self, id: &Ident) -> bool {
        self.basic_types.contains_key(id)
            || self.indexed_types.contains_key(id)
            || (id.path().is_empty() && self.free_types.contains(id.base()))
    }

    /// True iff `id` is bound as a scalar or has scalar descendants (§4.4).
    /// Attempting to name a reserved-prefix identifier is a fatal error
    /// rather than simply reporting "not found" — reserved identifiers are
    /// never user-nameable at all.
    pub fn ident_in_context(&self, id: &Ident, span: Span) -> ElabResult<bool> {
        if is_reserved_base(id.base().as_str()) {
            return Err(ElabError::Redeclaration {
                name: id.to_string(),
                span,
            });
        }
        Ok(self.type_ctx.contains_key(id) || self.index_ctx.contains_key(id))
    }

    /// Bind every constructor of an `Enum` type to that type in `type_ctx`,
    /// erroring on a conflicting re-binding. Any other type is left
    /// untouched (§4.4).
    pub fn add_enum_to_context(&mut self, ty: &Type, span: Span) -> ElabResult<()> {
        let Type::Enum(constructors) = ty else {
            return Ok(());
        };
        for ctor in constructors.iter() {
            let ident = Ident::new(ctor.clone());
            if let Some(existing) = self.type_ctx.get(&ident) {
                if existing != ty {
                    return Err(ElabError::Redeclaration {
                        name: ctor.as_str().to_string(),
                        span,
                    });
                }
                continue;
            }
            self.type_ctx.insert(ident, ty.clone());
        }
        Ok(())
    }

    /// Register every *proper* prefix of `leaf_id`'s path (excluding the
    /// full path) as a key of `map`, mapped to the growing list of
    /// suffix-with-value entries seen under that prefix (§4.4). Used to
    /// materialize both `indexed_types` and `index_ctx`.
    pub fn add_to_prefix_map<V: Clone>(
        map: &mut FxHashMap<Ident, Vec<(Vec<Index>, V)>>,
        leaf_id: &Ident,
        value: V,
    ) {
        let (base, full_path) = leaf_id.split();
        for prefix_len in 0..full_path.len() {
            let prefix = Ident::with_path(base.clone(), full_path[..prefix_len].iter().cloned());
            let suffix = full_path[prefix_len..].to_vec();
            map.entry(prefix).or_default().push((suffix, value.clone()));
        }
    }

    /// Bind a leaf's scalar type: records it in `basic_types`/`indexed_types`
    /// (declaration-time aggregate shape) and registers its proper prefixes.
    pub fn declare_type_leaf(&mut self, leaf_id: Ident, ty: Type) {
        TypingContext::add_to_prefix_map(&mut self.indexed_types, &leaf_id, ty.clone());
        self.basic_types.insert(leaf_id, ty);
    }

    /// Bind a leaf's scalar type into scope (`type_ctx`/`index_ctx`): a
    /// concrete signal, local, or enum constant reachable during expression
    /// evaluation.
    pub fn bind_value_leaf(&mut self, leaf_id: Ident, ty: Type) {
        TypingContext::add_to_prefix_map(&mut self.index_ctx, &leaf_id, ty.clone());
        self.type_ctx.insert(leaf_id, ty);
    }

    pub fn declare_free_type(&mut self, name: lustre_ident::Symbol) {
        self.free_types.insert(name);
    }

    pub fn insert_const(&mut self, id: Ident, value: FlatExpr) {
        self.consts.insert(id, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_prefix_map_excludes_the_full_path() {
        let mut map: FxHashMap<Ident, Vec<(Vec<Index>, Type)>> = FxHashMap::default();
        let leaf = Ident::new("x")
            .push(Index::Field(lustre_ident::Symbol::new("a")))
            .push(Index::Pos(0));
        TypingContext::add_to_prefix_map(&mut map, &leaf, Type::Int);

        assert!(map.contains_key(&Ident::new("x")));
        assert!(
            map.contains_key(&Ident::new("x").push(Index::Field(lustre_ident::Symbol::new("a"))))
        );
        assert!(!map.contains_key(&leaf));
    }

    #[test]
    fn ident_in_context_rejects_reserved_prefix() {
        let ctx = TypingContext::new();
        let reserved = Ident::new("__abs").push(Index::Pos(0));
        assert!(ctx.ident_in_context(&reserved, Span::synthetic()).is_err());
    }

    #[test]
    fn enum_constants_bind_into_type_ctx() {
        let mut ctx = TypingContext::new();
        let ty = Type::enum_type(vec![
            lustre_ident::Symbol::new("Red"),
            lustre_ident::Symbol::new("Blue"),
        ])
        .unwrap();
        ctx.add_enum_to_context(&ty, Span::synthetic()).unwrap();
        assert_eq!(ctx.type_ctx.get(&Ident::new("Red")), Some(&ty));
    }

    #[test]
    fn conflicting_enum_rebinding_is_rejected() {
        let mut ctx = TypingContext::new();
        let ty_a = Type::enum_type(vec![lustre_ident::Symbol::new("Red")]).unwrap();
        let ty_b = Type::enum_type(vec![
            lustre_ident::Symbol::new("Red"),
            lustre_ident::Symbol::new("Green"),
        ])
        .unwrap();
        ctx.add_enum_to_context(&ty_a, Span::synthetic()).unwrap();
        assert!(ctx.add_enum_to_context(&ty_b, Span::synthetic()).is_err());
    }
}
