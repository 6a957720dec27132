//! The closed type-variant set (§3) and the subtype relation (§4.2).

use std::sync::Arc;

use indexmap::IndexMap;
use lustre_common::numeric::try_narrow_range;
use lustre_common::BigInt;
use lustre_ident::Symbol;

use crate::error::TypeError;

/// The closed set of types. Aggregates (`Record`, `Tuple`, `Array`) are
/// representation-only: after elaboration no equation's type is ever an
/// aggregate (§3 Flatness invariant, tested in `lustre-elab`).
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Int,
    Real,
    /// `IntRange(lo, hi)` with `lo <= hi`. Construct only via [`Type::int_range`].
    IntRange(BigInt, BigInt),
    /// Distinct constructor names, shared cheaply across every alias bound
    /// to the same enum declaration.
    Enum(Arc<[Symbol]>),
    FreeType(Symbol),
    Record(Arc<IndexMap<Symbol, Type>>),
    Tuple(Arc<Vec<Type>>),
    Array(Arc<Type>, u64),
}

impl Type {
    /// Construct an integer subrange, validating `lo <= hi` (§3).
    pub fn int_range(lo: BigInt, hi: BigInt) -> Result<Type, TypeError> {
        if lo > hi {
            return Err(TypeError::InvalidRange { lo, hi });
        }
        Ok(Type::IntRange(lo, hi))
    }

    /// Construct an enum type, validating that constructors are distinct
    /// (§3).
    pub fn enum_type(constructors: Vec<Symbol>) -> Result<Type, TypeError> {
        let mut seen = std::collections::HashSet::with_capacity(constructors.len());
        for c in &constructors {
            if !seen.insert(c.as_str()) {
                return Err(TypeError::DuplicateEnumConstructor {
                    name: c.as_str().to_string(),
                });
            }
        }
        Ok(Type::Enum(Arc::from(constructors)))
    }

    /// Construct a record type from an ordered field list.
    #[must_use]
    pub fn record(fields: IndexMap<Symbol, Type>) -> Type {
        Type::Record(Arc::new(fields))
    }

    #[must_use]
    pub fn tuple(elements: Vec<Type>) -> Type {
        Type::Tuple(Arc::new(elements))
    }

    /// Construct an array type, validating `size >= 1` (§3).
    pub fn array(elem: Type, size: u64) -> Result<Type, TypeError> {
        if size < 1 {
            return Err(TypeError::InvalidArraySize {
                size: i64::try_from(size).unwrap_or(i64::MIN),
            });
        }
        Ok(Type::Array(Arc::new(elem), size))
    }

    /// True for scalar (non-aggregate) types — every leaf produced by the
    /// type expander, and every flat expression's type, must satisfy this
    /// (§3 Flatness invariant).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Type::Record(_) | Type::Tuple(_) | Type::Array(_, _))
    }

    #[must_use]
    pub fn is_int_like(&self) -> bool {
        matches!(self, Type::Int | Type::IntRange(_, _))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
            Type::IntRange(lo, hi) => match try_narrow_range(lo, hi) {
                Some((lo, hi)) => write!(f, "int[{lo}, {hi}]"),
                None => write!(f, "int[{lo}, {hi}]"),
            },
            Type::Enum(ctors) => {
                write!(f, "enum {{")?;
                for (i, ctor) in ctors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ctor.as_str())?;
                }
                write!(f, "}}")
            }
            Type::FreeType(name) => write!(f, "{}", name.as_str()),
            Type::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {ty}", name.as_str())?;
                }
                write!(f, "}}")
            }
            Type::Tuple(elements) => {
                write!(f, "(")?;
                for (i, ty) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            Type::Array(elem, size) => write!(f, "[{elem}; {size}]"),
        }
    }
}

/// Subtype relation (§3, §4.2): reflexive (structural equality);
/// `IntRange(a,b) <= Int`; `IntRange(a,b) <= IntRange(c,d)` iff `c <= a` and
/// `b <= d`; no other non-trivial cases. No implicit coercions beyond this
/// lattice.
#[must_use]
pub fn check_type(expr_type: &Type, declared_type: &Type) -> bool {
    if expr_type == declared_type {
        return true;
    }
    match (expr_type, declared_type) {
        (Type::IntRange(_, _), Type::Int) => true,
        (Type::IntRange(a, b), Type::IntRange(c, d)) => c <= a && b <= d,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(lo: i64, hi: i64) -> Type {
        Type::int_range(BigInt::from(lo), BigInt::from(hi)).unwrap()
    }

    #[test]
    fn reflexive_for_every_scalar() {
        assert!(check_type(&Type::Bool, &Type::Bool));
        assert!(check_type(&Type::Int, &Type::Int));
        assert!(check_type(&range(0, 10), &range(0, 10)));
    }

    #[test]
    fn range_widens_to_int() {
        assert!(check_type(&range(0, 10), &Type::Int));
        assert!(!check_type(&Type::Int, &range(0, 10)));
    }

    #[test]
    fn range_widens_to_wider_range() {
        assert!(check_type(&range(2, 8), &range(0, 10)));
        assert!(!check_type(&range(0, 10), &range(2, 8)));
    }

    #[test]
    fn unrelated_scalars_are_not_subtypes() {
        assert!(!check_type(&Type::Bool, &Type::Int));
        assert!(!check_type(&Type::Real, &Type::Int));
    }

    #[test]
    fn inverted_range_is_rejected_at_construction() {
        assert!(Type::int_range(BigInt::from(10), BigInt::from(0)).is_err());
    }

    #[test]
    fn zero_size_array_is_rejected_at_construction() {
        assert!(Type::array(Type::Int, 0).is_err());
    }

    #[test]
    fn duplicate_enum_constructor_is_rejected() {
        use lustre_ident::Symbol;
        let err = Type::enum_type(vec![Symbol::new("A"), Symbol::new("A")]);
        assert!(err.is_err());
    }
}
