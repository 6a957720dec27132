//! Type-construction errors.
//!
//! These are raised only by the smart constructors in this crate when an
//! aggregate type violates a structural invariant of §3 (e.g. an array of
//! size zero, or a range whose bounds are inverted). Type mismatches that
//! arise from *checking* an expression against a declared type are reported
//! by `lustre-expr`/`lustre-elab`, which carry source spans; this crate has
//! no notion of source position.

use lustre_common::BigInt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeError {
    /// `IntRange(lo, hi)` constructed with `lo > hi`.
    InvalidRange { lo: BigInt, hi: BigInt },
    /// `Array(elem, size)` constructed with `size < 1`.
    InvalidArraySize { size: i64 },
    /// `Enum(constructors)` constructed with a repeated constructor name.
    DuplicateEnumConstructor { name: String },
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeError::InvalidRange { lo, hi } => {
                write!(f, "invalid subrange [{lo}, {hi}]: lower bound exceeds upper bound")
            }
            TypeError::InvalidArraySize { size } => {
                write!(f, "array size must be at least 1, got {size}")
            }
            TypeError::DuplicateEnumConstructor { name } => {
                write!(f, "duplicate enum constructor `{name}`")
            }
        }
    }
}

impl std::error::Error for TypeError {}
