//! Arbitrary-precision integer support.
//!
//! Design Note 9(c): range bounds and integer literals in industrial Lustre
//! models routinely exceed 64 bits, so the core represents every integer
//! constant with [`BigInt`] rather than a fixed-width type.

pub use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Widen `lo..=hi` to a pair of `i64`s when both fit, used only for
/// human-readable diagnostic text (never for the actual range arithmetic,
/// which always stays in `BigInt`).
#[must_use]
pub fn try_narrow_range(lo: &BigInt, hi: &BigInt) -> Option<(i64, i64)> {
    Some((lo.to_i64()?, hi.to_i64()?))
}

#[must_use]
pub fn is_non_negative(value: &BigInt) -> bool {
    value.is_zero() || value.sign() == num_bigint::Sign::Plus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_range_fits_in_i64() {
        assert_eq!(
            try_narrow_range(&BigInt::from(0), &BigInt::from(10)),
            Some((0, 10))
        );
    }

    #[test]
    fn narrow_range_rejects_bounds_wider_than_i64() {
        let huge = BigInt::from(i64::MAX) + BigInt::from(1);
        assert_eq!(try_narrow_range(&BigInt::from(0), &huge), None);
    }

    #[test]
    fn zero_is_non_negative() {
        assert!(is_non_negative(&BigInt::from(0)));
        assert!(is_non_negative(&BigInt::from(5)));
        assert!(!is_non_negative(&BigInt::from(-1)));
    }
}
