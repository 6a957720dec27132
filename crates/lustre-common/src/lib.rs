//! Common types and utilities for the lustre elaboration core.
//!
//! This crate provides foundational types used across every elaboration
//! phase:
//! - Source spans (`Span`, `Spanned`)
//! - Diagnostics (`Diagnostic`, `Severity`)
//! - Arbitrary-precision integer support (`BigInt` re-export + helpers)
//! - Centralized limits and thresholds

pub mod diagnostics;
pub mod limits;
pub mod numeric;
pub mod span;

pub use diagnostics::{Diagnostic, Severity};
pub use numeric::BigInt;
pub use span::{Span, Spanned};
