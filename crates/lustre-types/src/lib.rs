//! Type algebra for the lustre elaboration core (§3, §4.2).

pub mod error;
pub mod ty;

pub use error::TypeError;
pub use ty::{Type, check_type};
