//! Identifier & index algebra for the lustre elaboration core (§4.1).

pub mod fresh;
pub mod ident;
pub mod symbol;

pub use fresh::{FreshCallGen, FreshVarGen};
pub use ident::{Ident, Index, is_reserved_base};
pub use symbol::Symbol;
