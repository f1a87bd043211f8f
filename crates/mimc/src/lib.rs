//! MiMC hash over prime fields with R1CS gadgets.
//!
//! The crate exposes the same compression function twice:
//! - [`native`]: plain field arithmetic, used to build witnesses and trees
//! - [`gadgets`]: `FpVar` constraints, used inside circuits
//!
//! Both read their round constants from one [`MimcParameters`] value, so a
//! witness computed natively always satisfies the in-circuit relation.

pub mod gadgets;
pub mod native;
mod params;

pub use gadgets::{compress_var, encrypt_var, hash_chain_var, hash_two_var};
pub use native::{compress, encrypt, hash_chain, hash_two, MimcHasher};
pub use params::{default_rounds, MimcParameters, ParameterError, DEFAULT_SEED, SBOX_EXPONENT};
