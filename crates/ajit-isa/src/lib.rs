//! A64 instruction subset for the arithmetic JIT backend.
//!
//! This crate provides register identifiers and bit-exact instruction-word
//! packing for the handful of A64 instruction families the code generator
//! emits. Encoding functions are stateless; each one packs a single family
//! per the Arm ARM field layout.

mod encode;
mod types;

pub use encode::*;
pub use types::*;
