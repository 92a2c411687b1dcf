//! AJIT - AArch64 arithmetic JIT backend
//!
//! Emits raw A64 instruction words for arithmetic operations over
//! constant/register operands, applying constant folding and strength
//! reduction for special operand values and injecting a deterministic
//! trap for division by a compile-time-zero divisor.
//!
//! # Example
//!
//! ```
//! use ajit::{Emitter, Operand, X0, X3};
//!
//! let mut emitter = Emitter::new();
//! emitter.add(X0, Operand::from(5))?; // add x0, x0, #5
//! emitter.rem(X0, Operand::from(X3))?; // sdiv + msub pair
//! assert_eq!(emitter.words().len(), 3);
//! # Ok::<(), ajit::Error>(())
//! ```

// Re-export from the ISA crate
pub use ajit_isa::{
    FP, LR, Reg, X0, X1, X2, X3, X4, X5, X6, X7, X8, X9, X10, X11, X12, X13, X14, X15, X16, X17,
    X18, X19, X20, X21, X22, X23, X24, X25, X26, X27, X28, X29, X30,
};

mod arena;
mod arith;
mod buf;
mod emit;
mod error;
mod operand;

pub use arena::{Acquired, FAULT_SCRATCH, RegArena, SCRATCH_REGS};
pub use buf::CodeBuf;
pub use emit::Emitter;
pub use error::{Error, Result};
pub use operand::{Const, Kind, Operand};
