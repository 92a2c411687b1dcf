//! Arithmetic operation emission.
//!
//! Each operation takes a destination register `z` used as a
//! read-modify-write accumulator and (except `neg`) one operand `a`.
//! Constant operands are inspected against an ordered peephole table
//! before falling through to the register-register form:
//!
//! | operator | special value          | action                        |
//! |----------|------------------------|-------------------------------|
//! | add/sub  | 0                      | eliminate                     |
//! | add/sub  | magnitude in 0..4096   | single immediate instruction  |
//! | mul      | 0                      | load-immediate-0              |
//! | mul      | 1                      | eliminate                     |
//! | mul      | 2                      | rewrite as self-add           |
//! | quo/rem  | 0                      | deterministic trap sequence   |
//! | quo      | 1                      | eliminate                     |
//! | rem      | positive power of two  | and-immediate with v-1        |
//!
//! First match wins. Every rewrite is observationally transparent:
//! bit-identical to the unoptimized form for all inputs, including
//! signed-overflow wraparound.

use ajit_isa::{Reg, add_imm, add_reg, and_mask, and_reg, mul, msub, neg, sdiv, sub_imm, sub_reg};
use tracing::trace;

use crate::emit::{Emitter, check_kind};
use crate::error::Result;
use crate::operand::Operand;

impl Emitter {
    /// z += a
    pub fn add(&mut self, z: Reg, a: Operand) -> Result<()> {
        if let Operand::Const(c) = a {
            let val = check_kind(c)?;
            if self.add_const(z, val) || self.sub_const(z, val.wrapping_neg()) {
                return Ok(());
            }
        }
        let tmp = self.acquire(a)?;
        self.buf.push(add_reg(z, z, tmp.reg));
        self.release(tmp)
    }

    /// z -= a
    pub fn sub(&mut self, z: Reg, a: Operand) -> Result<()> {
        if let Operand::Const(c) = a {
            let val = check_kind(c)?;
            if self.sub_const(z, val) || self.add_const(z, val.wrapping_neg()) {
                return Ok(());
            }
        }
        let tmp = self.acquire(a)?;
        self.buf.push(sub_reg(z, z, tmp.reg));
        self.release(tmp)
    }

    /// Fold `z += val` into nothing (val 0) or one add-immediate
    /// (val in 0..4096). Returns false when neither applies.
    fn add_const(&mut self, z: Reg, val: i64) -> bool {
        if val == 0 {
            true
        } else if (val as u64) < 4096 {
            trace!(z = %z, val, "add: immediate fold");
            self.buf.push(add_imm(z, z, val as u32));
            true
        } else {
            false
        }
    }

    /// Mirror of [`add_const`](Self::add_const) for `z -= val`.
    fn sub_const(&mut self, z: Reg, val: i64) -> bool {
        if val == 0 {
            true
        } else if (val as u64) < 4096 {
            trace!(z = %z, val, "sub: immediate fold");
            self.buf.push(sub_imm(z, z, val as u32));
            true
        } else {
            false
        }
    }

    /// z *= a
    pub fn mul(&mut self, z: Reg, a: Operand) -> Result<()> {
        if let Operand::Const(c) = a {
            match check_kind(c)? {
                // exact result regardless of prior z, and never touches
                // a register for the operand
                0 => {
                    trace!(z = %z, "mul: folded to load-immediate-0");
                    self.load_const(z, 0);
                    return Ok(());
                }
                1 => return Ok(()),
                // self-double instead of loading the constant
                2 => {
                    trace!(z = %z, "mul: rewritten as self-add");
                    return self.add(z, Operand::Reg(z));
                }
                _ => {}
            }
        }
        let tmp = self.acquire(a)?;
        self.buf.push(mul(z, z, tmp.reg));
        self.release(tmp)
    }

    /// z /= a, truncating signed division.
    pub fn quo(&mut self, z: Reg, a: Operand) -> Result<()> {
        if let Operand::Const(c) = a {
            match check_kind(c)? {
                0 => {
                    self.emit_div_zero_fault();
                    return Ok(());
                }
                1 => return Ok(()),
                _ => {}
            }
        }
        let tmp = self.acquire(a)?;
        self.buf.push(sdiv(z, z, tmp.reg));
        self.release(tmp)
    }

    /// z %= a, truncating remainder (sign follows the dividend).
    ///
    /// There is no native remainder instruction; the general form divides
    /// into a fresh quotient register and fuses the multiply-subtract back
    /// into z.
    pub fn rem(&mut self, z: Reg, a: Operand) -> Result<()> {
        if let Operand::Const(c) = a {
            let val = check_kind(c)?;
            if val == 0 {
                self.emit_div_zero_fault();
                return Ok(());
            } else if val > 0 && val & (val - 1) == 0 {
                // z %= 2^k  ->  z &= 2^k - 1. Truncating division by a
                // positive power of two keeps exactly the low bits.
                // i64::MIN also passes the bit test but masking with
                // i64::MAX is wrong for negative dividends, hence val > 0.
                trace!(z = %z, val, "rem: rewritten as mask");
                return self.and_const(z, val - 1);
            }
        }
        let den = self.acquire(a)?;
        let quo = match self.regs.alloc() {
            Ok(reg) => reg,
            Err(err) => {
                self.release(den)?;
                return Err(err);
            }
        };
        self.buf.push(sdiv(quo, z, den.reg)); // quo = z / den
        self.buf.push(msub(z, quo, den.reg, z)); // z = z - quo * den
        self.regs.free(quo)?;
        self.release(den)
    }

    /// z &= val
    ///
    /// Needed by the remainder mask rewrite; 0 folds to load-immediate-0,
    /// -1 eliminates, low-ones masks encode as one bitmask-immediate AND,
    /// anything else takes the register path.
    pub fn and_const(&mut self, z: Reg, val: i64) -> Result<()> {
        if val == 0 {
            self.load_const(z, 0);
        } else if val == -1 {
            // identity
        } else if val > 0 && (val as u64 + 1).is_power_of_two() {
            self.buf.push(and_mask(z, z, (val as u64).trailing_ones()));
        } else {
            let tmp = self.acquire(Operand::from(val))?;
            self.buf.push(and_reg(z, z, tmp.reg));
            self.release(tmp)?;
        }
        Ok(())
    }

    /// z = -z. Single fixed-pattern instruction, no operand inspection.
    pub fn neg(&mut self, z: Reg) {
        self.buf.push(neg(z, z));
    }
}
