//! Code-generation context and emission primitives.

use ajit_isa::{Reg, movk, movn, movz, str_imm};
use tracing::debug;

use crate::arena::{Acquired, FAULT_SCRATCH, RegArena};
use crate::buf::CodeBuf;
use crate::error::{Error, Result};
use crate::operand::{Const, Operand};

/// Mutable code-generation context: one instruction stream plus one
/// scratch-register arena, mutated strictly sequentially by one
/// code-generation pass. Parallel pipelines use one `Emitter` per unit;
/// nothing is shared.
#[derive(Debug, Default)]
pub struct Emitter {
    pub(crate) buf: CodeBuf,
    pub(crate) regs: RegArena,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            buf: CodeBuf::new(),
            regs: RegArena::new(),
        }
    }

    /// Emitted words so far.
    pub fn words(&self) -> &[u32] {
        self.buf.words()
    }

    /// Take the emitted words, leaving the stream empty.
    pub fn take_words(&mut self) -> Vec<u32> {
        self.buf.take_words()
    }

    /// The underlying instruction stream.
    pub fn buf(&self) -> &CodeBuf {
        &self.buf
    }

    /// The scratch-register arena (useful for balance checks).
    pub fn arena(&self) -> &RegArena {
        &self.regs
    }

    /// Bring an operand into a hardware register.
    ///
    /// A register operand is hardware-resident already and is borrowed; a
    /// constant is synthesized into a freshly claimed scratch register,
    /// which the returned record owns. Every acquisition must be paired
    /// with exactly one [`release`](Self::release) on every exit path.
    pub fn acquire(&mut self, a: Operand) -> Result<Acquired> {
        match a {
            Operand::Reg(reg) => Ok(Acquired { reg, owned: false }),
            Operand::Const(c) => {
                let val = check_kind(c)?;
                let reg = self.regs.alloc()?;
                self.load_const(reg, val);
                Ok(Acquired { reg, owned: true })
            }
        }
    }

    /// Release one acquisition: frees owned registers, leaves borrowed
    /// ones with the caller.
    pub fn release(&mut self, acq: Acquired) -> Result<()> {
        if acq.owned {
            self.regs.free(acq.reg)?;
        }
        Ok(())
    }

    /// Synthesize a 64-bit constant into `rd`.
    ///
    /// Decomposes the value into 16-bit chunks: a `movn` base when at
    /// least two chunks are all-ones, otherwise a `movz` base, then one
    /// `movk` per remaining chunk that differs from the base fill.
    pub fn load_const(&mut self, rd: Reg, val: i64) {
        let u = val as u64;
        let chunks: [u16; 4] = std::array::from_fn(|i| (u >> (16 * i)) as u16);
        let ones = chunks.iter().filter(|&&c| c == 0xFFFF).count();
        if ones >= 2 {
            let first = chunks.iter().position(|&c| c != 0xFFFF).unwrap_or(0);
            self.buf.push(movn(rd, !chunks[first], first as u32));
            for (i, &c) in chunks.iter().enumerate().skip(first + 1) {
                if c != 0xFFFF {
                    self.buf.push(movk(rd, c, i as u32));
                }
            }
        } else {
            let first = chunks.iter().position(|&c| c != 0).unwrap_or(0);
            self.buf.push(movz(rd, chunks[first], first as u32));
            for (i, &c) in chunks.iter().enumerate().skip(first + 1) {
                if c != 0 {
                    self.buf.push(movk(rd, c, i as u32));
                }
            }
        }
    }

    /// Deterministic trap for division by a compile-time-zero divisor:
    /// zero the designated scratch, then store through it. `sdiv` itself
    /// does not trap on zero, so a faithful division-by-zero semantic has
    /// to be manufactured; the store to address 0 faults unconditionally
    /// at execution.
    pub(crate) fn emit_div_zero_fault(&mut self) {
        debug!(scratch = %FAULT_SCRATCH, "constant zero divisor, emitting trap sequence");
        self.load_const(FAULT_SCRATCH, 0);
        self.buf.push(str_imm(FAULT_SCRATCH, FAULT_SCRATCH, 0));
    }
}

/// Arithmetic here is 64-bit only; narrower constant kinds are a misuse
/// of the operand model and abort the compilation.
pub(crate) fn check_kind(c: Const) -> Result<i64> {
    if c.kind.size() == 8 {
        Ok(c.val)
    } else {
        Err(Error::UnsupportedKind(c.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ajit_isa::{X5, X9};
    use crate::operand::Kind;

    #[test]
    fn test_load_const_single_word() {
        let mut e = Emitter::new();
        e.load_const(X9, 0);
        e.load_const(X9, 5);
        e.load_const(X9, -1);
        e.load_const(X9, -5);
        assert_eq!(
            e.words(),
            &[
                0xD280_0009, // movz x9, #0
                0xD280_00A9, // movz x9, #5
                0x9280_0009, // movn x9, #0
                0x9280_0089, // movn x9, #4
            ]
        );
    }

    #[test]
    fn test_load_const_chunked() {
        let mut e = Emitter::new();
        e.load_const(X9, 0xDEAD_BEEF);
        assert_eq!(
            e.words(),
            &[
                0xD297_DDE9, // movz x9, #0xbeef
                0xF2BB_D5A9, // movk x9, #0xdead, lsl #16
            ]
        );
    }

    #[test]
    fn test_load_const_skips_zero_chunks() {
        let mut e = Emitter::new();
        // only chunk 1 is nonzero
        e.load_const(X9, 0x1_0000);
        assert_eq!(e.words(), &[0xD2A0_0029]); // movz x9, #1, lsl #16
    }

    #[test]
    fn test_load_const_negative_chunked() {
        let mut e = Emitter::new();
        // 0xFFFF_FFFF_0000_1234: two all-ones chunks, movn base
        e.load_const(X9, 0xFFFF_FFFF_0000_1234_u64 as i64);
        assert_eq!(
            e.words(),
            &[
                0x9280_0009 | 0xEDCB << 5, // movn x9, #0xedcb
                0xF2A0_0009,               // movk x9, #0, lsl #16
            ]
        );
    }

    #[test]
    fn test_acquire_register_is_borrowed() {
        let mut e = Emitter::new();
        let acq = e.acquire(Operand::Reg(X5)).unwrap();
        assert_eq!(acq.reg, X5);
        assert!(!acq.owned);
        e.release(acq).unwrap();
        assert!(e.words().is_empty());
        assert!(e.arena().all_free());
    }

    #[test]
    fn test_acquire_const_is_owned() {
        let mut e = Emitter::new();
        let acq = e.acquire(Operand::from(42)).unwrap();
        assert_eq!(acq.reg, X9);
        assert!(acq.owned);
        assert_eq!(e.words().len(), 1);
        e.release(acq).unwrap();
        assert!(e.arena().all_free());
    }

    #[test]
    fn test_acquire_rejects_narrow_kind() {
        let mut e = Emitter::new();
        let narrow = Operand::Const(Const::new(42, Kind::Int32));
        assert!(matches!(
            e.acquire(narrow),
            Err(Error::UnsupportedKind(Kind::Int32))
        ));
        assert!(e.arena().all_free());
    }

    #[test]
    fn test_div_zero_fault_words() {
        let mut e = Emitter::new();
        e.emit_div_zero_fault();
        assert_eq!(
            e.words(),
            &[
                0xD280_001D, // movz x29, #0
                0xF900_03BD, // str x29, [x29]
            ]
        );
    }
}
