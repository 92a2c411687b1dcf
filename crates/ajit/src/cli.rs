//! CLI definitions and the operation grammar.

use ajit::{Const, Operand, Reg};
use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "ajit")]
#[command(about = "AArch64 arithmetic JIT - emits raw A64 instruction words")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets the trace filter)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit instruction words for a sequence of operations
    Emit {
        /// Operations, e.g. "add x0, 5" "rem x0, x3" "neg x0"
        #[arg(value_name = "OP", required = true)]
        ops: Vec<String>,

        /// Print the little-endian byte image instead of one word per line
        #[arg(long)]
        bytes: bool,
    },
}

/// One parsed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add(Reg, Operand),
    Sub(Reg, Operand),
    Mul(Reg, Operand),
    Quo(Reg, Operand),
    Rem(Reg, Operand),
    Neg(Reg),
}

/// Parse `"<op> <xreg>[, <operand>]"` where the operand is a register
/// (`x3`) or a signed 64-bit constant (decimal or 0x hex).
pub fn parse_op(s: &str) -> Result<Op, String> {
    let s = s.trim();
    let (name, rest) = s
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("malformed operation {s:?}"))?;
    let rest = rest.trim();

    if name == "neg" {
        return Ok(Op::Neg(parse_reg(rest)?));
    }

    let (z, a) = rest
        .split_once(',')
        .ok_or_else(|| format!("{name} needs two operands, got {rest:?}"))?;
    let z = parse_reg(z.trim())?;
    let a = parse_operand(a.trim())?;
    match name {
        "add" => Ok(Op::Add(z, a)),
        "sub" => Ok(Op::Sub(z, a)),
        "mul" => Ok(Op::Mul(z, a)),
        "quo" => Ok(Op::Quo(z, a)),
        "rem" => Ok(Op::Rem(z, a)),
        _ => Err(format!("unknown operation {name:?}")),
    }
}

fn parse_reg(s: &str) -> Result<Reg, String> {
    let n: u8 = s
        .strip_prefix('x')
        .and_then(|n| n.parse().ok())
        .filter(|&n| n <= 30)
        .ok_or_else(|| format!("bad register {s:?}, expected x0-x30"))?;
    Ok(Reg::new(n))
}

fn parse_operand(s: &str) -> Result<Operand, String> {
    if s.starts_with('x') {
        return Ok(Operand::Reg(parse_reg(s)?));
    }
    let (body, negative) = match s.strip_prefix('-') {
        Some(body) => (body, true),
        None => (s, false),
    };
    let magnitude = match body.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|e| format!("bad constant {s:?}: {e}")),
        None => body.parse().map_err(|e| format!("bad constant {s:?}: {e}")),
    }?;
    let val = if negative {
        (magnitude as i64).wrapping_neg()
    } else {
        magnitude as i64
    };
    Ok(Operand::Const(Const::int64(val)))
}
