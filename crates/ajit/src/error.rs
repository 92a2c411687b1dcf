use ajit_isa::Reg;
use thiserror::Error;

use crate::operand::Kind;

/// Code generation errors.
///
/// All of these are internal-misuse reports: they abort the current
/// compilation when propagated and are never recovered locally. The
/// deliberate division-by-zero trap sequence is successful emission, not
/// an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("arithmetic requires a 64-bit integer operand, got {0}")]
    UnsupportedKind(Kind),
    #[error("no free scratch register")]
    RegistersExhausted,
    #[error("release of {0}, which is not an allocated scratch register")]
    BadRelease(Reg),
}

pub type Result<T> = std::result::Result<T, Error>;
