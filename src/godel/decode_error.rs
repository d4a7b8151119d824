use thiserror::Error;

use crate::machine::instruction_error::InstructionError;

/// Why a number (or a sequence of them) is not a valid Gödel code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("0 is not a Gödel number")]
    Zero,

    /// Decoding stopped at a prime that does not divide the rest, while the
    /// rest was still greater than 1.
    #[error("prime {prime} (position {position}) does not divide the number")]
    MissingPrimeFactor { position: usize, prime: u64 },

    #[error("empty field vector has no opcode")]
    Empty,

    #[error("unknown opcode {opcode}")]
    UnknownOpcode { opcode: u64 },

    #[error("{name} takes {expected} fields, found {found}")]
    WrongArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("decoded field does not fit an instruction: {0}")]
    FieldOverflow(u64),

    #[error(transparent)]
    Instruction(#[from] InstructionError),
}
