use thiserror::Error;

/// Raised by the checked `Instruction` constructors.
///
/// These fire at construction time, so an `Instruction` value that exists is
/// always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("invalid label {label}: labels start at 1")]
    InvalidLabel { label: i64 },

    #[error("invalid register index x{register}: registers start at x1")]
    InvalidRegisterIndex { register: i64 },

    #[error("invalid initialization value {value}: registers hold natural numbers")]
    InvalidRegisterInitialization { value: i64 },
}
