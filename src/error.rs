use thiserror::Error;

use crate::frontend::parser_error::ParserError;
use crate::godel::decode_error::DecodeError;
use crate::machine::instruction_error::InstructionError;
use crate::machine::validation_error::ValidationError;

/// Any error the crate can produce, so `?` works across stages.
#[derive(Debug, Error)]
pub enum UrmError {
    #[error("instruction error: {0}")]
    Instruction(#[from] InstructionError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("parse error: {0}")]
    Parse(#[from] ParserError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("serialization error: {0}")]
    Serialization(postcard::Error),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
