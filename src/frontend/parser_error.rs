use thiserror::Error;

use crate::machine::instruction_error::InstructionError;

/// A parsing error with source location.
///
/// `line` and `col` are 1-based positions from the lexer spans. Lines that are
/// well-formed but describe an illegal instruction (`x0 = 1`, `goto 0`) carry
/// the constructor's error as their source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("{line}:{col}: {message}")]
    Syntax {
        message: String,
        line: usize,
        col: usize,
    },

    #[error("{line}:{col}: {source}")]
    Instruction {
        #[source]
        source: InstructionError,
        line: usize,
        col: usize,
    },
}

impl ParserError {
    pub fn line(&self) -> usize {
        match self {
            ParserError::Syntax { line, .. } | ParserError::Instruction { line, .. } => *line,
        }
    }

    pub fn col(&self) -> usize {
        match self {
            ParserError::Syntax { col, .. } | ParserError::Instruction { col, .. } => *col,
        }
    }
}
