pub mod lexer;
pub mod parser;
pub mod parser_error;

pub use parser::{parse_instruction, parse_program};
pub use parser_error::ParserError;
