pub mod instruction_error;
pub mod listing;
pub mod op;
pub mod program;
pub mod validation_error;

pub use instruction_error::InstructionError;
pub use op::{Instruction, Label, Op, Opcode, Register};
pub use program::{IntoInstruction, Program};
pub use validation_error::ValidationError;
