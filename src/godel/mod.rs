pub mod codec;
pub mod decode_error;
pub mod primes;

pub use codec::{
    GodelSequence, code_machine, code_single_instruction, decode, decode_machine,
    decode_single_instruction, encode,
};
pub use decode_error::DecodeError;
