pub mod registers;
pub mod vm;

pub use registers::{OUTPUT_REGISTER, Registers};
pub use vm::{Vm, VmConfig};
