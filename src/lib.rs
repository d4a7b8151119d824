//! # URM
//!
//! An Unbounded Register Machine: numbered arbitrary-precision registers, six
//! instructions, and label-based control flow.
//!
//! - [`machine`]: instructions and the label-indexed program store
//! - [`frontend`]: the `L. xR = ...` textual grammar
//! - [`runtime`]: the register file and the execution engine
//! - [`godel`]: Gödel numbering of instructions and programs
//!
//! ```
//! use num_bigint::BigUint;
//! use urm::{Program, Vm};
//!
//! let mut add = Program::parse(
//!     "1. x1 = x2
//!      2. if x3 == 0 goto 6 else goto 3
//!      3. x1 = x1 + 1
//!      4. x3 = x3 - 1
//!      5. if x3 == 0 goto 6 else goto 3
//!      6. stop",
//! )
//! .unwrap();
//!
//! assert_eq!(Vm::new().run(&mut add, &[7, 5]).unwrap(), BigUint::from(12u32));
//! ```

pub mod error;
pub mod frontend;
pub mod godel;
pub mod machine;
pub mod runtime;

pub use error::UrmError;
pub use godel::{GodelSequence, code_machine, decode_machine};
pub use machine::{Instruction, Label, Op, Program, Register};
pub use runtime::{Registers, Vm, VmConfig};
