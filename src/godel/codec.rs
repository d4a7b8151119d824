//! Gödel numbering of URM instructions and programs.
//!
//! A field vector `[n1, .., nk]` maps to `p1^(n1+1) * .. * pk^(nk+1)`, with
//! `pi` the i-th prime. Shifting every exponent by one keeps each prime
//! present, so the vector length is recoverable and decoding is exact.
//!
//! Instruction field vectors, opcode first and label second:
//!
//! | op        | fields                                 |
//! |-----------|----------------------------------------|
//! | set       | `[1, label, register, value]`          |
//! | increment | `[2, label, register]`                 |
//! | decrement | `[3, label, register]`                 |
//! | branch    | `[4, label, register, if_zero, else]`  |
//! | stop      | `[5, label]`                           |
//! | copy      | `[6, label, dest, src]`                |

use std::ops::Deref;

use num_bigint::BigUint;
use num_traits::{One, Pow, Zero};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::UrmError;
use crate::godel::decode_error::DecodeError;
use crate::godel::primes::Primes;
use crate::machine::op::{Instruction, Op, Opcode};
use crate::machine::program::Program;
use crate::machine::validation_error::ValidationError;

/// The encoded form of a program: one Gödel number per instruction, in
/// slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GodelSequence(Vec<BigUint>);

impl GodelSequence {
    pub fn numbers(&self) -> &[BigUint] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<BigUint> {
        self.0
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, UrmError> {
        postcard::to_allocvec(self).map_err(UrmError::Serialization)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, UrmError> {
        postcard::from_bytes(bytes).map_err(UrmError::Serialization)
    }
}

impl Deref for GodelSequence {
    type Target = [BigUint];

    fn deref(&self) -> &[BigUint] {
        &self.0
    }
}

impl From<Vec<BigUint>> for GodelSequence {
    fn from(numbers: Vec<BigUint>) -> Self {
        GodelSequence(numbers)
    }
}

impl FromIterator<BigUint> for GodelSequence {
    fn from_iter<T: IntoIterator<Item = BigUint>>(iter: T) -> Self {
        GodelSequence(iter.into_iter().collect())
    }
}

impl IntoIterator for GodelSequence {
    type Item = BigUint;
    type IntoIter = std::vec::IntoIter<BigUint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Vectors <-> numbers
// =============================================================================

/// `2^(n1+1) * 3^(n2+1) * 5^(n3+1) * ...`
///
/// The empty vector encodes to 1. Fields coming from instructions are at
/// most `i64::MAX`, so the `+ 1` cannot overflow for them.
pub fn encode(fields: &[u64]) -> BigUint {
    fields
        .iter()
        .zip(Primes::new())
        .fold(BigUint::one(), |acc, (&n, prime)| {
            acc * Pow::pow(BigUint::from(prime), n + 1)
        })
}

/// Inverse of `encode`.
///
/// Divides out 2, 3, 5, ... in turn; each prime's multiplicity minus one is
/// the next field. Stops once the rest is 1. A prime with multiplicity zero
/// before that point means the number is not in `encode`'s image.
pub fn decode(number: &BigUint) -> Result<Vec<u64>, DecodeError> {
    if number.is_zero() {
        return Err(DecodeError::Zero);
    }

    let mut rest = number.clone();
    let mut fields = Vec::new();

    for (position, prime) in Primes::new().enumerate() {
        if rest.is_one() {
            break;
        }

        let divisor = BigUint::from(prime);
        let mut count: u64 = 0;
        while (&rest % &divisor).is_zero() {
            rest /= &divisor;
            count += 1;
        }

        if count == 0 {
            return Err(DecodeError::MissingPrimeFactor {
                position: position + 1,
                prime,
            });
        }
        fields.push(count - 1);
    }

    Ok(fields)
}

// =============================================================================
// Instructions
// =============================================================================

/// The field vector for one instruction.
pub fn fields(instruction: &Instruction) -> Vec<u64> {
    let tag = instruction.op().opcode().tag();
    let label = instruction.label() as u64;

    match *instruction.op() {
        Op::Set { register, value } => vec![tag, label, register as u64, value],
        Op::Increment { register } => vec![tag, label, register as u64],
        Op::Decrement { register } => vec![tag, label, register as u64],
        Op::Branch {
            register,
            if_zero,
            otherwise,
        } => vec![
            tag,
            label,
            register as u64,
            if_zero as u64,
            otherwise as u64,
        ],
        Op::Halt => vec![tag, label],
        Op::Copy { dest, src } => vec![tag, label, dest as u64, src as u64],
    }
}

/// Rebuilds an instruction from its field vector, through the checked
/// constructors.
pub fn instruction_from_fields(fields: &[u64]) -> Result<Instruction, DecodeError> {
    let (&tag, _) = fields.split_first().ok_or(DecodeError::Empty)?;
    let opcode = Opcode::from_tag(tag).ok_or(DecodeError::UnknownOpcode { opcode: tag })?;

    if fields.len() != opcode.arity() {
        return Err(DecodeError::WrongArity {
            name: opcode.name(),
            expected: opcode.arity(),
            found: fields.len(),
        });
    }

    let field = |i: usize| -> Result<i64, DecodeError> {
        i64::try_from(fields[i]).map_err(|_| DecodeError::FieldOverflow(fields[i]))
    };

    let instruction = match opcode {
        Opcode::Set => Instruction::set(field(1)?, field(2)?, field(3)?)?,
        Opcode::Increment => Instruction::increment(field(1)?, field(2)?)?,
        Opcode::Decrement => Instruction::decrement(field(1)?, field(2)?)?,
        Opcode::Branch => Instruction::branch(field(1)?, field(2)?, field(3)?, field(4)?)?,
        Opcode::Halt => Instruction::halt(field(1)?)?,
        Opcode::Copy => Instruction::copy(field(1)?, field(2)?, field(3)?)?,
    };

    Ok(instruction)
}

pub fn code_single_instruction(instruction: &Instruction) -> BigUint {
    let code = encode(&fields(instruction));
    trace!(%instruction, bits = code.bits(), "encoded instruction");
    code
}

pub fn decode_single_instruction(number: &BigUint) -> Result<Instruction, DecodeError> {
    let instruction = instruction_from_fields(&decode(number)?)?;
    trace!(%instruction, "decoded instruction");
    Ok(instruction)
}

// =============================================================================
// Programs
// =============================================================================

/// Validates `program` (possibly appending its implicit stop), then encodes
/// every non-empty slot in slot order.
pub fn code_machine(program: &mut Program) -> Result<GodelSequence, ValidationError> {
    program.validate()?;
    let sequence: GodelSequence = program
        .instructions()
        .map(code_single_instruction)
        .collect();
    debug!(instructions = sequence.len(), "encoded program");
    Ok(sequence)
}

/// Decodes each number and `add`s it to a fresh program.
///
/// The result is not validated; running or re-encoding it does that.
pub fn decode_machine(numbers: &[BigUint]) -> Result<Program, DecodeError> {
    let mut program = Program::new();
    for number in numbers {
        program.add(decode_single_instruction(number)?);
    }
    debug!(instructions = program.len(), "decoded program");
    Ok(program)
}
