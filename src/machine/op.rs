use std::fmt;

use crate::machine::instruction_error::InstructionError;

/// 1-based instruction identity used by branches.
pub type Label = usize;

/// 1-based register index. `x1` is the output register.
pub type Register = usize;

// =============================================================================
// OP - URM operations
// =============================================================================

/// The six URM operations.
///
/// This is a closed set: the VM and the Gödel codec both match on it
/// exhaustively, so a new operation has to be wired through every consumer
/// before the crate builds again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `xR = V`
    Set { register: Register, value: u64 },

    /// `xR = xR + 1`
    Increment { register: Register },

    /// `xR = xR - 1`, floored at zero.
    Decrement { register: Register },

    /// `xD = xS`
    Copy { dest: Register, src: Register },

    /// `if xR == 0 goto T else goto F`
    ///
    /// Targets are labels, not offsets. The VM does not advance past a branch;
    /// it always lands on one of the two targets.
    Branch {
        register: Register,
        if_zero: Label,
        otherwise: Label,
    },

    /// `stop`
    Halt,
}

/// Numeric tag of each operation, as it appears first in a Gödel field vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Set = 1,
    Increment = 2,
    Decrement = 3,
    Branch = 4,
    Halt = 5,
    Copy = 6,
}

impl Opcode {
    pub fn from_tag(tag: u64) -> Option<Self> {
        Some(match tag {
            1 => Opcode::Set,
            2 => Opcode::Increment,
            3 => Opcode::Decrement,
            4 => Opcode::Branch,
            5 => Opcode::Halt,
            6 => Opcode::Copy,
            _ => return None,
        })
    }

    pub fn tag(self) -> u64 {
        self as u64
    }

    /// Number of fields in the encoded vector, tag and label included.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Set => 4,
            Opcode::Increment => 3,
            Opcode::Decrement => 3,
            Opcode::Branch => 5,
            Opcode::Halt => 2,
            Opcode::Copy => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Set => "set",
            Opcode::Increment => "increment",
            Opcode::Decrement => "decrement",
            Opcode::Branch => "branch",
            Opcode::Halt => "stop",
            Opcode::Copy => "copy",
        }
    }
}

impl Op {
    pub fn opcode(&self) -> Opcode {
        match self {
            Op::Set { .. } => Opcode::Set,
            Op::Increment { .. } => Opcode::Increment,
            Op::Decrement { .. } => Opcode::Decrement,
            Op::Copy { .. } => Opcode::Copy,
            Op::Branch { .. } => Opcode::Branch,
            Op::Halt => Opcode::Halt,
        }
    }

    /// Both branch targets, if this is a branch.
    pub fn targets(&self) -> Option<[Label; 2]> {
        match self {
            Op::Branch {
                if_zero, otherwise, ..
            } => Some([*if_zero, *otherwise]),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    /// Formats the operation in the textual grammar, without its label.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Set { register, value } => write!(f, "x{} = {}", register, value),
            Op::Increment { register } => write!(f, "x{} = x{} + 1", register, register),
            Op::Decrement { register } => write!(f, "x{} = x{} - 1", register, register),
            Op::Copy { dest, src } => write!(f, "x{} = x{}", dest, src),
            Op::Branch {
                register,
                if_zero,
                otherwise,
            } => write!(
                f,
                "if x{} == 0 goto {} else goto {}",
                register, if_zero, otherwise
            ),
            Op::Halt => write!(f, "stop"),
        }
    }
}

// =============================================================================
// INSTRUCTION - a labelled op
// =============================================================================

/// One labelled URM instruction.
///
/// Built only through the checked constructors below, which reject a label
/// or register index below 1 and a negative `Set` value. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    label: Label,
    op: Op,
}

impl Instruction {
    /// `L. xR = V`
    pub fn set(label: i64, register: i64, value: i64) -> Result<Self, InstructionError> {
        let label = checked_label(label)?;
        let register = checked_register(register)?;
        let value =
            u64::try_from(value).map_err(|_| InstructionError::InvalidRegisterInitialization {
                value,
            })?;
        Ok(Self::from_parts(label, Op::Set { register, value }))
    }

    /// `L. xR = xR + 1`
    pub fn increment(label: i64, register: i64) -> Result<Self, InstructionError> {
        Ok(Self::from_parts(
            checked_label(label)?,
            Op::Increment {
                register: checked_register(register)?,
            },
        ))
    }

    /// `L. xR = xR - 1`
    pub fn decrement(label: i64, register: i64) -> Result<Self, InstructionError> {
        Ok(Self::from_parts(
            checked_label(label)?,
            Op::Decrement {
                register: checked_register(register)?,
            },
        ))
    }

    /// `L. xD = xS`
    pub fn copy(label: i64, dest: i64, src: i64) -> Result<Self, InstructionError> {
        let label = checked_label(label)?;
        let dest = checked_register(dest)?;
        let src = checked_register(src)?;
        Ok(Self::from_parts(label, Op::Copy { dest, src }))
    }

    /// `L. if xR == 0 goto T else goto F`
    ///
    /// Targets only have to be positive here. Whether they exist is a
    /// program-level question answered by `Program::validate`.
    pub fn branch(
        label: i64,
        register: i64,
        if_zero: i64,
        otherwise: i64,
    ) -> Result<Self, InstructionError> {
        let label = checked_label(label)?;
        let register = checked_register(register)?;
        let if_zero = checked_label(if_zero)?;
        let otherwise = checked_label(otherwise)?;
        Ok(Self::from_parts(
            label,
            Op::Branch {
                register,
                if_zero,
                otherwise,
            },
        ))
    }

    /// `L. stop`
    pub fn halt(label: i64) -> Result<Self, InstructionError> {
        Ok(Self::from_parts(checked_label(label)?, Op::Halt))
    }

    /// Callers guarantee `label >= 1` and every register in `op` is `>= 1`.
    pub(crate) fn from_parts(label: Label, op: Op) -> Self {
        debug_assert!(label >= 1);
        Self { label, op }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn is_halt(&self) -> bool {
        matches!(self.op, Op::Halt)
    }
}

impl fmt::Display for Instruction {
    /// `L. <op>`, the same form the parser reads.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.label, self.op)
    }
}

fn checked_label(label: i64) -> Result<Label, InstructionError> {
    match Label::try_from(label) {
        Ok(l) if l >= 1 => Ok(l),
        _ => Err(InstructionError::InvalidLabel { label }),
    }
}

fn checked_register(register: i64) -> Result<Register, InstructionError> {
    match Register::try_from(register) {
        Ok(r) if r >= 1 => Ok(r),
        _ => Err(InstructionError::InvalidRegisterIndex { register }),
    }
}
