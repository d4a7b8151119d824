use std::fmt;

use tracing::debug;

use crate::error::UrmError;
use crate::frontend::parser::{parse_instruction, parse_program};
use crate::frontend::parser_error::ParserError;
use crate::machine::instruction_error::InstructionError;
use crate::machine::op::{Instruction, Label, Op};
use crate::machine::validation_error::ValidationError;

/// A URM program: instructions stored by label.
///
/// Storage is sparse. `slots[label - 1]` holds the instruction with that
/// label, and labels nobody added stay `None`; the VM steps over them as
/// no-ops. Compaction only happens when reading through `instructions()`.
///
/// Two programs are equal when their slots are.
#[derive(Debug, Clone, Default)]
pub struct Program {
    slots: Vec<Option<Instruction>>,
    /// Label of the `stop` that `validate` added, if any. It does not count
    /// towards the terminal label.
    implicit_stop: Option<Label>,
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for Program {}

/// Anything `Program::add_all` can admit.
///
/// Prebuilt instructions and textual lines go through the same checked
/// constructors, so both fail with the same construction errors.
pub trait IntoInstruction {
    fn into_instruction(self) -> Result<Instruction, UrmError>;
}

impl IntoInstruction for Instruction {
    fn into_instruction(self) -> Result<Instruction, UrmError> {
        Ok(self)
    }
}

impl IntoInstruction for Result<Instruction, InstructionError> {
    fn into_instruction(self) -> Result<Instruction, UrmError> {
        Ok(self?)
    }
}

impl IntoInstruction for &str {
    fn into_instruction(self) -> Result<Instruction, UrmError> {
        Ok(parse_instruction(self)?)
    }
}

impl IntoInstruction for String {
    fn into_instruction(self) -> Result<Instruction, UrmError> {
        self.as_str().into_instruction()
    }
}

impl IntoInstruction for &String {
    fn into_instruction(self) -> Result<Instruction, UrmError> {
        self.as_str().into_instruction()
    }
}

impl Program {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            implicit_stop: None,
        }
    }

    /// Parses a whole program in the textual grammar, one instruction per
    /// line. Blank lines and `#` comments are skipped.
    pub fn parse(source: &str) -> Result<Self, ParserError> {
        let mut program = Program::new();
        for instruction in parse_program(source)? {
            program.add(instruction);
        }
        Ok(program)
    }

    /// Stores `instruction` at slot `label - 1`, replacing whatever had the
    /// same label.
    pub fn add(&mut self, instruction: Instruction) {
        if self.implicit_stop == Some(instruction.label()) {
            self.implicit_stop = None;
        }
        let slot = instruction.label() - 1;
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(instruction);
    }

    /// `add` for each item in order. Stops at the first item that fails to
    /// convert; items before it stay added.
    pub fn add_all<I>(&mut self, items: I) -> Result<(), UrmError>
    where
        I: IntoIterator,
        I::Item: IntoInstruction,
    {
        for item in items {
            self.add(item.into_instruction()?);
        }
        Ok(())
    }

    /// Raw storage, gaps included.
    pub fn slots(&self) -> &[Option<Instruction>] {
        &self.slots
    }

    pub fn get(&self, label: Label) -> Option<&Instruction> {
        label
            .checked_sub(1)
            .and_then(|slot| self.slots.get(slot))
            .and_then(Option::as_ref)
    }

    /// Non-empty slots in slot order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.slots.iter().flatten()
    }

    /// Number of non-empty slots.
    pub fn len(&self) -> usize {
        self.instructions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `n + 1` for the `n` instructions added by the caller. A jump here
    /// ends a run, whatever the slot holds.
    pub fn terminal_label(&self) -> Label {
        let implicit = usize::from(self.implicit_stop.is_some());
        self.len() - implicit + 1
    }

    /// Checks branch targets and the single-stop rule, and returns the
    /// terminal label.
    ///
    /// With `n` instructions, every branch target must lie in `1..=n + 1`.
    /// `n + 1` is the terminal label: a jump there ends the run. Two or more
    /// `stop`s is an error. With none, a `stop` is added at label `n + 1`, or
    /// right after the last slot when a sparse program already uses that
    /// label. The added `stop` stays and is remembered, so a second call
    /// returns the same terminal label.
    pub fn validate(&mut self) -> Result<Label, ValidationError> {
        let count = self.len();
        let terminal = self.terminal_label();

        for instruction in self.instructions() {
            if let Some(targets) = instruction.op().targets() {
                for target in targets {
                    if target == 0 || target > terminal {
                        return Err(ValidationError::InvalidBranchTarget {
                            label: instruction.label(),
                            target,
                            max: terminal,
                        });
                    }
                }
            }
        }

        let halts: Vec<Label> = self
            .instructions()
            .filter(|i| i.is_halt())
            .map(Instruction::label)
            .collect();

        match halts.len() {
            0 => {
                let label = if self.get(terminal).is_none() {
                    terminal
                } else {
                    self.slots.len() + 1
                };
                debug!(label, instructions = count, "appending implicit stop");
                self.add(Instruction::from_parts(label, Op::Halt));
                self.implicit_stop = Some(label);
            }
            1 => {}
            _ => return Err(ValidationError::MultipleHalts { labels: halts }),
        }

        debug!(
            instructions = self.len(),
            slots = self.slots.len(),
            terminal,
            "program validated"
        );
        Ok(terminal)
    }
}

impl fmt::Display for Program {
    /// One instruction per line, gaps omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.instructions().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        let mut program = Program::new();
        for instruction in iter {
            program.add(instruction);
        }
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halt_count(program: &Program) -> usize {
        program.instructions().filter(|i| i.is_halt()).count()
    }

    #[test]
    fn test_add_places_by_label() {
        let mut program = Program::new();
        program.add(Instruction::increment(3, 1).unwrap());
        assert_eq!(program.slots().len(), 3);
        assert!(program.slots()[0].is_none());
        assert!(program.slots()[1].is_none());
        assert_eq!(program.get(3).unwrap().label(), 3);
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_add_last_write_wins() {
        let mut program = Program::new();
        program.add(Instruction::increment(1, 1).unwrap());
        program.add(Instruction::decrement(1, 2).unwrap());
        assert_eq!(program.len(), 1);
        assert_eq!(*program.get(1).unwrap().op(), Op::Decrement { register: 2 });
    }

    #[test]
    fn test_add_all_mixes_prebuilt_and_textual() {
        let mut program = Program::new();
        program
            .add_all([Instruction::set(1, 1, 3), Instruction::increment(2, 1)])
            .unwrap();
        program.add_all(["3. stop"]).unwrap();
        assert_eq!(program.len(), 3);
        assert!(program.get(3).unwrap().is_halt());
    }

    #[test]
    fn test_add_all_surfaces_construction_errors() {
        let mut program = Program::new();
        let err = program
            .add_all([Instruction::set(1, 1, 3), Instruction::set(2, 0, 1)])
            .unwrap_err();
        assert!(matches!(
            err,
            UrmError::Instruction(InstructionError::InvalidRegisterIndex { register: 0 })
        ));
        // the first item was admitted before the failure
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_validate_synthesizes_halt() {
        let mut program = Program::new();
        program.add_all(["1. x1 = 1", "2. x1 = x1 + 1"]).unwrap();
        program.validate().unwrap();
        assert_eq!(program.len(), 3);
        assert!(program.get(3).unwrap().is_halt());
    }

    #[test]
    fn test_validate_empty_program() {
        let mut program = Program::new();
        program.validate().unwrap();
        assert_eq!(program.len(), 1);
        assert!(program.get(1).unwrap().is_halt());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut program = Program::new();
        program.add_all(["1. x1 = 1"]).unwrap();
        program.validate().unwrap();
        let once = program.clone();
        program.validate().unwrap();
        assert_eq!(program, once);
        assert_eq!(halt_count(&program), 1);
    }

    #[test]
    fn test_validate_branch_to_implicit_halt() {
        let mut program = Program::new();
        program
            .add_all(["1. x1 = 1", "2. if x1 == 0 goto 3 else goto 3"])
            .unwrap();
        program.validate().unwrap();
        assert!(program.get(3).unwrap().is_halt());
    }

    #[test]
    fn test_validate_rejects_target_past_end() {
        let mut program = Program::new();
        program
            .add_all([
                "1. x1 = 1",
                "2. x1 = x1 + 1",
                "3. if x1 == 0 goto 4 else goto 6",
                "4. stop",
            ])
            .unwrap();
        assert_eq!(
            program.validate(),
            Err(ValidationError::InvalidBranchTarget {
                label: 3,
                target: 6,
                max: 5
            })
        );
    }

    #[test]
    fn test_validate_rejects_multiple_halts() {
        let mut program = Program::new();
        program
            .add_all(["1. stop", "2. x1 = x1 + 1", "3. stop"])
            .unwrap();
        assert_eq!(
            program.validate(),
            Err(ValidationError::MultipleHalts { labels: vec![1, 3] })
        );
    }

    #[test]
    fn test_failed_program_can_be_fixed() {
        let mut program = Program::new();
        program.add_all(["1. stop", "2. stop"]).unwrap();
        assert!(program.validate().is_err());
        program.add(Instruction::increment(2, 1).unwrap());
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_sparse_program_halt_goes_after_last_slot() {
        let mut program = Program::new();
        program.add(Instruction::set(1, 1, 1).unwrap());
        program.add(Instruction::increment(3, 1).unwrap());
        // label 3 is taken, so the stop cannot sit at n + 1
        assert_eq!(program.validate(), Ok(3));
        assert_eq!(program.slots().len(), 4);
        assert!(program.get(4).unwrap().is_halt());
        assert_eq!(*program.get(3).unwrap().op(), Op::Increment { register: 1 });
    }

    #[test]
    fn test_sparse_program_halt_fills_gap_at_terminal() {
        let mut program = Program::new();
        program.add(Instruction::set(1, 1, 1).unwrap());
        program.add(Instruction::branch(4, 1, 3, 3).unwrap());
        assert_eq!(program.validate(), Ok(3));
        assert!(program.get(3).unwrap().is_halt());
        assert_eq!(program.slots().len(), 4);
    }

    #[test]
    fn test_terminal_label_survives_revalidation() {
        let mut program = Program::new();
        program
            .add_all(["1. x1 = 1", "3. if x1 == 0 goto 1 else goto 3"])
            .unwrap();
        assert_eq!(program.validate(), Ok(3));
        assert!(program.get(4).unwrap().is_halt());
        assert_eq!(program.validate(), Ok(3));
        assert_eq!(program.terminal_label(), 3);
        assert_eq!(halt_count(&program), 1);
    }

    #[test]
    fn test_replacing_implicit_stop_forgets_it() {
        let mut program = Program::new();
        program.add_all(["1. x1 = 1"]).unwrap();
        assert_eq!(program.validate(), Ok(2));
        program.add(Instruction::increment(2, 1).unwrap());
        assert_eq!(program.terminal_label(), 3);
        assert_eq!(program.validate(), Ok(3));
        assert!(program.get(3).unwrap().is_halt());
    }

    #[test]
    fn test_validate_returns_terminal_label() {
        let mut program = Program::new();
        program.add_all(["1. x1 = 1", "2. stop"]).unwrap();
        assert_eq!(program.validate(), Ok(3));
    }

    #[test]
    fn test_display_lists_non_empty_slots() {
        let program = Program::parse("1. x1 = 2\n\n3. stop\n").unwrap();
        assert_eq!(program.to_string(), "1. x1 = 2\n3. stop");
    }
}
