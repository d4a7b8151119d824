use std::io::Write;

use num_bigint::BigUint;
use tracing::{debug, trace};

use crate::error::UrmError;
use crate::machine::op::{Instruction, Label, Op};
use crate::machine::program::Program;
use crate::machine::validation_error::ValidationError;
use crate::runtime::registers::Registers;

#[derive(Debug, Clone, Default)]
pub struct VmConfig {
    /// Emit a `trace!` event for every executed instruction.
    pub trace_steps: bool,
}

/// Where control goes after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(Label),
    Halt,
}

/// The URM execution engine.
///
/// Runs a `Program` against a fresh register file per call. There is no step
/// limit: a program that loops forever makes `run` loop forever, and bounding
/// that is up to the caller.
pub struct Vm {
    registers: Registers,
    config: VmConfig,
    steps: u64,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            registers: Registers::new(),
            config,
            steps: 0,
        }
    }

    /// Register file as the last run left it.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Instructions executed by the last run, gaps included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reset_execution_state(&mut self, inputs: &[u64]) {
        self.registers = Registers::with_inputs(inputs);
        self.steps = 0;
    }

    /// Validates `program`, loads `inputs` into `x2..`, runs to a stop and
    /// returns `x1`.
    pub fn run(
        &mut self,
        program: &mut Program,
        inputs: &[u64],
    ) -> Result<BigUint, ValidationError> {
        let terminal = program.validate()?;
        self.reset_execution_state(inputs);

        debug!(?inputs, instructions = program.len(), terminal, "run started");
        self.exec(program.slots(), terminal);
        let result = self.registers.output();
        debug!(%result, steps = self.steps, "run finished");

        Ok(result)
    }

    /// `run`, then writes the result and a newline to `out`.
    pub fn run_and_emit<W: Write>(
        &mut self,
        program: &mut Program,
        inputs: &[u64],
        out: &mut W,
    ) -> Result<BigUint, UrmError> {
        let result = self.run(program, inputs)?;
        writeln!(out, "{}", result)?;
        Ok(result)
    }

    // Execution

    /// Jumps to `terminal` end the run wherever that label sits in `slots`.
    /// Validation keeps every other target inside `1..=slots.len()`, so the
    /// only other way out is falling through past the last slot.
    fn exec(&mut self, slots: &[Option<Instruction>], terminal: Label) {
        let mut pc: usize = 0;

        while let Some(slot) = slots.get(pc) {
            self.steps += 1;

            let Some(instruction) = slot else {
                pc += 1;
                continue;
            };

            if self.config.trace_steps {
                trace!(pc, %instruction, registers = ?self.registers.as_slice(), "step");
            }

            match self.step(instruction.op()) {
                Flow::Next => pc += 1,
                Flow::Jump(label) if label == terminal => break,
                Flow::Jump(label) => pc = label - 1,
                Flow::Halt => break,
            }
        }
    }

    fn step(&mut self, op: &Op) -> Flow {
        match *op {
            Op::Set { register, value } => {
                self.registers.set(register, BigUint::from(value));
                Flow::Next
            }
            Op::Increment { register } => {
                self.registers.increment(register);
                Flow::Next
            }
            Op::Decrement { register } => {
                self.registers.decrement(register);
                Flow::Next
            }
            Op::Copy { dest, src } => {
                let value = self.registers.get(src);
                self.registers.set(dest, value);
                Flow::Next
            }
            Op::Branch {
                register,
                if_zero,
                otherwise,
            } => {
                if self.registers.is_zero(register) {
                    Flow::Jump(if_zero)
                } else {
                    Flow::Jump(otherwise)
                }
            }
            Op::Halt => Flow::Halt,
        }
    }
}
