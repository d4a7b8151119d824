use std::fmt;

use crate::machine::op::{Instruction, Label};
use crate::machine::program::Program;

/// Print a program listing to stdout.
pub fn print_listing(program: &Program) {
    print!("{}", Listing::new(program));
}

/// A program rendered one slot per line, in the style of a disassembly.
///
/// Branch targets are marked with `►`; empty slots show as `(empty)` so the
/// label/slot correspondence stays visible.
pub struct Listing<'a> {
    program: &'a Program,
}

impl<'a> Listing<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program;
        let targets = collect_branch_targets(program);

        writeln!(f, "════════════════════════════════════════")?;
        writeln!(
            f,
            " {} instructions, {} slots",
            program.len(),
            program.slots().len()
        )?;
        writeln!(f, "════════════════════════════════════════")?;

        for (slot, entry) in program.slots().iter().enumerate() {
            let label = slot + 1;
            let marker = if targets.contains(&label) { "► " } else { "  " };
            match entry {
                Some(instruction) => writeln!(f, "{:04} {}{}", label, marker, instruction.op())?,
                None => writeln!(f, "{:04} {}(empty)", label, marker)?,
            }
        }

        // a jump to the terminal label past the last slot ends the run
        let terminal = program.terminal_label();
        if terminal > program.slots().len() && targets.contains(&terminal) {
            writeln!(f, "{:04} ► (end)", terminal)?;
        }

        Ok(())
    }
}

fn collect_branch_targets(program: &Program) -> Vec<Label> {
    let mut targets = Vec::new();

    for target in program
        .instructions()
        .filter_map(|i: &Instruction| i.op().targets())
        .flatten()
    {
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_marks_targets_and_gaps() {
        let mut program = Program::new();
        program
            .add_all(["1. if x2 == 0 goto 3 else goto 4", "3. x1 = x1 + 1"])
            .unwrap();
        let text = Listing::new(&program).to_string();
        assert!(text.contains("0001   if x2 == 0 goto 3 else goto 4"));
        assert!(text.contains("0002   (empty)"));
        assert!(text.contains("0003 ► x1 = x1 + 1"));
        assert!(!text.contains("(end)"));
    }

    #[test]
    fn test_listing_marks_end() {
        let mut program = Program::new();
        program
            .add_all(["1. x1 = 1", "2. if x1 == 0 goto 1 else goto 3"])
            .unwrap();
        let text = Listing::new(&program).to_string();
        assert!(text.contains("0001 ► x1 = 1"));
        assert!(text.contains("0003 ► (end)"));
    }
}
