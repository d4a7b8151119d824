use num_bigint::BigUint;
use num_traits::Zero;

use crate::machine::op::Register;

/// `x1`, where a run leaves its result.
pub const OUTPUT_REGISTER: Register = 1;

/// The register file of one run.
///
/// Unbounded in both directions: reading a register nobody has written
/// yields 0, writing grows the backing vector as far as needed, and values
/// are arbitrary-precision naturals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    cells: Vec<BigUint>,
}

impl Registers {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// `x1 = 0`, `x2..=x(k+1)` are the `k` inputs, everything else is 0.
    pub fn with_inputs(inputs: &[u64]) -> Self {
        let mut cells = Vec::with_capacity(inputs.len() + 1);
        cells.push(BigUint::zero());
        cells.extend(inputs.iter().map(|&n| BigUint::from(n)));
        Self { cells }
    }

    pub fn get(&self, register: Register) -> BigUint {
        self.cell(register).cloned().unwrap_or_default()
    }

    pub fn is_zero(&self, register: Register) -> bool {
        self.cell(register).is_none_or(|value| value.is_zero())
    }

    pub fn set(&mut self, register: Register, value: BigUint) {
        *self.cell_mut(register) = value;
    }

    pub fn increment(&mut self, register: Register) {
        *self.cell_mut(register) += 1u32;
    }

    /// Monus: never goes below zero.
    pub fn decrement(&mut self, register: Register) {
        let cell = self.cell_mut(register);
        if !cell.is_zero() {
            *cell -= 1u32;
        }
    }

    pub fn output(&self) -> BigUint {
        self.get(OUTPUT_REGISTER)
    }

    /// Values of `x1..=xn` for the highest register touched so far.
    pub fn as_slice(&self) -> &[BigUint] {
        &self.cells
    }

    fn cell(&self, register: Register) -> Option<&BigUint> {
        register.checked_sub(1).and_then(|i| self.cells.get(i))
    }

    fn cell_mut(&mut self, register: Register) -> &mut BigUint {
        debug_assert!(register >= 1, "register indices start at 1");
        let index = register.saturating_sub(1);
        if index >= self.cells.len() {
            self.cells.resize(index + 1, BigUint::zero());
        }
        &mut self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_inputs_start_at_x2() {
        let regs = Registers::with_inputs(&[7, 5]);
        assert_eq!(regs.output(), big(0));
        assert_eq!(regs.get(2), big(7));
        assert_eq!(regs.get(3), big(5));
        assert_eq!(regs.get(4), big(0));
    }

    #[test]
    fn test_unseen_registers_read_zero() {
        let regs = Registers::new();
        assert_eq!(regs.get(1000), big(0));
        assert_eq!(regs.get(0), big(0));
        assert!(regs.is_zero(1000));
        assert!(regs.as_slice().is_empty());
    }

    #[test]
    fn test_write_grows() {
        let mut regs = Registers::new();
        regs.set(5, big(9));
        assert_eq!(regs.as_slice(), &[big(0), big(0), big(0), big(0), big(9)]);
        regs.increment(7);
        assert_eq!(regs.get(7), big(1));
        assert!(!regs.is_zero(7));
    }

    #[test]
    fn test_decrement_saturates() {
        let mut regs = Registers::with_inputs(&[1]);
        regs.decrement(2);
        regs.decrement(2);
        regs.decrement(9);
        assert_eq!(regs.get(2), big(0));
        assert_eq!(regs.get(9), big(0));
    }

    #[test]
    fn test_increment_past_u64() {
        let mut regs = Registers::with_inputs(&[u64::MAX]);
        regs.increment(2);
        assert_eq!(regs.get(2), BigUint::from(u64::MAX) + 1u32);
        regs.decrement(2);
        assert_eq!(regs.get(2), big(u64::MAX));
    }
}
