/// The primes in increasing order, `2, 3, 5, 7, ...`.
///
/// Trial division against the primes found so far. Gödel vectors are short,
/// so this never needs to go far.
#[derive(Debug, Clone, Default)]
pub struct Primes {
    found: Vec<u64>,
}

impl Primes {
    pub fn new() -> Self {
        Self { found: Vec::new() }
    }

    fn is_prime(&self, candidate: u64) -> bool {
        self.found
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0)
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let mut candidate = match self.found.last() {
            None => 2,
            Some(2) => 3,
            Some(&p) => p + 2,
        };
        while !self.is_prime(candidate) {
            candidate += 2;
        }
        self.found.push(candidate);
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(n: usize) -> Vec<u64> {
        Primes::new().take(n).collect()
    }

    #[test]
    fn test_first_primes() {
        assert_eq!(first(10), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_first_zero() {
        assert!(first(0).is_empty());
    }

    #[test]
    fn test_hundredth_prime() {
        assert_eq!(Primes::new().nth(99), Some(541));
    }
}
