//! Core-grid factorizations
//!
//! The cores are arranged as a p0 x p1 grid with p0 * p1 == num_cores.
//! Only divisor pairs are considered; each pair is later evaluated in both
//! orientations by the search.

use serde::{Deserialize, Serialize};

/// A 2-D core grid shape whose product is the core count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorPair {
    pub p0: usize,
    pub p1: usize,
}

impl FactorPair {
    pub fn new(p0: usize, p1: usize) -> Self {
        Self { p0, p1 }
    }

    /// The same grid with its axes exchanged
    pub fn swapped(self) -> Self {
        Self::new(self.p1, self.p0)
    }

    pub fn cores(&self) -> usize {
        self.p0 * self.p1
    }
}

impl std::fmt::Display for FactorPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.p0, self.p1)
    }
}

/// All (i, n / i) with i dividing n and i <= sqrt(n), ascending in i
pub fn enumerate_factor_pairs(n: usize) -> Vec<FactorPair> {
    let mut pairs = Vec::new();
    let mut i = 1;
    while i <= n / i {
        if n % i == 0 {
            let pair = FactorPair::new(i, n / i);
            debug_assert_eq!(pair.cores(), n);
            pairs.push(pair);
        }
        i += 1;
    }
    pairs
}
