//! Hardware and workload descriptions for the multi-core systolic model
//!
//! A single core is an R x C systolic array. The workload is one GEMM of
//! shape M x N x K: an M x K left operand times a K x N right operand.

use serde::{Deserialize, Serialize};

use crate::error::{DseError, DseResult};

/// Physical dimensions of one systolic core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayShape {
    /// Processing-element rows (R)
    pub rows: usize,
    /// Processing-element columns (C)
    pub cols: usize,
}

impl ArrayShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Reject zero extents before they reach the cost formulas
    pub fn validate(&self) -> DseResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(DseError::invalid_config(format!(
                "array shape must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Cycles for one array pass whose temporal extent is `temporal`:
    /// fill and drain of the pipeline plus the streamed reuse length.
    pub fn pass_latency(&self, temporal: usize) -> u128 {
        2 * self.rows as u128 + self.cols as u128 + temporal as u128 - 2
    }
}

impl std::fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// GEMM dimensions: (M x K) @ (K x N)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl Problem {
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        Self { m, n, k }
    }

    pub fn validate(&self) -> DseResult<()> {
        if self.m == 0 || self.n == 0 || self.k == 0 {
            return Err(DseError::invalid_config(format!(
                "GEMM dimensions must be positive, got M={} N={} K={}",
                self.m, self.n, self.k
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.m, self.n, self.k)
    }
}

/// Reject a zero core count
pub fn validate_core_count(num_cores: usize) -> DseResult<()> {
    if num_cores == 0 {
        return Err(DseError::invalid_config("core count must be at least 1"));
    }
    Ok(())
}
