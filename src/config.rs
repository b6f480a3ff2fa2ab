//! Sweep grid configuration
//!
//! The outer grid is six value lists. Any list left out of a JSON config
//! falls back to the reference grid below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DseError, DseResult};

fn default_gemm_dims() -> Vec<usize> {
    vec![1000, 5000, 10000]
}

fn default_array_dims() -> Vec<usize> {
    vec![8, 16, 32]
}

fn default_core_counts() -> Vec<usize> {
    vec![16, 32, 64]
}

/// Value lists swept in the order M, N, K, R, C, num_cores (innermost last)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepGrid {
    #[serde(default = "default_gemm_dims")]
    pub m_values: Vec<usize>,
    #[serde(default = "default_gemm_dims")]
    pub n_values: Vec<usize>,
    #[serde(default = "default_gemm_dims")]
    pub k_values: Vec<usize>,
    #[serde(default = "default_array_dims")]
    pub r_values: Vec<usize>,
    #[serde(default = "default_array_dims")]
    pub c_values: Vec<usize>,
    #[serde(default = "default_core_counts")]
    pub num_cores_values: Vec<usize>,
}

impl SweepGrid {
    pub fn new(
        m_values: Vec<usize>,
        n_values: Vec<usize>,
        k_values: Vec<usize>,
        r_values: Vec<usize>,
        c_values: Vec<usize>,
        num_cores_values: Vec<usize>,
    ) -> Self {
        Self {
            m_values,
            n_values,
            k_values,
            r_values,
            c_values,
            num_cores_values,
        }
    }

    /// A grid with one value per list
    pub fn single(m: usize, n: usize, k: usize, r: usize, c: usize, num_cores: usize) -> Self {
        Self::new(vec![m], vec![n], vec![k], vec![r], vec![c], vec![num_cores])
    }

    pub fn from_json_str(json: &str) -> DseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> DseResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn lists(&self) -> [(&'static str, &[usize]); 6] {
        [
            ("M", self.m_values.as_slice()),
            ("N", self.n_values.as_slice()),
            ("K", self.k_values.as_slice()),
            ("R", self.r_values.as_slice()),
            ("C", self.c_values.as_slice()),
            ("num_cores", self.num_cores_values.as_slice()),
        ]
    }

    /// Reject zero entries. Empty lists are allowed and produce no rows.
    pub fn validate(&self) -> DseResult<()> {
        for (name, values) in self.lists() {
            if let Some(pos) = values.iter().position(|&v| v == 0) {
                return Err(DseError::invalid_config(format!(
                    "{} values must be positive, found 0 at position {}",
                    name, pos
                )));
            }
        }
        Ok(())
    }

    /// Number of outer tuples (Cartesian product size)
    pub fn total_count(&self) -> usize {
        self.lists().iter().map(|(_, values)| values.len()).product()
    }
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self::new(
            default_gemm_dims(),
            default_gemm_dims(),
            default_gemm_dims(),
            default_array_dims(),
            default_array_dims(),
            default_core_counts(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_grid() {
        let grid = SweepGrid::default();
        assert_eq!(grid.m_values, vec![1000, 5000, 10000]);
        assert_eq!(grid.r_values, vec![8, 16, 32]);
        assert_eq!(grid.num_cores_values, vec![16, 32, 64]);
        assert_eq!(grid.total_count(), 729);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let grid = SweepGrid::from_json_str(r#"{ "m_values": [64], "num_cores_values": [4, 8] }"#)
            .unwrap();
        assert_eq!(grid.m_values, vec![64]);
        assert_eq!(grid.num_cores_values, vec![4, 8]);
        assert_eq!(grid.k_values, vec![1000, 5000, 10000]);
        // 1 * 3 * 3 * 3 * 3 * 2
        assert_eq!(grid.total_count(), 162);
    }

    #[test]
    fn test_json_round_trip() {
        let grid = SweepGrid::single(1, 2, 3, 4, 5, 6);
        let json = grid.to_json().unwrap();
        assert_eq!(SweepGrid::from_json_str(&json).unwrap(), grid);
    }

    #[test]
    fn test_bad_json() {
        let err = SweepGrid::from_json_str(r#"{ "m_values": "lots" }"#).unwrap_err();
        assert!(matches!(err, DseError::Json(_)));
    }

    #[test]
    fn test_zero_rejected() {
        let mut grid = SweepGrid::single(10, 10, 10, 4, 4, 4);
        grid.c_values = vec![4, 0];
        let err = grid.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: C values must be positive, found 0 at position 1"
        );
    }

    #[test]
    fn test_empty_list_is_valid() {
        let mut grid = SweepGrid::default();
        grid.k_values.clear();
        assert!(grid.validate().is_ok());
        assert_eq!(grid.total_count(), 0);
    }
}
