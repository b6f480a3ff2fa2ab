//! Closed-form compute and memory model for one configuration
//!
//! For a fixed dataflow (already folded into [`StreamExtents`]), partition
//! strategy and oriented core grid (p0, p1):
//!
//! - spatial:
//!   `cycles = (2R + C + T - 2) * ceil(Sr / (p0 R)) * ceil(Sc / (p1 C))`,
//!   `memory = cores * (Sr T / p0 + Sc T / p1 + Sc Sr / (p0 p1))`
//! - spatio-temporal1:
//!   `cycles = (2R + C + ceil(T / p0) - 2) * ceil(Sr / R) * ceil(Sc / (p1 C))`,
//!   `memory = cores * (Sr T / p0 + Sc T / (p0 p1) + Sc Sr / p1)`
//! - spatio-temporal2:
//!   `cycles = (2R + C + ceil(T / p0) - 2) * ceil(Sr / (p1 R)) * ceil(Sc / C)`,
//!   `memory = cores * (Sr T / (p0 p1) + Sc T / p0 + Sc Sr / p1)`
//!
//! Ceiling division charges a full extra pass for any remainder.

use serde::{Deserialize, Serialize};

use crate::dataflow::{Dataflow, StreamExtents};
use crate::error::{DseError, DseResult};
use crate::factors::FactorPair;
use crate::hardware::{validate_core_count, ArrayShape, Problem};
use crate::partition::PartitionStrategy;

/// Modeled cost of one fully specified configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub compute_cycles: f64,
    pub memory_words: f64,
}

impl Metrics {
    /// Sentinel for configurations that must never win a minimization
    pub const UNREACHABLE: Metrics = Metrics {
        compute_cycles: f64::INFINITY,
        memory_words: f64::INFINITY,
    };

    pub fn new(compute_cycles: f64, memory_words: f64) -> Self {
        Self {
            compute_cycles,
            memory_words,
        }
    }

    /// Collapse an evaluation outcome into plain metrics; errors cost +inf
    pub fn or_unreachable(outcome: DseResult<Metrics>) -> Metrics {
        outcome.unwrap_or(Metrics::UNREACHABLE)
    }

    pub fn is_finite(&self) -> bool {
        self.compute_cycles.is_finite() && self.memory_words.is_finite()
    }

    /// memory x compute
    pub fn product(&self) -> f64 {
        self.compute_cycles * self.memory_words
    }
}

/// Cost model bound to one array shape and core count
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    array: ArrayShape,
    num_cores: usize,
}

impl CostModel {
    /// Build a model, rejecting zero array extents and a zero core count
    pub fn new(array: ArrayShape, num_cores: usize) -> DseResult<Self> {
        array.validate()?;
        validate_core_count(num_cores)?;
        Ok(Self { array, num_cores })
    }

    pub fn array(&self) -> ArrayShape {
        self.array
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    /// Evaluate one oriented grid. `grid` must have both factors >= 1.
    pub fn evaluate(
        &self,
        extents: StreamExtents,
        partition: PartitionStrategy,
        grid: FactorPair,
    ) -> Metrics {
        debug_assert!(grid.p0 >= 1 && grid.p1 >= 1, "degenerate grid {}", grid);

        let (compute, memory) = match partition {
            PartitionStrategy::Spatial => self.spatial(extents, grid),
            PartitionStrategy::SpatioTemporal1 => self.spatio_temporal1(extents, grid),
            PartitionStrategy::SpatioTemporal2 => self.spatio_temporal2(extents, grid),
        };

        Metrics::new(compute, self.num_cores as f64 * memory)
    }

    /// Evaluate with dataflow and partition given by name.
    ///
    /// Unknown names yield `UnknownDataflow`/`UnknownPartition`; a zero grid
    /// factor yields `InvalidConfig`.
    pub fn evaluate_named(
        &self,
        problem: &Problem,
        dataflow: &str,
        partition: &str,
        grid: FactorPair,
    ) -> DseResult<Metrics> {
        let dataflow: Dataflow = dataflow.parse()?;
        let partition: PartitionStrategy = partition.parse()?;
        if grid.p0 == 0 || grid.p1 == 0 {
            return Err(DseError::invalid_config(format!(
                "core grid {} has a zero factor",
                grid
            )));
        }
        Ok(self.evaluate(dataflow.stream_extents(problem), partition, grid))
    }

    fn spatial(&self, s: StreamExtents, g: FactorPair) -> (f64, f64) {
        let ArrayShape { rows: r, cols: c } = self.array;

        let compute = cycles(
            self.array.pass_latency(s.temporal),
            ceil_div(s.rows, g.p0, r),
            ceil_div(s.cols, g.p1, c),
        );
        let memory = ratio(s.rows, s.temporal, g.p0, 1)
            + ratio(s.cols, s.temporal, g.p1, 1)
            + ratio(s.cols, s.rows, g.p0, g.p1);

        (compute, memory)
    }

    fn spatio_temporal1(&self, s: StreamExtents, g: FactorPair) -> (f64, f64) {
        let ArrayShape { rows: r, cols: c } = self.array;

        let compute = cycles(
            self.array.pass_latency(s.temporal.div_ceil(g.p0)),
            ceil_div(s.rows, 1, r),
            ceil_div(s.cols, g.p1, c),
        );
        let memory = ratio(s.rows, s.temporal, g.p0, 1)
            + ratio(s.cols, s.temporal, g.p0, g.p1)
            + ratio(s.cols, s.rows, g.p1, 1);

        (compute, memory)
    }

    fn spatio_temporal2(&self, s: StreamExtents, g: FactorPair) -> (f64, f64) {
        let ArrayShape { rows: r, cols: c } = self.array;

        let compute = cycles(
            self.array.pass_latency(s.temporal.div_ceil(g.p0)),
            ceil_div(s.rows, g.p1, r),
            ceil_div(s.cols, 1, c),
        );
        let memory = ratio(s.rows, s.temporal, g.p0, g.p1)
            + ratio(s.cols, s.temporal, g.p0, 1)
            + ratio(s.cols, s.rows, g.p1, 1);

        (compute, memory)
    }
}

/// ceil(extent / (split * tile)) without overflowing the divisor
#[inline]
fn ceil_div(extent: usize, split: usize, tile: usize) -> u128 {
    (extent as u128).div_ceil(split as u128 * tile as u128)
}

/// latency * row passes * column passes, exact while it fits in u128
#[inline]
fn cycles(latency: u128, row_passes: u128, col_passes: u128) -> f64 {
    latency
        .checked_mul(row_passes)
        .and_then(|v| v.checked_mul(col_passes))
        .map_or_else(
            || latency as f64 * row_passes as f64 * col_passes as f64,
            |v| v as f64,
        )
}

/// (a * b) / (d0 * d1) with the products taken in u128
#[inline]
fn ratio(a: usize, b: usize, d0: usize, d1: usize) -> f64 {
    (a as u128 * b as u128) as f64 / (d0 as u128 * d1 as u128) as f64
}
