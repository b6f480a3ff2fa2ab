//! Design-space search over core-grid shapes
//!
//! For one problem, array shape, core count, dataflow and partition strategy,
//! every factor pair of the core count is evaluated in both orientations.
//! The cheapest-compute and the cheapest-memory configurations are tracked
//! independently, each with the other metric observed at that point.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cost::{CostModel, Metrics};
use crate::dataflow::Dataflow;
use crate::error::DseResult;
use crate::factors::{enumerate_factor_pairs, FactorPair};
use crate::hardware::{ArrayShape, Problem};
use crate::partition::PartitionStrategy;

/// Outcome of one search; every value is `+inf` when nothing was evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_memory: f64,
    /// Compute cycles at the memory-optimal configuration
    pub compute_at_best_memory: f64,
    pub best_compute: f64,
    /// Memory words at the compute-optimal configuration
    pub memory_at_best_compute: f64,
    /// Oriented grid of the memory optimum
    pub best_memory_grid: Option<FactorPair>,
    /// Oriented grid of the compute optimum
    pub best_compute_grid: Option<FactorPair>,
}

impl SearchResult {
    /// Result for an invalid configuration; never wins a minimization
    pub fn unreachable() -> Self {
        Self {
            best_memory: f64::INFINITY,
            compute_at_best_memory: f64::INFINITY,
            best_compute: f64::INFINITY,
            memory_at_best_compute: f64::INFINITY,
            best_memory_grid: None,
            best_compute_grid: None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.best_memory.is_finite() && self.best_compute.is_finite()
    }

    /// best_memory x best_compute; the two minima may come from
    /// different grids
    pub fn minima_product(&self) -> f64 {
        self.best_memory * self.best_compute
    }
}

/// Running minima over evaluated configurations.
///
/// Updates use strict `<`, so on ties the first configuration offered wins.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best_compute: Option<(FactorPair, Metrics)>,
    best_memory: Option<(FactorPair, Metrics)>,
    evaluated: usize,
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one configuration. Returns true if it became either optimum.
    pub fn update(&mut self, grid: FactorPair, metrics: Metrics) -> bool {
        self.evaluated += 1;
        let mut improved = false;

        let compute_bound = self
            .best_compute
            .map_or(f64::INFINITY, |(_, m)| m.compute_cycles);
        if metrics.compute_cycles < compute_bound {
            self.best_compute = Some((grid, metrics));
            improved = true;
        }

        let memory_bound = self
            .best_memory
            .map_or(f64::INFINITY, |(_, m)| m.memory_words);
        if metrics.memory_words < memory_bound {
            self.best_memory = Some((grid, metrics));
            improved = true;
        }

        improved
    }

    /// Number of configurations offered so far
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    pub fn finish(&self) -> SearchResult {
        let mut result = SearchResult::unreachable();
        if let Some((grid, m)) = self.best_memory {
            result.best_memory = m.memory_words;
            result.compute_at_best_memory = m.compute_cycles;
            result.best_memory_grid = Some(grid);
        }
        if let Some((grid, m)) = self.best_compute {
            result.best_compute = m.compute_cycles;
            result.memory_at_best_compute = m.memory_words;
            result.best_compute_grid = Some(grid);
        }
        result
    }
}

/// Search driver for one (problem, array, core count) instance.
///
/// The factor pairs are enumerated once and shared by every
/// dataflow/partition search on this instance.
pub struct DseDriver {
    problem: Problem,
    model: CostModel,
    pairs: Vec<FactorPair>,
}

impl DseDriver {
    /// Validate the instance and enumerate its core grids
    pub fn new(problem: Problem, array: ArrayShape, num_cores: usize) -> DseResult<Self> {
        problem.validate()?;
        let model = CostModel::new(array, num_cores)?;
        Ok(Self {
            problem,
            model,
            pairs: enumerate_factor_pairs(num_cores),
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn factor_pairs(&self) -> &[FactorPair] {
        &self.pairs
    }

    /// Every oriented grid in evaluation order: ascending pairs, each as
    /// enumerated and then swapped
    pub fn orientations(&self) -> impl Iterator<Item = FactorPair> + '_ {
        self.pairs
            .iter()
            .flat_map(|&pair| [pair, pair.swapped()])
    }

    pub fn search(&self, dataflow: Dataflow, partition: PartitionStrategy) -> SearchResult {
        let extents = dataflow.stream_extents(&self.problem);
        let mut tracker = BestTracker::new();

        for grid in self.orientations() {
            let metrics = self.model.evaluate(extents, partition, grid);
            if tracker.update(grid, metrics) {
                debug!(
                    "{} {} {}: new optimum at grid {} (cycles={}, words={})",
                    self.problem, dataflow, partition, grid, metrics.compute_cycles, metrics.memory_words
                );
            }
        }

        debug!(
            "{} {} {}: {} configurations evaluated",
            self.problem,
            dataflow,
            partition,
            tracker.evaluated()
        );
        tracker.finish()
    }

    /// Search with dataflow and partition given by name
    pub fn try_search_by_name(&self, dataflow: &str, partition: &str) -> DseResult<SearchResult> {
        let dataflow: Dataflow = dataflow.parse()?;
        let partition: PartitionStrategy = partition.parse()?;
        Ok(self.search(dataflow, partition))
    }

    /// Like [`DseDriver::try_search_by_name`], but an unknown name costs
    /// `+inf` everywhere instead of failing
    pub fn search_by_name(&self, dataflow: &str, partition: &str) -> SearchResult {
        match self.try_search_by_name(dataflow, partition) {
            Ok(result) => result,
            Err(e) => {
                warn!("{}; configuration excluded from search", e);
                SearchResult::unreachable()
            }
        }
    }
}

/// One-shot search for a single dataflow and partition
pub fn search(
    problem: Problem,
    array: ArrayShape,
    num_cores: usize,
    dataflow: Dataflow,
    partition: PartitionStrategy,
) -> DseResult<SearchResult> {
    Ok(DseDriver::new(problem, array, num_cores)?.search(dataflow, partition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_tracker_keeps_first_minimum() {
        let mut tracker = BestTracker::new();
        let a = FactorPair::new(1, 4);
        let b = FactorPair::new(4, 1);
        let c = FactorPair::new(2, 2);

        assert!(tracker.update(a, Metrics::new(100.0, 50.0)));
        // Ties on both metrics: nothing changes
        assert!(!tracker.update(b, Metrics::new(100.0, 50.0)));
        // Better memory only
        assert!(tracker.update(c, Metrics::new(200.0, 10.0)));

        let result = tracker.finish();
        assert_eq!(tracker.evaluated(), 3);
        assert_eq!(result.best_compute, 100.0);
        assert_eq!(result.memory_at_best_compute, 50.0);
        assert_eq!(result.best_compute_grid, Some(a));
        assert_eq!(result.best_memory, 10.0);
        assert_eq!(result.compute_at_best_memory, 200.0);
        assert_eq!(result.best_memory_grid, Some(c));
    }

    #[test]
    fn test_empty_tracker_is_unreachable() {
        let result = BestTracker::new().finish();
        assert_eq!(result, SearchResult::unreachable());
        assert!(!result.is_reachable());

        // An infinite offer never registers
        let mut tracker = BestTracker::new();
        assert!(!tracker.update(FactorPair::new(1, 1), Metrics::UNREACHABLE));
        assert_eq!(tracker.finish(), SearchResult::unreachable());
    }

    #[test]
    fn test_orientation_order() {
        let driver = DseDriver::new(Problem::new(8, 8, 8), ArrayShape::square(4), 16).unwrap();
        let grids: Vec<FactorPair> = driver.orientations().collect();
        assert_eq!(
            grids,
            vec![
                FactorPair::new(1, 16),
                FactorPair::new(16, 1),
                FactorPair::new(2, 8),
                FactorPair::new(8, 2),
                FactorPair::new(4, 4),
                FactorPair::new(4, 4),
            ]
        );
    }

    #[test]
    fn test_square_problem_spatial_os() {
        let result = search(
            Problem::new(1000, 1000, 1000),
            ArrayShape::square(16),
            16,
            Dataflow::Os,
            PartitionStrategy::Spatial,
        )
        .unwrap();

        // (1, 16): 1046 * ceil(1000/16) * ceil(1000/256) = 1046 * 63 * 4
        assert_eq!(result.best_compute, 263_592.0);
        assert_eq!(result.best_compute_grid, Some(FactorPair::new(1, 16)));
        // 16 * (1000000 + 62500 + 62500)
        assert_eq!(result.memory_at_best_compute, 18_000_000.0);

        // (4, 4): 1046 * 16 * 16 cycles, 16 * 562500 words
        assert_eq!(result.best_memory, 9_000_000.0);
        assert_eq!(result.compute_at_best_memory, 267_776.0);
        assert_eq!(result.best_memory_grid, Some(FactorPair::new(4, 4)));
        assert!(result.is_reachable());
    }

    #[test]
    fn test_unknown_names_are_soft_failures() {
        let driver = DseDriver::new(Problem::new(64, 64, 64), ArrayShape::square(8), 4).unwrap();

        assert!(driver.try_search_by_name("os", "spatial").is_ok());
        assert!(driver.try_search_by_name("rs", "spatial").unwrap_err().is_unknown_variant());
        assert!(driver.try_search_by_name("os", "banded").unwrap_err().is_unknown_variant());

        let soft = driver.search_by_name("rs", "spatial");
        assert_eq!(soft, SearchResult::unreachable());
        assert_eq!(
            driver.search_by_name("ws", "spatio-temporal1"),
            driver.search(Dataflow::Ws, PartitionStrategy::SpatioTemporal1)
        );
    }

    #[test]
    fn test_driver_rejects_bad_instances() {
        assert!(DseDriver::new(Problem::new(0, 8, 8), ArrayShape::square(8), 4).is_err());
        assert!(DseDriver::new(Problem::new(8, 8, 8), ArrayShape::new(8, 0), 4).is_err());
        assert!(DseDriver::new(Problem::new(8, 8, 8), ArrayShape::square(8), 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_search_is_minimal(
            m in 1usize..4000,
            n in 1usize..4000,
            k in 1usize..4000,
            r in 1usize..33,
            c in 1usize..33,
            cores in 1usize..65,
        ) {
            let problem = Problem::new(m, n, k);
            let array = ArrayShape::new(r, c);
            let driver = DseDriver::new(problem, array, cores).unwrap();
            let model = CostModel::new(array, cores).unwrap();

            for dataflow in Dataflow::ALL {
                for partition in PartitionStrategy::ALL {
                    let result = driver.search(dataflow, partition);
                    prop_assert!(result.is_reachable());

                    let extents = dataflow.stream_extents(&problem);
                    for grid in driver.orientations() {
                        let metrics = model.evaluate(extents, partition, grid);
                        prop_assert!(result.best_compute <= metrics.compute_cycles);
                        prop_assert!(result.best_memory <= metrics.memory_words);
                    }
                }
            }
        }
    }
}
