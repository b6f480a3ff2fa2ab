//! Outer-grid sweep over (M, N, K, R, C, num_cores)
//!
//! For every tuple and every partition strategy, the per-dataflow search
//! results are reduced into a [`PartitionSummary`]. Each tuple becomes one
//! [`SweepRow`]; the report also counts the tuples where a spatio-temporal
//! strategy beats spatial partitioning on memory x compute.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SweepGrid;
use crate::dataflow::Dataflow;
use crate::dse::{DseDriver, SearchResult};
use crate::error::DseResult;
use crate::factors::FactorPair;
use crate::hardware::{ArrayShape, Problem};
use crate::partition::PartitionStrategy;

/// Best-of-dataflows metrics for one partition strategy on one tuple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub best_memory: f64,
    /// Compute cycles at the memory optimum
    pub best_memory_compute: f64,
    pub best_compute: f64,
    /// Memory words at the compute optimum
    pub best_compute_memory: f64,
    /// Smallest best_memory x best_compute over the dataflows, each pair
    /// taken from one dataflow's two independent optima
    pub best_memory_times_compute: f64,
    pub best_memory_dataflow: Option<Dataflow>,
    pub best_memory_grid: Option<FactorPair>,
    pub best_compute_dataflow: Option<Dataflow>,
    pub best_compute_grid: Option<FactorPair>,
}

impl PartitionSummary {
    /// Identity of the reduction: every metric at `+inf`
    pub fn empty() -> Self {
        Self {
            best_memory: f64::INFINITY,
            best_memory_compute: f64::INFINITY,
            best_compute: f64::INFINITY,
            best_compute_memory: f64::INFINITY,
            best_memory_times_compute: f64::INFINITY,
            best_memory_dataflow: None,
            best_memory_grid: None,
            best_compute_dataflow: None,
            best_compute_grid: None,
        }
    }

    /// Fold in one dataflow's search result. Strict `<`, so earlier
    /// dataflows win ties.
    pub fn absorb(&mut self, dataflow: Dataflow, result: &SearchResult) {
        if result.best_memory < self.best_memory {
            self.best_memory = result.best_memory;
            self.best_memory_compute = result.compute_at_best_memory;
            self.best_memory_dataflow = Some(dataflow);
            self.best_memory_grid = result.best_memory_grid;
        }
        if result.best_compute < self.best_compute {
            self.best_compute = result.best_compute;
            self.best_compute_memory = result.memory_at_best_compute;
            self.best_compute_dataflow = Some(dataflow);
            self.best_compute_grid = result.best_compute_grid;
        }

        let product = result.minima_product();
        if product < self.best_memory_times_compute {
            self.best_memory_times_compute = product;
        }
    }

    /// memory x compute at the memory optimum
    pub fn memory_product(&self) -> f64 {
        self.best_memory * self.best_memory_compute
    }

    /// memory x compute at the compute optimum
    pub fn compute_product(&self) -> f64 {
        self.best_compute * self.best_compute_memory
    }

    pub fn min_product(&self) -> f64 {
        self.memory_product().min(self.compute_product())
    }

    /// The five reported values, in column order
    pub fn values(&self) -> [f64; 5] {
        [
            self.best_memory,
            self.best_memory_compute,
            self.best_compute,
            self.best_compute_memory,
            self.best_memory_times_compute,
        ]
    }
}

/// Reduce all dataflows for one partition strategy
pub fn summarize_partition(driver: &DseDriver, partition: PartitionStrategy) -> PartitionSummary {
    let mut summary = PartitionSummary::empty();
    for dataflow in Dataflow::ALL {
        summary.absorb(dataflow, &driver.search(dataflow, partition));
    }
    summary
}

/// One outer-grid tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub problem: Problem,
    pub array: ArrayShape,
    pub num_cores: usize,
}

impl SweepPoint {
    pub fn new(problem: Problem, array: ArrayShape, num_cores: usize) -> Self {
        Self {
            problem,
            array,
            num_cores,
        }
    }
}

/// Tuples of the grid in canonical order: M outermost, num_cores innermost
pub fn sweep_points(grid: &SweepGrid) -> Vec<SweepPoint> {
    let mut points = Vec::with_capacity(grid.total_count());
    for &m in &grid.m_values {
        for &n in &grid.n_values {
            for &k in &grid.k_values {
                for &r in &grid.r_values {
                    for &c in &grid.c_values {
                        for &num_cores in &grid.num_cores_values {
                            points.push(SweepPoint::new(
                                Problem::new(m, n, k),
                                ArrayShape::new(r, c),
                                num_cores,
                            ));
                        }
                    }
                }
            }
        }
    }
    points
}

/// Sweep output for one tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub point: SweepPoint,
    /// Indexed by [`PartitionStrategy::index`]
    pub partitions: [PartitionSummary; 3],
    /// A spatio-temporal strategy has a strictly smaller memory x compute
    /// than spatial partitioning
    pub spatiotemporal_wins: bool,
}

impl SweepRow {
    pub fn new(point: SweepPoint, partitions: [PartitionSummary; 3]) -> Self {
        let mut row = Self {
            point,
            partitions,
            spatiotemporal_wins: false,
        };
        row.spatiotemporal_wins = row.spatiotemporal_product() < row.spatial_product();
        row
    }

    pub fn summary(&self, partition: PartitionStrategy) -> &PartitionSummary {
        &self.partitions[partition.index()]
    }

    pub fn spatial_product(&self) -> f64 {
        self.summary(PartitionStrategy::Spatial).min_product()
    }

    /// Smallest product over both spatio-temporal strategies
    pub fn spatiotemporal_product(&self) -> f64 {
        PartitionStrategy::ALL
            .iter()
            .filter(|p| p.is_spatio_temporal())
            .map(|&p| self.summary(p).min_product())
            .fold(f64::INFINITY, f64::min)
    }

    /// Among the memory optima, the strategy with the fewest compute cycles
    pub fn best_partition_for_memory(&self) -> PartitionStrategy {
        self.argmin(|s| s.best_memory_compute)
    }

    /// Among the compute optima, the strategy with the smallest memory
    pub fn best_partition_for_compute(&self) -> PartitionStrategy {
        self.argmin(|s| s.best_compute_memory)
    }

    fn argmin(&self, key: impl Fn(&PartitionSummary) -> f64) -> PartitionStrategy {
        let mut best = PartitionStrategy::Spatial;
        for partition in PartitionStrategy::ALL {
            if key(self.summary(partition)) < key(self.summary(best)) {
                best = partition;
            }
        }
        best
    }

    /// The 15 metric columns: five per strategy in canonical order
    pub fn metric_values(&self) -> [f64; 15] {
        let mut values = [0.0; 15];
        for (i, summary) in self.partitions.iter().enumerate() {
            values[i * 5..(i + 1) * 5].copy_from_slice(&summary.values());
        }
        values
    }
}

/// Evaluate every partition strategy for one tuple
pub fn evaluate_point(point: SweepPoint) -> DseResult<SweepRow> {
    let driver = DseDriver::new(point.problem, point.array, point.num_cores)?;
    let partitions = PartitionStrategy::ALL.map(|p| summarize_partition(&driver, p));
    let row = SweepRow::new(point, partitions);

    debug!(
        "GEMM {} on {} cores of {}: spatial={:.3e} spatio-temporal={:.3e}",
        point.problem,
        point.num_cores,
        point.array,
        row.spatial_product(),
        row.spatiotemporal_product()
    );

    Ok(row)
}

/// Ordered rows plus the dominance headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub rows: Vec<SweepRow>,
    /// Tuples where spatio-temporal partitioning beats spatial
    pub dominated_count: usize,
    pub total_count: usize,
    /// Per-strategy wins of [`SweepRow::best_partition_for_memory`]
    pub memory_optimum_wins: [usize; 3],
    /// Per-strategy wins of [`SweepRow::best_partition_for_compute`]
    pub compute_optimum_wins: [usize; 3],
}

impl SweepReport {
    pub fn from_rows(rows: Vec<SweepRow>) -> Self {
        let mut memory_optimum_wins = [0; 3];
        let mut compute_optimum_wins = [0; 3];
        for row in &rows {
            memory_optimum_wins[row.best_partition_for_memory().index()] += 1;
            compute_optimum_wins[row.best_partition_for_compute().index()] += 1;
        }

        Self {
            dominated_count: rows.iter().filter(|r| r.spatiotemporal_wins).count(),
            total_count: rows.len(),
            memory_optimum_wins,
            compute_optimum_wins,
            rows,
        }
    }

    /// Share of tuples where spatio-temporal partitioning dominates
    pub fn dominance_fraction(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.dominated_count as f64 / self.total_count as f64
        }
    }
}

/// Sequential sweep in canonical row order
pub fn run(grid: &SweepGrid) -> DseResult<SweepReport> {
    grid.validate()?;
    info!("sweeping {} tuples", grid.total_count());

    let rows = sweep_points(grid)
        .into_iter()
        .map(evaluate_point)
        .collect::<DseResult<Vec<_>>>()?;

    Ok(finish(rows))
}

/// Parallel sweep; rows come back in the same canonical order as [`run`]
pub fn run_parallel(grid: &SweepGrid) -> DseResult<SweepReport> {
    grid.validate()?;
    info!(
        "sweeping {} tuples on {} threads",
        grid.total_count(),
        rayon::current_num_threads()
    );

    let rows = sweep_points(grid)
        .into_par_iter()
        .map(evaluate_point)
        .collect::<DseResult<Vec<_>>>()?;

    Ok(finish(rows))
}

fn finish(rows: Vec<SweepRow>) -> SweepReport {
    let report = SweepReport::from_rows(rows);
    info!(
        "spatio-temporal beats spatial in {}/{} tuples",
        report.dominated_count, report.total_count
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DseError;
    use pretty_assertions::assert_eq;

    fn summary(memory: f64, memory_compute: f64, compute: f64, compute_memory: f64) -> PartitionSummary {
        PartitionSummary {
            best_memory: memory,
            best_memory_compute: memory_compute,
            best_compute: compute,
            best_compute_memory: compute_memory,
            best_memory_times_compute: (memory * memory_compute).min(compute * compute_memory),
            ..PartitionSummary::empty()
        }
    }

    fn point() -> SweepPoint {
        SweepPoint::new(Problem::new(1, 1, 1), ArrayShape::square(1), 1)
    }

    #[test]
    fn test_single_tuple_sweep() {
        let report = run(&SweepGrid::single(1000, 1000, 1000, 16, 16, 16)).unwrap();
        assert_eq!(report.total_count, 1);
        assert_eq!(report.rows.len(), 1);

        let row = &report.rows[0];
        assert_eq!(row.point.num_cores, 16);
        for value in row.metric_values() {
            assert!(value.is_finite() && value >= 0.0, "bad value {}", value);
        }

        // Cube GEMM: every dataflow maps to the same extents, so OS wins ties
        let spatial = row.summary(PartitionStrategy::Spatial);
        assert_eq!(spatial.best_memory, 9_000_000.0);
        assert_eq!(spatial.best_memory_compute, 267_776.0);
        assert_eq!(spatial.best_compute, 263_592.0);
        assert_eq!(spatial.best_compute_memory, 18_000_000.0);
        assert_eq!(spatial.best_memory_dataflow, Some(Dataflow::Os));
        assert_eq!(spatial.best_memory_grid, Some(FactorPair::new(4, 4)));
        assert_eq!(spatial.best_memory_times_compute, 9_000_000.0 * 263_592.0);
    }

    #[test]
    fn test_memory_times_compute_uses_dataflow_minima() {
        // 2x3x4 GEMM, 1x1 array, grids (1, 2) and (2, 1):
        //   OS: cycles 20 / 15, words 34 / 38 -> 34 * 15 = 510
        //   WS: cycles 16 / 16, words 38 / 32 -> 32 * 16 = 512
        //   IS: cycles 24 / 18, words 34 / 32 -> 32 * 18 = 576
        let driver = DseDriver::new(Problem::new(2, 3, 4), ArrayShape::square(1), 2).unwrap();
        let spatial = summarize_partition(&driver, PartitionStrategy::Spatial);

        assert_eq!(spatial.best_memory, 32.0);
        assert_eq!(spatial.best_memory_compute, 16.0);
        assert_eq!(spatial.best_memory_dataflow, Some(Dataflow::Ws));
        assert_eq!(spatial.best_compute, 15.0);
        assert_eq!(spatial.best_compute_memory, 38.0);
        assert_eq!(spatial.best_compute_dataflow, Some(Dataflow::Os));
        // Not a single configuration's product: 34 * 20 and 38 * 15 are both larger
        assert_eq!(spatial.best_memory_times_compute, 510.0);
    }

    #[test]
    fn test_memory_times_compute_matches_minima_for_rectangular_gemm() {
        let driver =
            DseDriver::new(Problem::new(1000, 5000, 10000), ArrayShape::new(8, 32), 32).unwrap();
        for partition in PartitionStrategy::ALL {
            let expected = Dataflow::ALL
                .iter()
                .map(|&d| {
                    let r = driver.search(d, partition);
                    r.best_memory * r.best_compute
                })
                .fold(f64::INFINITY, f64::min);
            let summary = summarize_partition(&driver, partition);
            assert_eq!(summary.best_memory_times_compute, expected, "{}", partition);
        }
    }

    #[test]
    fn test_summary_bounds_every_dataflow() {
        let driver = DseDriver::new(Problem::new(300, 7000, 50), ArrayShape::new(8, 32), 24).unwrap();
        for partition in PartitionStrategy::ALL {
            let summary = summarize_partition(&driver, partition);
            for dataflow in Dataflow::ALL {
                let result = driver.search(dataflow, partition);
                assert!(summary.best_memory <= result.best_memory);
                assert!(summary.best_compute <= result.best_compute);
                assert!(summary.best_memory_times_compute <= result.minima_product());
                assert!(summary.best_memory_times_compute <= summary.best_memory * summary.best_memory_compute);
            }
        }
    }

    #[test]
    fn test_absorb_ignores_unreachable() {
        let mut summary = PartitionSummary::empty();
        summary.absorb(Dataflow::Os, &SearchResult::unreachable());
        assert_eq!(summary, PartitionSummary::empty());
    }

    #[test]
    fn test_single_core_partitions_agree() {
        let report = run(&SweepGrid::single(640, 480, 320, 8, 16, 1)).unwrap();
        let row = &report.rows[0];
        let spatial = row.summary(PartitionStrategy::Spatial).values();
        assert_eq!(row.summary(PartitionStrategy::SpatioTemporal1).values(), spatial);
        assert_eq!(row.summary(PartitionStrategy::SpatioTemporal2).values(), spatial);
        assert!(!row.spatiotemporal_wins);
        assert_eq!(report.dominated_count, 0);
    }

    #[test]
    fn test_dominance_uses_min_of_both_products() {
        let spatial = summary(10.0, 10.0, 5.0, 30.0); // min(100, 150) = 100
        let st1 = summary(20.0, 10.0, 8.0, 25.0); // min(200, 200) = 200
        let st2 = summary(12.0, 9.0, 9.0, 11.0); // min(108, 99) = 99
        let row = SweepRow::new(point(), [spatial, st1, st2]);
        assert_eq!(row.spatial_product(), 100.0);
        assert_eq!(row.spatiotemporal_product(), 99.0);
        assert!(row.spatiotemporal_wins);

        let even = summary(10.0, 10.0, 10.0, 10.0);
        let row = SweepRow::new(point(), [even, even, even]);
        assert!(!row.spatiotemporal_wins);
    }

    #[test]
    fn test_best_partition_selection() {
        let spatial = summary(10.0, 50.0, 5.0, 30.0);
        let st1 = summary(20.0, 40.0, 8.0, 30.0);
        let st2 = summary(12.0, 40.0, 9.0, 11.0);
        let row = SweepRow::new(point(), [spatial, st1, st2]);
        // 40 ties between st1 and st2: the earlier strategy wins
        assert_eq!(row.best_partition_for_memory(), PartitionStrategy::SpatioTemporal1);
        assert_eq!(row.best_partition_for_compute(), PartitionStrategy::SpatioTemporal2);

        let report = SweepReport::from_rows(vec![row]);
        assert_eq!(report.memory_optimum_wins, [0, 1, 0]);
        assert_eq!(report.compute_optimum_wins, [0, 0, 1]);
        assert_eq!(report.dominated_count, 1);
        assert_eq!(report.dominance_fraction(), 1.0);
    }

    #[test]
    fn test_row_order() {
        let grid = SweepGrid::new(vec![10, 20], vec![5], vec![7], vec![2], vec![2], vec![1, 2]);
        let report = run(&grid).unwrap();
        let order: Vec<(usize, usize)> = report
            .rows
            .iter()
            .map(|r| (r.point.problem.m, r.point.num_cores))
            .collect();
        assert_eq!(order, vec![(10, 1), (10, 2), (20, 1), (20, 2)]);
    }

    #[test]
    fn test_total_count_is_grid_product() {
        let grid = SweepGrid::new(
            vec![64, 128],
            vec![96],
            vec![32, 48, 200],
            vec![4, 8],
            vec![4],
            vec![3, 4, 12],
        );
        let report = run(&grid).unwrap();
        assert_eq!(report.total_count, 36);
        assert_eq!(report.total_count, grid.total_count());
        assert_eq!(report.rows.len(), report.total_count);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = SweepGrid::new(
            vec![100, 1000],
            vec![300],
            vec![50, 5000],
            vec![8, 16],
            vec![16],
            vec![6, 16, 36],
        );
        assert_eq!(run_parallel(&grid).unwrap(), run(&grid).unwrap());
    }

    #[test]
    fn test_empty_grid() {
        let grid = SweepGrid::new(vec![], vec![1], vec![1], vec![1], vec![1], vec![1]);
        let report = run(&grid).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.total_count, 0);
        assert_eq!(report.dominance_fraction(), 0.0);
    }

    #[test]
    fn test_zero_values_fail_fast() {
        let grid = SweepGrid::single(100, 100, 100, 0, 8, 4);
        assert!(matches!(run(&grid), Err(DseError::InvalidConfig { .. })));

        let grid = SweepGrid::single(100, 100, 100, 8, 8, 0);
        assert!(matches!(run_parallel(&grid), Err(DseError::InvalidConfig { .. })));
    }
}
