//! Multi-core systolic array design-space explorer
//!
//! This library models how a GEMM of shape M x N x K maps onto a grid of
//! R x C systolic cores. For each core count it searches the 2-D grid
//! factorizations, the output-, weight- and input-stationary dataflows and
//! three partition strategies, and reports the compute-cycle and memory cost
//! of the best configurations.
//!
//! # Example
//!
//! ```rust
//! use systolic_dse::{run_sweep, SweepGrid, PartitionStrategy};
//!
//! let grid = SweepGrid::single(1000, 1000, 1000, 16, 16, 16);
//! let report = run_sweep(&grid).unwrap();
//! let spatial = report.rows[0].summary(PartitionStrategy::Spatial);
//! assert_eq!(spatial.best_memory, 9_000_000.0);
//! println!("{}", report);
//! ```

pub mod config;
pub mod cost;
pub mod dataflow;
pub mod dse;
pub mod error;
pub mod factors;
pub mod hardware;
pub mod partition;
pub mod report;
pub mod sweep;

pub use config::SweepGrid;
pub use cost::{CostModel, Metrics};
pub use dataflow::{Dataflow, StreamExtents};
pub use dse::{BestTracker, DseDriver, SearchResult};
pub use error::{DseError, DseResult};
pub use factors::{enumerate_factor_pairs, FactorPair};
pub use hardware::{ArrayShape, Problem};
pub use partition::PartitionStrategy;
pub use sweep::{PartitionSummary, SweepPoint, SweepReport, SweepRow};

/// Run the full sweep over `grid`, optionally across all cores
pub fn run_sweep_with(grid: &SweepGrid, parallel: bool) -> DseResult<SweepReport> {
    if parallel {
        sweep::run_parallel(grid)
    } else {
        sweep::run(grid)
    }
}

/// Run the full sweep over `grid` sequentially
pub fn run_sweep(grid: &SweepGrid) -> DseResult<SweepReport> {
    run_sweep_with(grid, false)
}
