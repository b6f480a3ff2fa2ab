//! Example: Reference sweep and the spatio-temporal dominance headline
//!
//! Runs the 729-tuple reference grid in parallel and reports how often a
//! spatio-temporal partition beats spatial partitioning on memory x compute.
//!
//! Run with: cargo run --release --example headline_sweep

use systolic_dse::{run_sweep_with, PartitionStrategy, SweepGrid};

fn main() {
    let grid = SweepGrid::default();
    println!("=== Reference sweep: {} tuples ===\n", grid.total_count());

    let report = run_sweep_with(&grid, true).unwrap();
    println!("{}", report);

    // Tuples where spatio-temporal wins, grouped by core count
    for &cores in &grid.num_cores_values {
        let (wins, total) = report
            .rows
            .iter()
            .filter(|r| r.point.num_cores == cores)
            .fold((0, 0), |(w, t), r| (w + r.spatiotemporal_wins as usize, t + 1));
        println!("  {:>3} cores: {:>3}/{} tuples", cores, wins, total);
    }
    println!();

    let best = report
        .rows
        .iter()
        .min_by(|a, b| {
            let pa = a.summary(PartitionStrategy::Spatial).best_memory_times_compute;
            let pb = b.summary(PartitionStrategy::Spatial).best_memory_times_compute;
            pa.total_cmp(&pb)
        })
        .unwrap();
    let spatial = best.summary(PartitionStrategy::Spatial);
    println!(
        "Smallest spatial memory x compute: GEMM {} on {} cores of {} ({:?} dataflow, grid {:?})",
        best.point.problem,
        best.point.num_cores,
        best.point.array,
        spatial.best_memory_dataflow,
        spatial.best_memory_grid,
    );
}
