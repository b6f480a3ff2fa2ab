//! Example: One GEMM on a 16-core grid of 16x16 arrays
//!
//! Walks the 1000x1000x1000 GEMM through every dataflow, partition and
//! core-grid orientation, then shows the best-of search.
//!
//! Run with: cargo run --example single_config

use systolic_dse::{
    ArrayShape, CostModel, Dataflow, DseDriver, PartitionStrategy, Problem,
};

fn main() {
    println!("=== 1000x1000x1000 GEMM on 16 cores of 16x16 ===\n");

    let problem = Problem::new(1000, 1000, 1000);
    let array = ArrayShape::square(16);
    let num_cores = 16;

    let driver = DseDriver::new(problem, array, num_cores).unwrap();
    let model = CostModel::new(array, num_cores).unwrap();

    println!("Core grids considered:");
    for grid in driver.orientations() {
        print!(" {}", grid);
    }
    println!("\n");

    // Hand check for OS / spatial / (4, 4):
    //   cycles = (2*16 + 16 + 1000 - 2) * ceil(1000/64)^2 = 1046 * 16 * 16 = 267776
    //   words  = 16 * (250000 + 250000 + 62500) = 9000000
    for partition in PartitionStrategy::ALL {
        println!("Partition: {}", partition);
        for dataflow in Dataflow::ALL {
            let extents = dataflow.stream_extents(&problem);
            for grid in driver.orientations() {
                let m = model.evaluate(extents, partition, grid);
                println!(
                    "  {} grid {:<9} cycles {:>10} words {:>12}",
                    dataflow,
                    grid.to_string(),
                    m.compute_cycles,
                    m.memory_words
                );
            }

            let best = driver.search(dataflow, partition);
            println!(
                "  {} best memory {} (at {} cycles), best compute {} (at {} words)\n",
                dataflow,
                best.best_memory,
                best.compute_at_best_memory,
                best.best_compute,
                best.memory_at_best_compute
            );
        }
    }
}
