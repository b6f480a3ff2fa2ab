//! Multi-core systolic design-space sweep CLI
//!
//! Usage:
//!   systolic-dse                                  # reference 729-tuple grid
//!   systolic-dse --m 1000,2000 --cores 16 --csv results.csv
//!   systolic-dse --config grid.json --parallel --json

use clap::Parser as ClapParser;
use colored::Colorize;
use log::LevelFilter;

use systolic_dse::{
    report, run_sweep_with, DseResult, PartitionStrategy, SweepGrid, SweepReport,
};

#[derive(ClapParser, Debug)]
#[command(name = "systolic-dse")]
#[command(author = "FPGA Team")]
#[command(version = "0.1.0")]
#[command(about = "Sweeps GEMM mappings over multi-core systolic arrays")]
struct Args {
    /// Read the sweep grid from a JSON file
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// M values (rows of the left operand)
    #[arg(long = "m", value_delimiter = ',')]
    m_values: Option<Vec<usize>>,

    /// N values (columns of the right operand)
    #[arg(long = "n", value_delimiter = ',')]
    n_values: Option<Vec<usize>>,

    /// K values (contraction dimension)
    #[arg(long = "k", value_delimiter = ',')]
    k_values: Option<Vec<usize>>,

    /// Array row counts (R)
    #[arg(long = "rows", value_delimiter = ',')]
    r_values: Option<Vec<usize>>,

    /// Array column counts (C)
    #[arg(long = "cols", value_delimiter = ',')]
    c_values: Option<Vec<usize>>,

    /// Core counts
    #[arg(long = "cores", value_delimiter = ',')]
    num_cores_values: Option<Vec<usize>>,

    /// Write the result table to a CSV file
    #[arg(long = "csv")]
    csv_path: Option<String>,

    /// Print the full report as JSON
    #[arg(short = 'j', long = "json")]
    json_output: bool,

    /// Evaluate tuples on all CPU cores
    #[arg(short = 'p', long = "parallel")]
    parallel: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Args {
    fn grid(&self) -> DseResult<SweepGrid> {
        let mut grid = match &self.config {
            Some(path) => SweepGrid::from_json_file(path)?,
            None => SweepGrid::default(),
        };

        let overrides = [
            (&self.m_values, &mut grid.m_values),
            (&self.n_values, &mut grid.n_values),
            (&self.k_values, &mut grid.k_values),
            (&self.r_values, &mut grid.r_values),
            (&self.c_values, &mut grid.c_values),
            (&self.num_cores_values, &mut grid.num_cores_values),
        ];
        for (value, slot) in overrides {
            if let Some(values) = value {
                *slot = values.clone();
            }
        }

        Ok(grid)
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let grid = args.grid().unwrap_or_else(|e| {
        eprintln!("{}: {}", "Configuration error".red(), e);
        std::process::exit(1);
    });

    if args.verbose && !args.json_output {
        println!("{}", "Multi-core Systolic Design-Space Sweep".bold().blue());
        println!("{}", "=".repeat(38));
        println!();
        println!("{}: {:?}", "M".green(), grid.m_values);
        println!("{}: {:?}", "N".green(), grid.n_values);
        println!("{}: {:?}", "K".green(), grid.k_values);
        println!("{}: {:?}", "R".green(), grid.r_values);
        println!("{}: {:?}", "C".green(), grid.c_values);
        println!("{}: {:?}", "Cores".green(), grid.num_cores_values);
        println!();
    }

    let result = match run_sweep_with(&grid, args.parallel) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}: {}", "Sweep error".red(), e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.csv_path {
        if let Err(e) = report::write_csv_file(path, &result) {
            eprintln!("{}: Failed to write '{}': {}", "Error".red(), path, e);
            std::process::exit(1);
        }
    }

    if args.json_output {
        match result.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}: Failed to serialize to JSON: {}", "Error".red(), e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&result, args.verbose);
        if let Some(path) = &args.csv_path {
            println!();
            println!("{}: {}", "Wrote".cyan(), path);
        }
    }
}

fn print_report(report: &SweepReport, verbose: bool) {
    println!("{}", "Sweep Results".bold().green());
    println!("{}", "=".repeat(50));
    println!();

    println!("{}: {}", "Configurations".cyan(), report.total_count);
    println!(
        "{}: {} ({:.1}%)",
        "Spatio-temporal beats spatial".cyan(),
        report.dominated_count,
        100.0 * report.dominance_fraction()
    );
    println!();

    println!("{}", "Best Partition Tally".bold().yellow());
    println!("{}", "-".repeat(50));
    for partition in PartitionStrategy::ALL {
        println!(
            "  {:<17} memory-optimal: {:>5}  compute-optimal: {:>5}",
            partition.name(),
            report.memory_optimum_wins[partition.index()],
            report.compute_optimum_wins[partition.index()]
        );
    }

    if verbose || report.rows.len() <= 8 {
        println!();
        println!("{}", "Row Details".bold().yellow());
        println!("{}", "-".repeat(50));

        for row in &report.rows {
            let p = &row.point;
            println!();
            println!(
                "{} {} on {} cores of {}",
                "GEMM".bold(),
                p.problem.to_string().bold(),
                p.num_cores,
                p.array
            );
            for partition in PartitionStrategy::ALL {
                let s = row.summary(partition);
                println!(
                    "  {:<17} memory {:.4e} @ {:.4e} cycles | compute {:.4e} @ {:.4e} words",
                    partition.name(),
                    s.best_memory,
                    s.best_memory_compute,
                    s.best_compute,
                    s.best_compute_memory
                );
            }
            if row.spatiotemporal_wins {
                println!("  {}", "spatio-temporal dominates".magenta());
            }
        }
    } else {
        println!();
        println!("({} rows, use -v or --csv for details)", report.rows.len());
    }
}
