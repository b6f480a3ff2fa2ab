//! Tabular and JSON export of sweep results
//!
//! The CSV layout is `M, N, K, num_cores, R, C` followed by five columns per
//! partition strategy (21 columns in all).
//!
//! Floats are written with Rust's shortest round-trip formatting, so a whole
//! value prints without a fractional part (`9000000`, not `9000000.0`) and
//! the unreachable sentinel prints as `inf`. Parse columns numerically rather
//! than comparing text against other exporters.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::DseResult;
use crate::partition::PartitionStrategy;
use crate::sweep::{SweepReport, SweepRow};

const POINT_COLUMNS: [&str; 6] = ["M", "N", "K", "num_cores", "R", "C"];

const METRIC_PREFIXES: [&str; 5] = [
    "best_memory",
    "best_memory_compute",
    "best_compute",
    "best_compute_memory",
    "best_memory_times_compute",
];

/// Column names in output order
pub fn column_names() -> Vec<String> {
    let mut names: Vec<String> = POINT_COLUMNS.iter().map(|s| s.to_string()).collect();
    for partition in PartitionStrategy::ALL {
        for prefix in METRIC_PREFIXES {
            names.push(format!("{}_{}", prefix, partition.name()));
        }
    }
    names
}

/// One row's fields, aligned with [`column_names`]
pub fn record(row: &SweepRow) -> Vec<String> {
    let p = &row.point;
    let mut fields = vec![
        p.problem.m.to_string(),
        p.problem.n.to_string(),
        p.problem.k.to_string(),
        p.num_cores.to_string(),
        p.array.rows.to_string(),
        p.array.cols.to_string(),
    ];
    fields.extend(row.metric_values().iter().map(|v| v.to_string()));
    fields
}

/// Write header and rows as comma-separated text
pub fn write_csv<W: Write>(writer: &mut W, rows: &[SweepRow]) -> DseResult<()> {
    writeln!(writer, "{}", column_names().join(","))?;
    for row in rows {
        writeln!(writer, "{}", record(row).join(","))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, report: &SweepReport) -> DseResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(&mut writer, &report.rows)
}

impl SweepReport {
    /// Export to JSON, including the winning dataflow and grid per optimum
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text headline
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Total configurations analyzed: {}\n\
             Spatio-temporal beats spatial: {} ({:.1}%)\n",
            self.total_count,
            self.dominated_count,
            100.0 * self.dominance_fraction()
        );
        for partition in PartitionStrategy::ALL {
            out.push_str(&format!(
                "  {:<17} best at memory optimum: {:>5}, best at compute optimum: {:>5}\n",
                partition.name(),
                self.memory_optimum_wins[partition.index()],
                self.compute_optimum_wins[partition.index()],
            ));
        }
        out
    }
}

impl std::fmt::Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
