//! Dataflow schedules
//!
//! Each dataflow keeps one GEMM operand resident and remaps (M, N, K) onto
//! two streamed extents and one temporal (reuse) extent:
//!
//! | Dataflow | Sr | Sc | T |
//! |----------|----|----|---|
//! | OS       | M  | N  | K |
//! | WS       | K  | M  | N |
//! | IS       | K  | N  | M |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DseError;
use crate::hardware::Problem;

/// Which operand stays resident in the array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataflow {
    /// Output-stationary
    #[serde(rename = "os")]
    Os,
    /// Weight-stationary
    #[serde(rename = "ws")]
    Ws,
    /// Input-stationary
    #[serde(rename = "is")]
    Is,
}

impl Dataflow {
    /// Search order; also the tie-break order across dataflows
    pub const ALL: [Dataflow; 3] = [Dataflow::Os, Dataflow::Ws, Dataflow::Is];

    pub fn name(&self) -> &'static str {
        match self {
            Dataflow::Os => "os",
            Dataflow::Ws => "ws",
            Dataflow::Is => "is",
        }
    }

    /// Map the GEMM onto this dataflow's streamed and temporal extents
    pub fn stream_extents(&self, problem: &Problem) -> StreamExtents {
        let Problem { m, n, k } = *problem;
        match self {
            Dataflow::Os => StreamExtents::new(m, n, k),
            Dataflow::Ws => StreamExtents::new(k, m, n),
            Dataflow::Is => StreamExtents::new(k, n, m),
        }
    }
}

impl FromStr for Dataflow {
    type Err = DseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "os" | "output-stationary" => Ok(Dataflow::Os),
            "ws" | "weight-stationary" => Ok(Dataflow::Ws),
            "is" | "input-stationary" => Ok(Dataflow::Is),
            _ => Err(DseError::unknown_dataflow(s)),
        }
    }
}

impl std::fmt::Display for Dataflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Abstract extents seen by the cost formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamExtents {
    /// Row-streamed extent (Sr)
    pub rows: usize,
    /// Column-streamed extent (Sc)
    pub cols: usize,
    /// Temporal extent reused across both streams (T)
    pub temporal: usize,
}

impl StreamExtents {
    pub fn new(rows: usize, cols: usize, temporal: usize) -> Self {
        Self {
            rows,
            cols,
            temporal,
        }
    }

    /// Exchange the two streamed extents, keeping T
    pub fn transposed(self) -> Self {
        Self::new(self.cols, self.rows, self.temporal)
    }
}
