//! Work partitioning across the core grid

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DseError;

/// How the grid factors (p0, p1) divide the streamed and temporal extents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionStrategy {
    /// p0 splits Sr, p1 splits Sc; T is resident on every core
    #[serde(rename = "spatial")]
    Spatial,
    /// p0 splits T, p1 splits Sc; Sr is only tiled by R
    #[serde(rename = "spatio-temporal1")]
    SpatioTemporal1,
    /// p0 splits T, p1 splits Sr; Sc is only tiled by C
    #[serde(rename = "spatio-temporal2")]
    SpatioTemporal2,
}

impl PartitionStrategy {
    /// Canonical order, used for output columns and tie-breaks
    pub const ALL: [PartitionStrategy; 3] = [
        PartitionStrategy::Spatial,
        PartitionStrategy::SpatioTemporal1,
        PartitionStrategy::SpatioTemporal2,
    ];

    /// Column suffix used in sweep output
    pub fn name(&self) -> &'static str {
        match self {
            PartitionStrategy::Spatial => "spatial",
            PartitionStrategy::SpatioTemporal1 => "spatio-temporal1",
            PartitionStrategy::SpatioTemporal2 => "spatio-temporal2",
        }
    }

    /// Position in [`PartitionStrategy::ALL`]
    pub fn index(&self) -> usize {
        match self {
            PartitionStrategy::Spatial => 0,
            PartitionStrategy::SpatioTemporal1 => 1,
            PartitionStrategy::SpatioTemporal2 => 2,
        }
    }

    pub fn is_spatio_temporal(&self) -> bool {
        !matches!(self, PartitionStrategy::Spatial)
    }
}

impl FromStr for PartitionStrategy {
    type Err = DseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spatial" => Ok(PartitionStrategy::Spatial),
            "spatio-temporal1" | "spatio-temporal-1" | "st1" => {
                Ok(PartitionStrategy::SpatioTemporal1)
            }
            "spatio-temporal2" | "spatio-temporal-2" | "st2" => {
                Ok(PartitionStrategy::SpatioTemporal2)
            }
            _ => Err(DseError::unknown_partition(s)),
        }
    }
}

impl std::fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
