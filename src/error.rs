//! Error types for the systolic design-space explorer

use thiserror::Error;

/// Result type for sweep and cost-model operations
pub type DseResult<T> = Result<T, DseError>;

/// Exploration errors
#[derive(Debug, Error)]
pub enum DseError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown dataflow: {name} (expected one of os, ws, is)")]
    UnknownDataflow { name: String },

    #[error("Unknown partition strategy: {name} (expected one of spatial, spatio-temporal1, spatio-temporal2)")]
    UnknownPartition { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DseError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        DseError::InvalidConfig { message: msg.into() }
    }

    pub fn unknown_dataflow(name: impl Into<String>) -> Self {
        DseError::UnknownDataflow { name: name.into() }
    }

    pub fn unknown_partition(name: impl Into<String>) -> Self {
        DseError::UnknownPartition { name: name.into() }
    }

    /// True for the soft-failure variants that the search maps to infinite cost
    pub fn is_unknown_variant(&self) -> bool {
        matches!(
            self,
            DseError::UnknownDataflow { .. } | DseError::UnknownPartition { .. }
        )
    }
}
