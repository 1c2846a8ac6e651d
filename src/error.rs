//! Store error type

use std::path::PathBuf;

use quiver_core::EngineError;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `position` is the index of the offending vector within its batch (0 for queries).
    #[error("Dimension mismatch at position {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: usize,
    },

    #[error("Capacity exceeded: {requested} elements requested, capacity is {capacity}")]
    CapacityExceeded { capacity: usize, requested: usize },

    #[error("Snapshot not found at {}", path.display())]
    SnapshotNotFound { path: PathBuf },

    #[error("Persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt snapshot at {}: {reason}", path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding error: {0:#}")]
    Embedding(anyhow::Error),
}

impl StoreError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::CorruptSnapshot {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<EngineError> for StoreError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidConfig(msg) => StoreError::Configuration(msg),
            EngineError::DimensionMismatch {
                expected,
                actual,
                position,
            } => StoreError::DimensionMismatch {
                expected,
                actual,
                position,
            },
            EngineError::CapacityExceeded {
                capacity,
                requested,
            } => StoreError::CapacityExceeded {
                capacity,
                requested,
            },
            other @ (EngineError::BatchLengthMismatch { .. }
            | EngineError::DuplicateId(_)
            | EngineError::InvalidState(_)) => StoreError::InconsistentState(other.to_string()),
        }
    }
}
