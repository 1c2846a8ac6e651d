//! Engine error type

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// `position` is the offending vector's index within the batch (0 for queries).
    #[error("Dimension mismatch at position {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: usize,
    },

    #[error("Capacity exceeded: {requested} elements requested, capacity is {capacity}")]
    CapacityExceeded { capacity: usize, requested: usize },

    #[error("Batch length mismatch: {vectors} vectors but {ids} ids")]
    BatchLengthMismatch { vectors: usize, ids: usize },

    #[error("Duplicate id {0}")]
    DuplicateId(u64),

    #[error("Invalid engine state: {0}")]
    InvalidState(String),
}
