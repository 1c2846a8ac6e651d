//! The index engine contract
//!
//! Everything the store layer needs from an ANN structure: batch insert with
//! caller-chosen ids, top-k query by distance, and an opaque state blob for
//! persistence. Implementations validate a whole batch before touching any
//! state, so a failed insert leaves the engine exactly as it was.

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metric::Metric;

pub trait IndexEngine: Send + Sync {
    /// Build an empty engine for `dim`-dimensional vectors.
    fn init(dim: usize, config: &EngineConfig) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Restore an engine from bytes produced by [`IndexEngine::export_state`].
    fn import_state(bytes: &[u8]) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Serialize the full engine state. The format is engine-private and versioned.
    fn export_state(&self) -> Vec<u8>;

    fn dim(&self) -> usize;

    fn capacity(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metric(&self) -> Metric;

    fn ef_search(&self) -> usize;

    fn set_ef_search(&mut self, ef: usize);

    fn contains(&self, id: u64) -> bool;

    /// All ids currently indexed, in insertion order.
    fn ids(&self) -> Vec<u64>;

    /// Insert `vectors[i]` under `ids[i]`. All-or-nothing.
    fn insert_batch(&mut self, vectors: &[Vec<f32>], ids: &[u64]) -> Result<(), EngineError>;

    /// The `min(k, len)` nearest ids with their distances, ascending.
    fn knn_query(&self, query: &[f32], k: usize) -> Result<(Vec<u64>, Vec<f32>), EngineError>;
}

/// Shared pre-insert checks: matching lengths, dimensions, capacity, id uniqueness.
pub(crate) fn validate_batch<E: IndexEngine + ?Sized>(
    engine: &E,
    vectors: &[Vec<f32>],
    ids: &[u64],
) -> Result<(), EngineError> {
    if vectors.len() != ids.len() {
        return Err(EngineError::BatchLengthMismatch {
            vectors: vectors.len(),
            ids: ids.len(),
        });
    }

    let dim = engine.dim();
    if let Some((position, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(EngineError::DimensionMismatch {
            expected: dim,
            actual: v.len(),
            position,
        });
    }

    let requested = engine.len() + ids.len();
    if requested > engine.capacity() {
        return Err(EngineError::CapacityExceeded {
            capacity: engine.capacity(),
            requested,
        });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) || engine.contains(id) {
            return Err(EngineError::DuplicateId(id));
        }
    }

    Ok(())
}

pub(crate) fn validate_query(dim: usize, query: &[f32]) -> Result<(), EngineError> {
    if query.len() != dim {
        return Err(EngineError::DimensionMismatch {
            expected: dim,
            actual: query.len(),
            position: 0,
        });
    }
    Ok(())
}
