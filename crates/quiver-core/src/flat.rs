//! Exact brute-force index
//!
//! Scans every stored vector per query. Useful as ground truth for recall
//! checks and for stores small enough that graph construction is not worth it.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::engine::{validate_batch, validate_query, IndexEngine};
use crate::error::EngineError;
use crate::format::{StateHeader, StateReader, StateWriter, FLAT_MAGIC, HEADER_SIZE};
use crate::metric::Metric;

pub struct FlatIndex {
    dim: usize,
    capacity: usize,
    metric: Metric,
    ef_search: usize,
    ids: Vec<u64>,
    vectors: Vec<Vec<f32>>,
    positions: HashMap<u64, usize>,
}

impl FlatIndex {
    pub fn new(dim: usize, config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if dim == 0 {
            return Err(EngineError::InvalidConfig(
                "vector dimension must be positive".into(),
            ));
        }
        Ok(Self {
            dim,
            capacity: config.max_elements,
            metric: config.metric,
            ef_search: config.ef_search,
            ids: Vec::new(),
            vectors: Vec::new(),
            positions: HashMap::new(),
        })
    }
}

impl IndexEngine for FlatIndex {
    fn init(dim: usize, config: &EngineConfig) -> Result<Self, EngineError> {
        FlatIndex::new(dim, config)
    }

    fn import_state(bytes: &[u8]) -> Result<Self, EngineError> {
        let mut r = StateReader::new(bytes);
        let header = StateHeader::read(&mut r, FLAT_MAGIC)?;

        let mut ids = Vec::with_capacity(header.count);
        let mut vectors = Vec::with_capacity(header.count);
        let mut positions = HashMap::with_capacity(header.count);
        for pos in 0..header.count {
            let id = r.u64()?;
            if positions.insert(id, pos).is_some() {
                return Err(EngineError::InvalidState(format!("duplicate id {id}")));
            }
            ids.push(id);
            vectors.push(r.vector(header.dim)?);
        }
        r.finish()?;

        Ok(Self {
            dim: header.dim,
            capacity: header.capacity,
            metric: header.metric,
            ef_search: header.ef_search.max(1),
            ids,
            vectors,
            positions,
        })
    }

    fn export_state(&self) -> Vec<u8> {
        let mut w = StateWriter::with_capacity(HEADER_SIZE + self.ids.len() * (8 + self.dim * 4));
        StateHeader {
            magic: FLAT_MAGIC,
            dim: self.dim,
            capacity: self.capacity,
            count: self.ids.len(),
            ef_search: self.ef_search,
            metric: self.metric,
        }
        .write(&mut w);
        for (id, v) in self.ids.iter().zip(&self.vectors) {
            w.put_u64(*id);
            w.put_vector(v);
        }
        w.finish()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn ef_search(&self) -> usize {
        self.ef_search
    }

    // Exact search has no beam; the value is only carried through snapshots.
    fn set_ef_search(&mut self, ef: usize) {
        self.ef_search = ef.max(1);
    }

    fn contains(&self, id: u64) -> bool {
        self.positions.contains_key(&id)
    }

    fn ids(&self) -> Vec<u64> {
        self.ids.clone()
    }

    fn insert_batch(&mut self, vectors: &[Vec<f32>], ids: &[u64]) -> Result<(), EngineError> {
        validate_batch(self, vectors, ids)?;
        for (v, &id) in vectors.iter().zip(ids) {
            self.positions.insert(id, self.ids.len());
            self.ids.push(id);
            self.vectors.push(self.metric.prepare(v));
        }
        Ok(())
    }

    fn knn_query(&self, query: &[f32], k: usize) -> Result<(Vec<u64>, Vec<f32>), EngineError> {
        validate_query(self.dim, query)?;
        let query = self.metric.prepare(query);

        let mut scored: Vec<(u64, f32)> = self
            .ids
            .iter()
            .zip(&self.vectors)
            .map(|(&id, v)| (id, self.metric.distance(&query, v)))
            .collect();
        // stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored.into_iter().unzip())
    }
}
