//! The store manager
//!
//! A [`VectorStore`] owns one index engine, the id -> record mapping, and the
//! identifier cursor. Between calls the snapshot on disk is the source of
//! truth: `update` and `get_similar` always reload it before doing anything.

use std::path::Path;

use quiver_core::{Hnsw, IndexEngine, Metric};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::records::RecordMap;
use crate::snapshot;

/// Point-in-time summary of a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub dim: usize,
    pub len: usize,
    pub capacity: usize,
    pub next_id: u64,
    pub metric: Metric,
    pub ef_search: usize,
}

pub struct VectorStore<R = String, E = Hnsw> {
    config: StoreConfig,
    dim: usize,
    engine: E,
    records: RecordMap<R>,
    next_id: u64,
}

impl<R, E> VectorStore<R, E>
where
    R: Serialize + DeserializeOwned + Clone,
    E: IndexEngine,
{
    /// Empty store for `dim`-dimensional vectors.
    pub fn new(dim: usize, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        if dim == 0 {
            return Err(StoreError::Configuration(
                "vector dimension must be positive".into(),
            ));
        }
        let engine = E::init(dim, &config.engine)?;
        Ok(Self {
            config,
            dim,
            engine,
            records: RecordMap::new(),
            next_id: 0,
        })
    }

    /// Open the snapshot at `path`. The dimension comes from the snapshot;
    /// `config.engine.ef_search` overrides the persisted search width and
    /// `config.engine.metric` must match the persisted metric.
    pub fn load(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let snap = snapshot::read::<E, R>(path)?;
        check_metric(path, snap.engine.metric(), config.engine.metric)?;
        let mut store = Self {
            dim: snap.dim,
            next_id: snap.records.next_id(),
            engine: snap.engine,
            records: snap.records,
            config,
        };
        store.engine.set_ef_search(store.config.engine.ef_search);
        tracing::info!(
            "Loaded vector store from {:?}: {} records, next id {}",
            path,
            store.len(),
            store.next_id
        );
        Ok(store)
    }

    /// Replace all in-memory state with the snapshot at `path`.
    ///
    /// The identifier cursor is recomputed from the reloaded mapping. The
    /// snapshot must have this store's dimension and configured metric. On
    /// error the current state is left untouched.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snap = snapshot::read::<E, R>(path)?;
        if snap.dim != self.dim {
            return Err(StoreError::Configuration(format!(
                "snapshot at {} holds {}-dimensional vectors, store is configured for {}",
                path.display(),
                snap.dim,
                self.dim
            )));
        }
        check_metric(path, snap.engine.metric(), self.config.engine.metric)?;

        self.engine = snap.engine;
        self.engine.set_ef_search(self.config.engine.ef_search);
        self.records = snap.records;
        self.next_id = self.records.next_id();
        tracing::debug!(
            "Reloaded {:?}: {} records, next id {}",
            path,
            self.records.len(),
            self.next_id
        );
        Ok(())
    }

    /// Insert a batch, optionally persisting to `config.snapshot_dir`.
    ///
    /// Identifiers are assigned in iteration order. If persisting fails the
    /// error is returned but the inserted records stay queryable through
    /// [`VectorStore::search`].
    pub fn create<I>(&mut self, items: I, persist: bool) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = (R, Vec<f32>)>,
    {
        let ids = self.insert(items)?;
        tracing::info!(
            "Inserted {} records (ids {}..{})",
            ids.len(),
            ids.first().copied().unwrap_or_default(),
            self.next_id
        );

        if persist {
            let dir = self.config.snapshot_dir.clone();
            if let Err(e) = self.save(&dir) {
                tracing::warn!("Failed to persist vector store to {:?}: {}", dir, e);
                return Err(e);
            }
        }
        Ok(ids)
    }

    /// Reload the snapshot at `path`, append a batch, and write it back.
    pub fn update<I>(&mut self, items: I, path: impl AsRef<Path>) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = (R, Vec<f32>)>,
    {
        let path = path.as_ref();
        self.reload(path)?;
        let ids = self.insert(items)?;
        if let Err(e) = self.save(path) {
            tracing::warn!("Failed to persist vector store to {:?}: {}", path, e);
            return Err(e);
        }
        tracing::info!(
            "Updated {:?} with {} records, now {}",
            path,
            ids.len(),
            self.records.len()
        );
        Ok(ids)
    }

    /// Reload the snapshot at `path` and return up to `top_n` nearest records,
    /// closest first.
    pub fn get_similar(
        &mut self,
        query: &[f32],
        top_n: usize,
        path: impl AsRef<Path>,
    ) -> Result<Vec<(R, f32)>> {
        check_top_n(top_n)?;
        self.reload(path)?;
        self.search(query, top_n)
    }

    /// Query the in-memory state without touching disk.
    pub fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<(R, f32)>> {
        check_top_n(top_n)?;
        let (ids, distances) = self.engine.knn_query(query, top_n)?;
        tracing::debug!("Query returned {} of {} requested", ids.len(), top_n);

        let expected = top_n.min(self.records.len());
        if ids.len() != expected {
            return Err(StoreError::InconsistentState(format!(
                "index answered {} results for top_n = {top_n} over {} records",
                ids.len(),
                self.records.len()
            )));
        }

        ids.into_iter()
            .zip(distances)
            .map(|(id, distance)| match self.records.get(id) {
                Some(record) => Ok((record.clone(), distance)),
                None => Err(StoreError::InconsistentState(format!(
                    "index returned id {id} with no record"
                ))),
            })
            .collect()
    }

    /// Persist the current state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        snapshot::write(path, self.dim, &self.engine, &self.records)?;
        tracing::info!("Persisted {} records to {:?}", self.records.len(), path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Identifier the next inserted record will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn record(&self, id: u64) -> Option<&R> {
        self.records.get(id)
    }

    pub fn records(&self) -> &RecordMap<R> {
        &self.records
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            dim: self.dim,
            len: self.records.len(),
            capacity: self.engine.capacity(),
            next_id: self.next_id,
            metric: self.engine.metric(),
            ef_search: self.engine.ef_search(),
        }
    }

    /// Validate, allocate ids, and insert. Nothing changes unless everything succeeds.
    fn insert<I>(&mut self, items: I) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = (R, Vec<f32>)>,
    {
        let (records, vectors): (Vec<R>, Vec<Vec<f32>>) = items.into_iter().unzip();
        if vectors.is_empty() {
            return Err(StoreError::InvalidArgument(
                "at least one record is required".into(),
            ));
        }
        if let Some((position, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != self.dim)
        {
            return Err(StoreError::DimensionMismatch {
                expected: self.dim,
                actual: v.len(),
                position,
            });
        }
        let requested = self.engine.len() + vectors.len();
        if requested > self.engine.capacity() {
            return Err(StoreError::CapacityExceeded {
                capacity: self.engine.capacity(),
                requested,
            });
        }

        let ids: Vec<u64> = (self.next_id..self.next_id + vectors.len() as u64).collect();
        if let Some(&taken) = ids.iter().find(|&&id| self.records.contains(id)) {
            return Err(StoreError::InconsistentState(format!(
                "identifier {taken} is already assigned"
            )));
        }

        self.engine.insert_batch(&vectors, &ids)?;
        self.records
            .extend(ids.iter().copied().zip(records))
            .map_err(|id| StoreError::InconsistentState(format!("identifier {id} is already assigned")))?;
        self.next_id += ids.len() as u64;
        Ok(ids)
    }
}

fn check_metric(path: &Path, persisted: Metric, configured: Metric) -> Result<()> {
    if persisted != configured {
        return Err(StoreError::Configuration(format!(
            "snapshot at {} uses the {persisted} metric, store is configured for {configured}",
            path.display()
        )));
    }
    Ok(())
}

fn check_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(StoreError::InvalidArgument("top_n must be positive".into()));
    }
    Ok(())
}
