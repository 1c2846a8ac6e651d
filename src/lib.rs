//! Quiver-DB: a persistent vector store over a pluggable ANN index
//!
//! # Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                     VectorStore<R, E>                       |
//! |        create · update · get_similar · reload · save        |
//! +------------------------------+------------------------------+
//! |   RecordMap (id -> record)   |  snapshot (index.bin +       |
//! |   id cursor = max + 1        |  records.json, sha-256 link) |
//! +------------------------------+------------------------------+
//! |          IndexEngine (quiver-core: Hnsw, FlatIndex)         |
//! +-------------------------------------------------------------+
//! ```
//!
//! ```no_run
//! use quiver_db::{StoreConfig, VectorStore};
//!
//! # fn main() -> quiver_db::Result<()> {
//! let config = StoreConfig::default().with_snapshot_dir("data/store");
//! let mut store: VectorStore = VectorStore::new(3, config)?;
//! store.create(vec![("a".to_string(), vec![1.0, 0.0, 0.0])], true)?;
//!
//! let hits = store.get_similar(&[1.0, 0.0, 0.0], 1, "data/store")?;
//! assert_eq!(hits[0].0, "a");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod records;
pub mod snapshot;
pub mod store;

pub use config::StoreConfig;
pub use embedding::EmbeddingSource;
pub use error::{Result, StoreError};
pub use records::RecordMap;
pub use store::{StoreStats, VectorStore};

pub use quiver_core::{EngineConfig, FlatIndex, Hnsw, IndexEngine, Metric};
