//! Quiver Core – ANN index engines, distance metrics, and state blobs
//!
//! # Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                 IndexEngine (engine contract)               |
//! |        insert_batch · knn_query · export/import_state       |
//! +------------------------------+------------------------------+
//! |      Hnsw (approximate)      |      FlatIndex (exact)       |
//! +------------------------------+------------------------------+
//! |      Metric (cosine / l2 / ip) · simd kernels · format      |
//! +-------------------------------------------------------------+
//! ```
//!
//! Engines own their vectors and the caller-chosen `u64` ids; anything that
//! maps ids back to application records lives one layer up.

pub mod config;
pub mod engine;
pub mod error;
pub mod flat;
pub mod format;
pub mod hnsw;
pub mod metric;
pub mod simd;

pub use config::EngineConfig;
pub use engine::IndexEngine;
pub use error::EngineError;
pub use flat::FlatIndex;
pub use hnsw::{Hnsw, HnswStats};
pub use metric::Metric;
pub use simd::{dot_product, l2_distance, l2_distance_squared, l2_normalize};
