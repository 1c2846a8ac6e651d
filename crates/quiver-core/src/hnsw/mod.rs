//! HNSW (Hierarchical Navigable Small World) Index
//!
//! A multi-layer graph structure for approximate nearest neighbor search.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: o-----------------------o          (few nodes, long-range)
//!          |                       |
//! Layer 1: o-------o---------o-----o          (more nodes)
//!          |       |         |     |
//! Layer 0: o-o-o-o-o-o-o-o-o-o-o-o-o          (all nodes)
//! ```
//!
//! The index owns its vectors and maps caller ids to internal slots, so it can
//! be exported as a single self-contained blob.

mod index;
mod node;
mod serialize;
mod visited;

pub use index::{Hnsw, HnswStats};
pub use node::Node;
pub use visited::{VisitedGuard, VisitedSet};
