use std::collections::HashSet;

use super::index::{Hnsw, MAX_LAYER};
use super::node::Node;
use crate::error::EngineError;
use crate::format::{StateHeader, StateReader, StateWriter, HEADER_SIZE, HNSW_MAGIC};

/// `entry_point` sentinel for an empty graph
const NO_ENTRY: u64 = u64::MAX;

impl Hnsw {
    /// Encode the whole index (graph, vectors, ids, parameters).
    ///
    /// Format after the common [`StateHeader`]:
    /// - M: u32
    /// - ef_construction: u32
    /// - Seed: u64
    /// - EntryPoint: u64 (u64::MAX if None)
    /// - MaxLayer: u8
    /// - Body (one record per slot, in slot order):
    ///   - Id: u64
    ///   - Vector: [f32; D]
    ///   - NodeMaxLayer: u8
    ///   - Per Layer 0..=NodeMaxLayer:
    ///     - NeighborCount: u32
    ///     - Neighbors: [u32; NeighborCount]
    pub fn encode(&self) -> Vec<u8> {
        let per_node = 8 + self.dim * 4 + 1 + 4 + self.m0 * 4;
        let mut w = StateWriter::with_capacity(HEADER_SIZE + 32 + self.nodes.len() * per_node);

        StateHeader {
            magic: HNSW_MAGIC,
            dim: self.dim,
            capacity: self.capacity,
            count: self.nodes.len(),
            ef_search: self.ef_search,
            metric: self.metric,
        }
        .write(&mut w);

        w.put_u32(self.m as u32);
        w.put_u32(self.ef_construction as u32);
        w.put_u64(self.seed);
        w.put_u64(self.entry_point.map_or(NO_ENTRY, |e| e as u64));
        w.put_u8(self.max_layer as u8);

        for node in &self.nodes {
            w.put_u64(self.labels[node.slot]);
            w.put_vector(&self.vectors[node.slot]);
            w.put_u8(node.top_layer() as u8);
            for neighbors in &node.links {
                w.put_u32(neighbors.len() as u32);
                for &n in neighbors {
                    w.put_u32(n as u32);
                }
            }
        }

        w.finish()
    }

    /// Decode an index produced by [`Hnsw::encode`], validating every reference.
    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        let mut r = StateReader::new(bytes);
        let header = StateHeader::read(&mut r, HNSW_MAGIC)?;

        let m = r.u32()? as usize;
        let ef_construction = r.u32()? as usize;
        let seed = r.u64()?;
        let entry_raw = r.u64()?;
        let max_layer = r.u8()? as usize;

        if m < 2 {
            return Err(EngineError::InvalidState(format!("m must be at least 2, got {m}")));
        }
        if max_layer > MAX_LAYER {
            return Err(EngineError::InvalidState(format!(
                "max layer {max_layer} exceeds limit {MAX_LAYER}"
            )));
        }

        let count = header.count;
        let mut nodes = Vec::with_capacity(count);
        let mut vectors = Vec::with_capacity(count);
        let mut labels = Vec::with_capacity(count);
        let mut seen = HashSet::with_capacity(count);

        for slot in 0..count {
            let label = r.u64()?;
            if !seen.insert(label) {
                return Err(EngineError::InvalidState(format!("duplicate id {label}")));
            }
            let vector = r.vector(header.dim)?;

            let node_max_layer = r.u8()? as usize;
            if node_max_layer > max_layer {
                return Err(EngineError::InvalidState(format!(
                    "node {slot} claims layer {node_max_layer} above graph max {max_layer}"
                )));
            }

            let mut node = Node::new(slot, node_max_layer);
            for layer in 0..=node_max_layer {
                let n = r.u32()? as usize;
                if n > count {
                    return Err(EngineError::InvalidState(format!(
                        "node {slot} has {n} neighbors on layer {layer}, only {count} nodes exist"
                    )));
                }
                let mut neighbors = Vec::with_capacity(n);
                for _ in 0..n {
                    let neighbor = r.u32()? as usize;
                    if neighbor >= count {
                        return Err(EngineError::InvalidState(format!(
                            "node {slot} links to missing slot {neighbor}"
                        )));
                    }
                    neighbors.push(neighbor);
                }
                node.relink(layer, neighbors);
            }

            nodes.push(node);
            vectors.push(vector);
            labels.push(label);
        }
        r.finish()?;

        let entry_point = match (entry_raw, count) {
            (NO_ENTRY, 0) => None,
            (NO_ENTRY, _) => {
                return Err(EngineError::InvalidState("non-empty graph without entry point".into()))
            }
            (e, _) if (e as usize) < count && nodes[e as usize].top_layer() == max_layer => {
                Some(e as usize)
            }
            (e, _) => {
                return Err(EngineError::InvalidState(format!("invalid entry point {e}")))
            }
        };

        Ok(Hnsw::from_parts(
            nodes,
            vectors,
            labels,
            entry_point,
            max_layer,
            header.dim,
            header.capacity,
            m,
            ef_construction.max(1),
            header.ef_search.max(1),
            header.metric,
            seed,
        ))
    }
}
