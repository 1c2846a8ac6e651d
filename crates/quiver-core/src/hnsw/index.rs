//! HNSW Index Implementation
//!
//! The core HNSW algorithm with:
//! - Random layer assignment (exponential distribution)
//! - Diversity-preserving neighbor selection heuristic
//! - Greedy beam search with epoch-stamped visited tracking
//!
//! # Algorithm Overview
//!
//! **Insert**: Assign random layer L, search top-down from entry point to L,
//! then wire connections on all layers from L down to 0.
//!
//! **Search**: Start at entry point, greedy descent to layer 0, then beam search
//! on layer 0 with `max(ef_search, k)` candidates.
//!
//! Vectors live inside the index, addressed by a dense *slot* (insertion
//! order). Callers see only their own `u64` ids; the slot↔id translation
//! happens at the edges of `insert` and `search`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::node::Node;
use super::visited::VisitedGuard;
use crate::config::EngineConfig;
use crate::engine::{validate_batch, validate_query, IndexEngine};
use crate::error::EngineError;
use crate::metric::Metric;

/// Highest layer a node may be assigned to; the state blob stores layer counts as u8.
pub(crate) const MAX_LAYER: usize = 32;

/// Frontier entry, popped closest-first
#[derive(Clone, Copy)]
struct Nearest {
    slot: usize,
    distance: f32,
}

impl PartialEq for Nearest {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Nearest {}

impl Ord for Nearest {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap (smaller distance = higher priority)
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Nearest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result set entry, popped furthest-first so the worst match is evicted
#[derive(Clone, Copy)]
struct Furthest {
    slot: usize,
    distance: f32,
}

impl PartialEq for Furthest {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Furthest {}

impl Ord for Furthest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Furthest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// HNSW Index
///
/// A hierarchical graph structure for approximate nearest neighbor search.
pub struct Hnsw {
    /// Graph nodes, indexed by slot
    pub(crate) nodes: Vec<Node>,

    /// Stored vectors, indexed by slot (normalized for cosine)
    pub(crate) vectors: Vec<Vec<f32>>,

    /// Caller id of each slot
    pub(crate) labels: Vec<u64>,

    /// Caller id → slot
    pub(crate) label_to_slot: HashMap<u64, usize>,

    /// Entry point slot (node on the highest layer)
    pub(crate) entry_point: Option<usize>,

    /// Maximum layer currently in the graph
    pub(crate) max_layer: usize,

    pub(crate) dim: usize,

    pub(crate) capacity: usize,

    /// Max neighbors per layer (M)
    pub(crate) m: usize,

    /// Max neighbors for layer 0 (2*M)
    pub(crate) m0: usize,

    /// Level multiplier for random layer assignment (1/ln(M))
    ml: f64,

    /// Search depth during construction
    pub(crate) ef_construction: usize,

    /// Search depth during queries
    pub(crate) ef_search: usize,

    pub(crate) metric: Metric,

    /// Seed the layer RNG was derived from; persisted so reloads stay reproducible
    pub(crate) seed: u64,

    rng: StdRng,
}

impl Hnsw {
    /// Create an empty index for `dim`-dimensional vectors
    pub fn new(dim: usize, config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if dim == 0 {
            return Err(EngineError::InvalidConfig(
                "vector dimension must be positive".into(),
            ));
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            nodes: Vec::new(),
            vectors: Vec::new(),
            labels: Vec::new(),
            label_to_slot: HashMap::new(),
            entry_point: None,
            max_layer: 0,
            dim,
            capacity: config.max_elements,
            m: config.m,
            m0: config.m * 2,
            ml: 1.0 / (config.m as f64).ln(),
            ef_construction: config.ef_construction,
            ef_search: config.ef_search,
            metric: config.metric,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Reassemble an index from decoded parts.
    ///
    /// The layer RNG is re-derived from `seed` and the element count, so two
    /// loads of the same blob grow identically.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        vectors: Vec<Vec<f32>>,
        labels: Vec<u64>,
        entry_point: Option<usize>,
        max_layer: usize,
        dim: usize,
        capacity: usize,
        m: usize,
        ef_construction: usize,
        ef_search: usize,
        metric: Metric,
        seed: u64,
    ) -> Self {
        let label_to_slot = labels
            .iter()
            .enumerate()
            .map(|(slot, &label)| (label, slot))
            .collect();
        let rng = StdRng::seed_from_u64(seed ^ (labels.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        Self {
            nodes,
            vectors,
            labels,
            label_to_slot,
            entry_point,
            max_layer,
            dim,
            capacity,
            m,
            m0: m * 2,
            ml: 1.0 / (m as f64).ln(),
            ef_construction,
            ef_search,
            metric,
            seed,
            rng,
        }
    }

    /// Distance between a prepared query and the vector in `slot`
    #[inline]
    fn distance_to(&self, query: &[f32], slot: usize) -> f32 {
        self.metric.distance(query, &self.vectors[slot])
    }

    #[inline]
    fn max_neighbors(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m0
        } else {
            self.m
        }
    }

    /// Assign a random layer based on exponential distribution
    fn random_layer(&mut self) -> usize {
        let r: f64 = self.rng.gen();
        // r == 0 would give ln(0) = -inf
        let layer = (-r.max(f64::MIN_POSITIVE).ln() * self.ml).floor() as usize;
        layer.min(MAX_LAYER)
    }

    /// Insert one already-validated vector under `label`
    fn insert(&mut self, label: u64, vector: &[f32]) {
        let slot = self.nodes.len();
        let node_layer = self.random_layer();

        self.vectors.push(self.metric.prepare(vector));
        self.labels.push(label);
        self.label_to_slot.insert(label, slot);
        self.nodes.push(Node::new(slot, node_layer));

        // First node becomes entry point
        let Some(entry_point) = self.entry_point else {
            self.entry_point = Some(slot);
            self.max_layer = node_layer;
            return;
        };

        let query = self.vectors[slot].clone();
        let mut current = entry_point;

        // Phase 1: Zoom in from top layer to node_layer + 1
        for layer in (node_layer + 1..=self.max_layer).rev() {
            if let Some(&(nearest, _)) = self.search_layer(&query, current, 1, layer).first() {
                current = nearest;
            }
        }

        // Phase 2: Wire edges from min(node_layer, max_layer) down to 0
        for layer in (0..=node_layer.min(self.max_layer)).rev() {
            let mut candidates = self.search_layer(&query, current, self.ef_construction, layer);
            candidates.retain(|&(s, _)| s != slot);

            let neighbors = self.select_neighbors(&candidates, self.max_neighbors(layer));
            for &(neighbor, _) in &neighbors {
                self.nodes[slot].link(layer, neighbor);
                self.connect(neighbor, slot, layer);
            }

            if let Some(&(closest, _)) = candidates.first() {
                current = closest;
            }
        }

        if node_layer > self.max_layer {
            self.max_layer = node_layer;
            self.entry_point = Some(slot);
        }
    }

    /// Add the reverse edge `from → to`, pruning `from` if it is now over budget
    fn connect(&mut self, from: usize, to: usize, layer: usize) {
        self.nodes[from].link(layer, to);

        let limit = self.max_neighbors(layer);
        if self.nodes[from].links_at(layer).len() <= limit {
            return;
        }

        let base = &self.vectors[from];
        let candidates: Vec<(usize, f32)> = self.nodes[from]
            .links_at(layer)
            .iter()
            .map(|&n| (n, self.metric.distance(base, &self.vectors[n])))
            .collect();
        let kept = self
            .select_neighbors(&candidates, limit)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        self.nodes[from].relink(layer, kept);
    }

    /// Search for nearest neighbors on a single layer
    ///
    /// Greedy beam search with `ef` candidates; result sorted by ascending distance.
    fn search_layer(
        &self,
        query: &[f32],
        entry: usize,
        ef: usize,
        layer: usize,
    ) -> Vec<(usize, f32)> {
        let mut visited = VisitedGuard::new(self.nodes.len());
        let mut candidates: BinaryHeap<Nearest> = BinaryHeap::with_capacity(ef);
        let mut results: BinaryHeap<Furthest> = BinaryHeap::with_capacity(ef + 1);

        visited.visit(entry);
        let distance = self.distance_to(query, entry);
        candidates.push(Nearest { slot: entry, distance });
        results.push(Furthest { slot: entry, distance });

        while let Some(current) = candidates.pop() {
            // Stop once the closest frontier node is worse than our worst result
            if let Some(worst) = results.peek() {
                if results.len() >= ef && current.distance > worst.distance {
                    break;
                }
            }

            for &neighbor in self.nodes[current.slot].links_at(layer) {
                if visited.is_visited(neighbor) {
                    continue;
                }
                visited.visit(neighbor);

                let distance = self.distance_to(query, neighbor);
                let admit = results.len() < ef
                    || results.peek().map_or(true, |worst| distance < worst.distance);
                if admit {
                    candidates.push(Nearest { slot: neighbor, distance });
                    results.push(Furthest { slot: neighbor, distance });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<_> = results.into_iter().map(|r| (r.slot, r.distance)).collect();
        out.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        out
    }

    /// Select neighbors using diversity-preserving heuristic
    ///
    /// A candidate is kept only if it is closer to the base than to any neighbor
    /// already kept; leftover room is filled with the closest rejects.
    fn select_neighbors(&self, candidates: &[(usize, f32)], m: usize) -> Vec<(usize, f32)> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let mut selected: Vec<(usize, f32)> = Vec::with_capacity(m);
        for &(candidate, candidate_dist) in &sorted {
            if selected.len() >= m {
                break;
            }
            let candidate_vec = &self.vectors[candidate];
            let diverse = selected.iter().all(|&(kept, _)| {
                self.metric.distance(candidate_vec, &self.vectors[kept]) >= candidate_dist
            });
            if diverse {
                selected.push((candidate, candidate_dist));
            }
        }

        if selected.len() < m {
            for &(candidate, candidate_dist) in &sorted {
                if selected.len() >= m {
                    break;
                }
                if !selected.iter().any(|&(kept, _)| kept == candidate) {
                    selected.push((candidate, candidate_dist));
                }
            }
        }

        selected
    }

    /// Search for the `k` nearest ids to `query`
    ///
    /// Returns exactly `min(k, len)` `(id, distance)` pairs by ascending
    /// distance. The query must already have the index's dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(u64, f32)> {
        let Some(entry_point) = self.entry_point else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let query = self.metric.prepare(query);
        let mut current = entry_point;

        // Phase 1: Greedy descent from top layer to layer 1
        for layer in (1..=self.max_layer).rev() {
            if let Some(&(nearest, _)) = self.search_layer(&query, current, 1, layer).first() {
                current = nearest;
            }
        }

        // Phase 2: Beam search on layer 0
        let mut hits = self.search_layer(&query, current, self.ef_search.max(k), 0);

        // Pruning can leave parts of layer 0 unreachable from the entry point.
        let wanted = k.min(self.nodes.len());
        if hits.len() < wanted {
            tracing::debug!(
                reached = hits.len(),
                wanted,
                "hnsw beam fell short, scanning all slots"
            );
            hits = self.scan_all(&query);
        }

        hits.into_iter()
            .take(k)
            .map(|(slot, distance)| (self.labels[slot], distance))
            .collect()
    }

    /// Every slot with its distance to a prepared query, ascending
    fn scan_all(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let mut all: Vec<(usize, f32)> = (0..self.nodes.len())
            .map(|slot| (slot, self.distance_to(query, slot)))
            .collect();
        all.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        all
    }

    /// Stored (prepared) vector for `id`
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        self.label_to_slot
            .get(&id)
            .map(|&slot| self.vectors[slot].as_slice())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get statistics about the index
    pub fn stats(&self) -> HnswStats {
        let mut layer_counts = vec![0usize; self.max_layer + 1];
        let mut total_edges = 0;

        for node in &self.nodes {
            for (layer, neighbors) in node.links.iter().enumerate() {
                if layer < layer_counts.len() {
                    layer_counts[layer] += 1;
                }
                total_edges += neighbors.len();
            }
        }

        HnswStats {
            num_nodes: self.nodes.len(),
            max_layer: self.max_layer,
            layer_counts,
            total_edges,
            m: self.m,
            ef_construction: self.ef_construction,
            ef_search: self.ef_search,
        }
    }
}

impl IndexEngine for Hnsw {
    fn init(dim: usize, config: &EngineConfig) -> Result<Self, EngineError> {
        Hnsw::new(dim, config)
    }

    fn import_state(bytes: &[u8]) -> Result<Self, EngineError> {
        Hnsw::decode(bytes)
    }

    fn export_state(&self) -> Vec<u8> {
        self.encode()
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn ef_search(&self) -> usize {
        self.ef_search
    }

    fn set_ef_search(&mut self, ef: usize) {
        self.ef_search = ef.max(1);
    }

    fn contains(&self, id: u64) -> bool {
        self.label_to_slot.contains_key(&id)
    }

    fn ids(&self) -> Vec<u64> {
        self.labels.clone()
    }

    fn insert_batch(&mut self, vectors: &[Vec<f32>], ids: &[u64]) -> Result<(), EngineError> {
        validate_batch(self, vectors, ids)?;
        for (vector, &id) in vectors.iter().zip(ids) {
            self.insert(id, vector);
        }
        tracing::debug!(
            inserted = ids.len(),
            total = self.nodes.len(),
            max_layer = self.max_layer,
            "hnsw batch inserted"
        );
        Ok(())
    }

    fn knn_query(&self, query: &[f32], k: usize) -> Result<(Vec<u64>, Vec<f32>), EngineError> {
        validate_query(self.dim, query)?;
        Ok(self.search(query, k).into_iter().unzip())
    }
}

/// Statistics about the HNSW index
#[derive(Debug, Clone)]
pub struct HnswStats {
    pub num_nodes: usize,
    pub max_layer: usize,
    /// Nodes present on each layer
    pub layer_counts: Vec<usize>,
    pub total_edges: usize,
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::l2_normalized;

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_m(16)
            .with_ef_construction(100)
            .with_ef_search(64)
            .with_seed(42)
    }

    fn random_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
        let v: Vec<f32> = (0..dim).map(|_| rng.gen::<f32>() - 0.5).collect();
        l2_normalized(&v)
    }

    fn build(n: usize, dim: usize, config: &EngineConfig) -> (Hnsw, Vec<Vec<f32>>) {
        let mut rng = StdRng::seed_from_u64(7);
        let vectors: Vec<_> = (0..n).map(|_| random_vector(&mut rng, dim)).collect();
        let ids: Vec<u64> = (0..n as u64).collect();
        let mut hnsw = Hnsw::new(dim, config).unwrap();
        hnsw.insert_batch(&vectors, &ids).unwrap();
        (hnsw, vectors)
    }

    #[test]
    fn test_insert_single() {
        let (hnsw, _) = build(1, 32, &config());
        assert_eq!(hnsw.len(), 1);
        assert_eq!(hnsw.entry_point, Some(0));
    }

    #[test]
    fn test_search_empty_index() {
        let hnsw = Hnsw::new(16, &config()).unwrap();
        let (ids, dists) = hnsw.knn_query(&[0.1; 16], 5).unwrap();
        assert!(ids.is_empty());
        assert!(dists.is_empty());
    }

    #[test]
    fn test_search_self_similarity() {
        let (hnsw, vectors) = build(200, 64, &config());
        for (i, v) in vectors.iter().enumerate().step_by(7) {
            let (ids, dists) = hnsw.knn_query(v, 1).unwrap();
            assert_eq!(ids[0], i as u64, "vector {i} should find itself");
            assert!(dists[0].abs() < 1e-4);
        }
    }

    #[test]
    fn test_results_sorted_ascending() {
        let (hnsw, vectors) = build(100, 32, &config());
        let (_, dists) = hnsw.knn_query(&vectors[3], 20).unwrap();
        assert_eq!(dists.len(), 20);
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_recall_against_brute_force() {
        let (hnsw, vectors) = build(1000, 64, &config().with_ef_search(200));
        let mut rng = StdRng::seed_from_u64(99);
        let k = 10;
        let queries = 20;
        let mut hits = 0usize;

        for _ in 0..queries {
            let query = random_vector(&mut rng, 64);
            let mut truth: Vec<(u64, f32)> = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (i as u64, Metric::Cosine.distance(&query, v)))
                .collect();
            truth.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            let truth: std::collections::HashSet<u64> =
                truth.iter().take(k).map(|(id, _)| *id).collect();

            let (ids, _) = hnsw.knn_query(&query, k).unwrap();
            hits += ids.iter().filter(|id| truth.contains(id)).count();
        }

        let recall = hits as f64 / (k * queries) as f64;
        assert!(recall > 0.9, "recall@{k} too low: {:.2}", recall);
    }

    #[test]
    fn test_k_greater_than_count_returns_all() {
        let (hnsw, vectors) = build(10, 16, &config());
        let (ids, _) = hnsw.knn_query(&vectors[0], 100).unwrap();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_sparse_graph_still_returns_min_k_len() {
        let sparse = config().with_m(2).with_ef_construction(2).with_ef_search(2);
        let (hnsw, vectors) = build(1500, 16, &sparse);

        for k in [700, 1500, 5000] {
            let (ids, dists) = hnsw.knn_query(&vectors[3], k).unwrap();
            assert_eq!(ids.len(), k.min(1500), "k = {k}");
            let unique: std::collections::HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
            assert!(dists.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_k_zero() {
        let (hnsw, vectors) = build(10, 16, &config());
        let (ids, _) = hnsw.knn_query(&vectors[0], 0).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_arbitrary_ids_are_returned() {
        let mut hnsw = Hnsw::new(3, &config()).unwrap();
        hnsw.insert_batch(
            &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            &[1000, 7],
        )
        .unwrap();
        let (ids, _) = hnsw.knn_query(&[0.0, 1.0, 0.0], 1).unwrap();
        assert_eq!(ids, vec![7]);
        assert!(hnsw.contains(1000));
        assert_eq!(hnsw.ids(), vec![1000, 7]);
    }

    #[test]
    fn test_l2_metric_distances() {
        let config = config().with_metric(Metric::L2);
        let mut hnsw = Hnsw::new(2, &config).unwrap();
        hnsw.insert_batch(&[vec![0.0, 0.0], vec![3.0, 4.0]], &[0, 1])
            .unwrap();
        let (ids, dists) = hnsw.knn_query(&[0.0, 0.0], 2).unwrap();
        assert_eq!(ids, vec![0, 1]);
        assert!((dists[1] - 25.0).abs() < 1e-5);
    }

    #[test]
    fn test_dimension_mismatch_leaves_index_untouched() {
        let mut hnsw = Hnsw::new(3, &config()).unwrap();
        let err = hnsw
            .insert_batch(&[vec![1.0, 0.0, 0.0], vec![1.0, 0.0]], &[0, 1])
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::DimensionMismatch {
                expected: 3,
                actual: 2,
                position: 1
            }
        );
        assert!(hnsw.is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let config = config().with_max_elements(2);
        let mut hnsw = Hnsw::new(2, &config).unwrap();
        let err = hnsw
            .insert_batch(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]], &[0, 1, 2])
            .unwrap_err();
        assert!(matches!(err, EngineError::CapacityExceeded { capacity: 2, requested: 3 }));
        assert!(hnsw.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut hnsw = Hnsw::new(2, &config()).unwrap();
        hnsw.insert_batch(&[vec![1.0, 0.0]], &[5]).unwrap();

        let err = hnsw.insert_batch(&[vec![0.0, 1.0]], &[5]).unwrap_err();
        assert_eq!(err, EngineError::DuplicateId(5));

        let err = hnsw
            .insert_batch(&[vec![0.0, 1.0], vec![1.0, 1.0]], &[6, 6])
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateId(6));
        assert_eq!(hnsw.len(), 1);
    }

    #[test]
    fn test_batch_length_mismatch() {
        let mut hnsw = Hnsw::new(2, &config()).unwrap();
        let err = hnsw.insert_batch(&[vec![1.0, 0.0]], &[0, 1]).unwrap_err();
        assert!(matches!(err, EngineError::BatchLengthMismatch { vectors: 1, ids: 2 }));
    }

    #[test]
    fn test_query_dimension_checked() {
        let (hnsw, _) = build(5, 8, &config());
        assert!(matches!(
            hnsw.knn_query(&[0.0; 4], 1),
            Err(EngineError::DimensionMismatch { expected: 8, actual: 4, .. })
        ));
    }

    #[test]
    fn test_neighbor_lists_respect_limits() {
        let config = config().with_m(4).with_ef_construction(32);
        let (hnsw, _) = build(300, 16, &config);
        for node in &hnsw.nodes {
            for (layer, neighbors) in node.links.iter().enumerate() {
                let limit = if layer == 0 { 8 } else { 4 };
                assert!(neighbors.len() <= limit, "layer {layer} has {}", neighbors.len());
                assert!(!neighbors.contains(&node.slot), "self loop on {}", node.slot);
            }
        }
    }

    #[test]
    fn test_same_seed_builds_same_graph() {
        let (a, _) = build(100, 16, &config());
        let (b, _) = build(100, 16, &config());
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.entry_point, b.entry_point);
    }

    #[test]
    fn test_stats_accuracy() {
        let (hnsw, _) = build(100, 16, &config());
        let stats = hnsw.stats();
        assert_eq!(stats.num_nodes, 100);
        assert_eq!(stats.m, 16);
        assert_eq!(stats.ef_construction, 100);
        assert_eq!(stats.layer_counts[0], 100);
        assert!(stats.total_edges > 0);
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(matches!(
            Hnsw::new(0, &config()),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_set_ef_search() {
        let mut hnsw = Hnsw::new(4, &config()).unwrap();
        hnsw.set_ef_search(10);
        assert_eq!(hnsw.ef_search(), 10);
        hnsw.set_ef_search(0);
        assert_eq!(hnsw.ef_search(), 1);
    }
}
