//! Per-slot adjacency

/// Outgoing edges of one slot, one list per layer it was assigned to.
///
/// `links[l]` holds neighbor slots on layer `l`; a slot drawn for layer `L`
/// owns lists `0..=L` and is invisible above `L`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub slot: usize,
    pub links: Vec<Vec<usize>>,
}

impl Node {
    pub fn new(slot: usize, top_layer: usize) -> Self {
        Self {
            slot,
            links: vec![Vec::new(); top_layer + 1],
        }
    }

    pub fn top_layer(&self) -> usize {
        self.links.len().saturating_sub(1)
    }

    /// Edges on `layer`; empty above the node's top layer.
    pub fn links_at(&self, layer: usize) -> &[usize] {
        match self.links.get(layer) {
            Some(list) => list,
            None => &[],
        }
    }

    /// Add an edge to `to` on `layer`. Existing edges and layers above the top are no-ops.
    pub fn link(&mut self, layer: usize, to: usize) {
        let Some(list) = self.links.get_mut(layer) else {
            return;
        };
        if !list.contains(&to) {
            list.push(to);
        }
    }

    /// Swap in a pruned edge list for `layer`.
    pub fn relink(&mut self, layer: usize, to: Vec<usize>) {
        if let Some(list) = self.links.get_mut(layer) {
            *list = to;
        }
    }

    /// Total edges across all layers
    pub fn degree(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }
}
