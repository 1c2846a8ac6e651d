//! Identifier to record mapping

use std::collections::btree_map::{self, BTreeMap};

/// Ordered `id -> record` map plus the identifier cursor derived from it.
///
/// Ids come from [`RecordMap::allocate`] only, so they are strictly
/// increasing and never reused as long as the map is not shrunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMap<R> {
    entries: BTreeMap<u64, R>,
}

impl<R> Default for RecordMap<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R> RecordMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max(id) + 1`, or 0 when empty.
    pub fn next_id(&self) -> u64 {
        self.entries
            .keys()
            .next_back()
            .map_or(0, |&max| max + 1)
    }

    /// Reserve `count` consecutive ids starting at [`RecordMap::next_id`].
    pub fn allocate(&self, count: usize) -> Vec<u64> {
        let start = self.next_id();
        (start..start + count as u64).collect()
    }

    pub fn get(&self, id: u64) -> Option<&R> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u64, R> {
        self.entries.iter()
    }

    /// Insert freshly allocated pairs. Returns the first id already present, if any,
    /// without inserting anything.
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (u64, R)>) -> Result<(), u64> {
        let pairs: Vec<(u64, R)> = pairs.into_iter().collect();
        if let Some(&(dup, _)) = pairs.iter().find(|(id, _)| self.entries.contains_key(id)) {
            return Err(dup);
        }
        self.entries.extend(pairs);
        Ok(())
    }
}

impl<R> FromIterator<(u64, R)> for RecordMap<R> {
    fn from_iter<I: IntoIterator<Item = (u64, R)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
