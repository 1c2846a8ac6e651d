//! Reusable visited sets for graph traversal.
//!
//! Each set is an array of epoch stamps: a slot is visited when its stamp
//! equals the current epoch, so resetting between searches is one increment
//! instead of a memset. Sets are pooled per thread and handed out through
//! [`VisitedGuard`], which returns them on drop.

use std::cell::RefCell;

/// Sets kept per thread once returned.
const POOL_LIMIT: usize = 4;

/// Minimum stamp array length.
const MIN_SLOTS: usize = 1024;

thread_local! {
    static POOL: RefCell<Vec<VisitedSet>> = const { RefCell::new(Vec::new()) };
}

pub struct VisitedSet {
    stamps: Vec<u32>,
    epoch: u32,
}

impl VisitedSet {
    fn with_slots(slots: usize) -> Self {
        Self {
            stamps: vec![0; slots.max(MIN_SLOTS)],
            epoch: 1,
        }
    }

    fn slots(&self) -> usize {
        self.stamps.len()
    }

    #[inline]
    pub fn is_visited(&self, slot: usize) -> bool {
        self.stamps.get(slot) == Some(&self.epoch)
    }

    #[inline]
    pub fn visit(&mut self, slot: usize) {
        if slot >= self.stamps.len() {
            let grown = (slot + 1).next_power_of_two().max(MIN_SLOTS);
            self.stamps.resize(grown, 0);
        }
        self.stamps[slot] = self.epoch;
    }

    /// Forget every visit.
    pub fn reset(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // wrapped: stale stamps could alias the new epoch
            self.stamps.fill(0);
            self.epoch = 1;
        }
    }
}

/// RAII handle to a pooled [`VisitedSet`].
pub struct VisitedGuard {
    set: Option<VisitedSet>,
}

impl VisitedGuard {
    /// Borrow a cleared set able to hold at least `slots` entries without growing.
    pub fn new(slots: usize) -> Self {
        let set = POOL.with(|pool| {
            let mut pool = pool.borrow_mut();
            match pool.iter().position(|s| s.slots() >= slots) {
                Some(idx) => {
                    let mut set = pool.swap_remove(idx);
                    set.reset();
                    set
                }
                None => VisitedSet::with_slots(slots),
            }
        });
        Self { set: Some(set) }
    }
}

impl Drop for VisitedGuard {
    fn drop(&mut self) {
        if let Some(set) = self.set.take() {
            POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < POOL_LIMIT {
                    pool.push(set);
                }
            });
        }
    }
}

impl std::ops::Deref for VisitedGuard {
    type Target = VisitedSet;

    fn deref(&self) -> &VisitedSet {
        // `set` is only taken in drop
        self.set.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl std::ops::DerefMut for VisitedGuard {
    fn deref_mut(&mut self) -> &mut VisitedSet {
        self.set.as_mut().unwrap_or_else(|| unreachable!())
    }
}
