//! Bounded, eldest-eviction cache of recently imported `BeaconTupleDetails`
//! (SPEC_FULL.md §4.7, invariant 3).
//!
//! Backed by `lru::LruCache`, the same crate the teacher's `beacon_chain`
//! carries for exactly this shape of cache (e.g. its checkpoint-state
//! cache), behind a `parking_lot::Mutex` matching this crate's other
//! shared-state locking.

use crate::metrics;
use lru::LruCache;
use osp_types::{BeaconTupleDetails, Hash256, ObservableStateTypes};
use parking_lot::Mutex;

pub struct TupleDetailsCache<T: ObservableStateTypes> {
    inner: Mutex<LruCache<Hash256, BeaconTupleDetails<T>>>,
}

impl<T: ObservableStateTypes> TupleDetailsCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Inserts `details`, keyed by its block's canonical root, evicting the
    /// least-recently-inserted entry if the cache is already at capacity.
    pub fn insert(&self, root: Hash256, details: BeaconTupleDetails<T>) {
        let mut inner = self.inner.lock();
        let evicted = inner.put(root, details);
        if evicted.is_some() {
            metrics::inc_counter(&metrics::TUPLE_CACHE_EVICTED_TOTAL);
        }
        metrics::set_gauge(&metrics::TUPLE_CACHE_LEN, inner.len() as i64);
    }

    /// Looks up `root` without disturbing recency order: eviction must stay
    /// insertion-ordered (SPEC_FULL.md invariant 3), and `LruCache::get`
    /// would promote a hit to most-recently-used, which heads are hit on
    /// every resolution and would otherwise keep stale entries alive.
    pub fn get(&self, root: &Hash256) -> Option<BeaconTupleDetails<T>> {
        self.inner.lock().peek(root).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}
