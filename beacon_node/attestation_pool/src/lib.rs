//! A buffer of freshly-gossiped attestations plus a per-(pubkey, slot)
//! latest-attestation cache (SPEC_FULL.md §4.1).
//!
//! Grounded on the teacher's `naive_aggregation_pool::NaiveAggregationPool`:
//! same mutex-protected-map shape and slot-keyed pruning, generalised from
//! signature aggregation (which this subsystem does not do — see
//! SPEC_FULL.md's non-goals) to latest-per-validator tracking.

mod metrics;

use osp_types::{AttestationRef, ObservableStateTypes, PendingOperationsSnapshot, Slot};
use parking_lot::Mutex;
use slog::{trace, Logger};
use std::collections::{HashMap, VecDeque};

/// The buffer plus the latest-attestation cache, both behind one lock
/// (SPEC_FULL.md §5: "Every operation in §4.1 takes it for its minimum
/// necessary duration and never holds it across an external spec call").
struct Inner<T: ObservableStateTypes> {
    buffer: VecDeque<T::Attestation>,
    latest: HashMap<(T::PublicKey, Slot), T::Attestation>,
}

impl<T: ObservableStateTypes> Default for Inner<T> {
    fn default() -> Self {
        Self {
            buffer: VecDeque::new(),
            latest: HashMap::new(),
        }
    }
}

pub struct AttestationPool<T: ObservableStateTypes> {
    inner: Mutex<Inner<T>>,
    log: Logger,
}

impl<T: ObservableStateTypes> AttestationPool<T> {
    pub fn new(log: Logger) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            log,
        }
    }

    /// Appends to the buffer. Non-blocking, O(1).
    pub fn offer(&self, attestation: T::Attestation) {
        let mut inner = self.inner.lock();
        inner.buffer.push_back(attestation);
        metrics::set_gauge(&metrics::ATTESTATION_POOL_BUFFER_LEN, inner.buffer.len() as i64);
    }

    /// Removes and returns every buffered attestation whose `data.slot`
    /// is `<= slot`, preserving insertion order. Invariant 2.
    pub fn drain_up_to(&self, slot: Slot) -> Vec<T::Attestation> {
        let _timer = metrics::start_timer(&metrics::ATTESTATION_POOL_DRAIN_TIME);
        let mut inner = self.inner.lock();
        let (drained, remaining): (VecDeque<_>, VecDeque<_>) = inner
            .buffer
            .drain(..)
            .partition(|a| a.data_slot() <= slot);
        inner.buffer = remaining;
        metrics::set_gauge(&metrics::ATTESTATION_POOL_BUFFER_LEN, inner.buffer.len() as i64);
        drained.into_iter().collect()
    }

    /// Overwrites the `(pubkey, attestation.data.slot)` cache entry.
    /// "Latest" means last-observed for a given slot, not highest-slot
    /// overall (open question 2, DESIGN.md).
    pub fn ingest_latest(&self, pubkey: T::PublicKey, attestation: T::Attestation) {
        let mut inner = self.inner.lock();
        let key = (pubkey, attestation.data_slot());
        inner.latest.insert(key, attestation);
        metrics::set_gauge(&metrics::ATTESTATION_POOL_CACHE_LEN, inner.latest.len() as i64);
    }

    /// Removes `(pubkey, slot)` if present. Called for every validator/slot
    /// pair already included in a freshly-imported block's post-state.
    pub fn forget(&self, pubkey: &T::PublicKey, slot: Slot) {
        let mut inner = self.inner.lock();
        if inner.latest.remove(&(pubkey.clone(), slot)).is_some() {
            metrics::inc_counter(&metrics::ATTESTATION_POOL_FORGOTTEN_TOTAL);
            metrics::set_gauge(&metrics::ATTESTATION_POOL_CACHE_LEN, inner.latest.len() as i64);
        }
    }

    /// Removes every cache entry with `slot <= threshold_slot`. Invariant 1.
    ///
    /// Uses `<=`, not `<`, per open question 1 (DESIGN.md) — preserved as
    /// specified even though it purges one slot earlier than the
    /// inclusion-delay rule's own strict inequality would suggest.
    pub fn purge(&self, threshold_slot: Slot) {
        let mut inner = self.inner.lock();
        let before = inner.latest.len();
        inner.latest.retain(|(_, slot), _| *slot > threshold_slot);
        let purged = before - inner.latest.len();
        if purged > 0 {
            trace!(self.log, "Purged expired attestations"; "count" => purged, "threshold_slot" => threshold_slot.as_u64());
            for _ in 0..purged {
                metrics::inc_counter(&metrics::ATTESTATION_POOL_PURGED_TOTAL);
            }
            metrics::set_gauge(&metrics::ATTESTATION_POOL_CACHE_LEN, inner.latest.len() as i64);
        }
    }

    /// Builds a `PendingOperationsSnapshot` from a frozen copy of the
    /// cache, grouped by public key (SPEC_FULL.md §4.5).
    pub fn snapshot_by_pubkey(&self) -> PendingOperationsSnapshot<T> {
        let inner = self.inner.lock();
        let mut by_pubkey: HashMap<T::PublicKey, Vec<T::Attestation>> = HashMap::new();
        for ((pubkey, _slot), attestation) in inner.latest.iter() {
            by_pubkey
                .entry(pubkey.clone())
                .or_insert_with(Vec::new)
                .push(attestation.clone());
        }
        PendingOperationsSnapshot::new(by_pubkey)
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.inner.lock().latest.len()
    }

    #[cfg(test)]
    fn buffer_len(&self) -> usize {
        self.inner.lock().buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osp_types::testing::FakeAttestation;
    use osp_types::testing::FakeTypes;
    use slog::{o, Discard};

    fn test_logger() -> Logger {
        Logger::root(Discard, o!())
    }

    fn pool() -> AttestationPool<FakeTypes> {
        AttestationPool::new(test_logger())
    }

    #[test]
    fn offer_and_drain_preserves_order() {
        let pool = pool();
        pool.offer(FakeAttestation::new(1, 0, vec![1]));
        pool.offer(FakeAttestation::new(3, 1, vec![2]));
        pool.offer(FakeAttestation::new(2, 2, vec![3]));

        let drained = pool.drain_up_to(Slot::new(2));
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].nonce, 0);
        assert_eq!(drained[1].nonce, 2);
        assert_eq!(pool.buffer_len(), 1);
    }

    #[test]
    fn duplicate_attestations_collapse_to_one_entry() {
        let pool = pool();
        let a = FakeAttestation::new(4, 0, vec![7]);
        for _ in 0..5 {
            pool.ingest_latest(7, a.clone());
        }
        assert_eq!(pool.cache_len(), 1);
    }

    #[test]
    fn purge_uses_less_than_or_equal() {
        // SPEC_FULL.md §8 scenario 2: SLOTS_PER_EPOCH=8, MIN_INCLUSION=1,
        // tick slot 10 => threshold 1; slots 0 and 1 removed, slot 2 kept.
        let pool = pool();
        pool.ingest_latest(1, FakeAttestation::new(0, 0, vec![1]));
        pool.ingest_latest(2, FakeAttestation::new(1, 0, vec![2]));
        pool.ingest_latest(3, FakeAttestation::new(2, 0, vec![3]));

        pool.purge(Slot::new(1));

        assert_eq!(pool.cache_len(), 1);
        let snapshot = pool.snapshot_by_pubkey();
        assert!(snapshot.attestations_for(&3).iter().any(|a| a.slot == Slot::new(2)));
        assert!(snapshot.attestations_for(&1).is_empty());
        assert!(snapshot.attestations_for(&2).is_empty());
    }

    #[test]
    fn purge_boundary_entry_is_removed_exactly_at_threshold() {
        let pool = pool();
        pool.ingest_latest(1, FakeAttestation::new(5, 0, vec![1]));
        pool.purge(Slot::new(5));
        assert_eq!(pool.cache_len(), 0, "entry at exactly the threshold must be purged");
    }

    #[test]
    fn forget_removes_included_attestation() {
        let pool = pool();
        pool.ingest_latest(9, FakeAttestation::new(4, 0, vec![9]));
        pool.forget(&9, Slot::new(4));
        assert_eq!(pool.cache_len(), 0);
    }

    #[test]
    fn aggregation_bounded_until_state_available() {
        // SPEC_FULL.md §8 scenario 5.
        let pool = pool();
        for i in 0..1000u64 {
            pool.offer(FakeAttestation::new(4, i, vec![i]));
        }
        assert_eq!(pool.buffer_len(), 1000);

        // latestState.slot == 3: nothing drainable yet.
        assert!(pool.drain_up_to(Slot::new(3)).is_empty());
        assert_eq!(pool.buffer_len(), 1000);

        // Next tick produces latestState.slot == 4: all drain and expand.
        let drained = pool.drain_up_to(Slot::new(4));
        assert_eq!(drained.len(), 1000);
        for (i, attestation) in drained.into_iter().enumerate() {
            pool.ingest_latest(i as u64, attestation);
        }
        assert_eq!(pool.cache_len(), 1000);
    }

    #[test]
    fn snapshot_groups_by_pubkey() {
        let pool = pool();
        pool.ingest_latest(1, FakeAttestation::new(10, 0, vec![1]));
        pool.ingest_latest(2, FakeAttestation::new(10, 0, vec![2]));
        pool.ingest_latest(1, FakeAttestation::new(11, 0, vec![1]));

        let snapshot = pool.snapshot_by_pubkey();
        let expected_slots: HashMap<u64, Vec<Slot>> = maplit::hashmap! {
            1u64 => vec![Slot::new(10), Slot::new(11)],
            2u64 => vec![Slot::new(10)],
        };
        for (pubkey, mut slots) in expected_slots {
            let mut actual: Vec<Slot> = snapshot
                .attestations_for(&pubkey)
                .iter()
                .map(|a| a.slot)
                .collect();
            actual.sort();
            slots.sort();
            assert_eq!(actual, slots);
        }
    }
}
