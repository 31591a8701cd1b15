//! The Event Router (SPEC_FULL.md §2, §4): owns the attestation pool, the
//! tuple-details cache, the head tracker and the state publisher, and
//! dispatches the three input streams to them.

use crate::channel::{ReplayChannel, ReplaySubscription};
use crate::error::ObservableStateError;
use crate::head_tracker::HeadTracker;
use crate::metrics;
use crate::publisher::StatePublisher;
use crate::tuple_cache::TupleDetailsCache;
use attestation_pool::AttestationPool;
use osp_types::{
    BeaconChainHead, BeaconTuple, BeaconTupleDetails, ChainSpec, ObservableBeaconState,
    ObservableStateConfig, ObservableStateTypes, PendingOperationsSnapshot, Slot,
};
use std::sync::Arc;

/// The merged feed the continuous executor processes strictly in arrival
/// order (SPEC_FULL.md §5): slot ticks and block-tuple imports share one
/// stream so head/state updates stay linearly ordered without a
/// cross-component lock.
pub enum ContinuousInput<T: ObservableStateTypes> {
    Slot(Slot),
    BlockTuple(BeaconTupleDetails<T>),
}

/// The Observable State Processor's public handle. Cheap to clone (every
/// field is an `Arc`), matching the teacher's `BeaconChain<T>` handle.
pub struct Processor<T: ObservableStateTypes> {
    pub(crate) pool: Arc<AttestationPool<T>>,
    pub(crate) tuple_cache: Arc<TupleDetailsCache<T>>,
    pub(crate) head_tracker: Arc<HeadTracker<T>>,
    pub(crate) publisher: Arc<StatePublisher<T>>,
    pub(crate) spec: Arc<dyn ChainSpec<T>>,
    pub(crate) config: ObservableStateConfig,
    pending_operations_channel: ReplayChannel<PendingOperationsSnapshot<T>>,
}

impl<T: ObservableStateTypes> Processor<T> {
    pub(crate) fn new(
        pool: Arc<AttestationPool<T>>,
        tuple_cache: Arc<TupleDetailsCache<T>>,
        head_tracker: Arc<HeadTracker<T>>,
        publisher: Arc<StatePublisher<T>>,
        spec: Arc<dyn ChainSpec<T>>,
        config: ObservableStateConfig,
    ) -> Self {
        let pending_operations_channel = ReplayChannel::new(config.channel_capacity, "pending_operations");
        Self {
            pool,
            tuple_cache,
            head_tracker,
            publisher,
            spec,
            config,
            pending_operations_channel,
        }
    }

    pub fn subscribe_head(&self) -> ReplaySubscription<BeaconChainHead<T>> {
        self.head_tracker.subscribe()
    }

    pub fn subscribe_observable_state(&self) -> ReplaySubscription<ObservableBeaconState<T>> {
        self.publisher.subscribe()
    }

    pub fn subscribe_pending_operations(
        &self,
    ) -> ReplaySubscription<PendingOperationsSnapshot<T>> {
        self.pending_operations_channel.subscribe()
    }

    /// Hands a gossiped attestation to the pool. Non-blocking (SPEC_FULL.md
    /// §4.1 `offer`); the only method meant to be called directly from the
    /// input-reception executor.
    pub fn offer_attestation(&self, attestation: T::Attestation) {
        self.pool.offer(attestation);
    }

    /// Seeds the processor with the genesis tuple, or any starting head
    /// known before the first tick (SPEC_FULL.md §8 scenario 1). Does not
    /// itself publish an observable state: invariant 4 only requires a
    /// head to exist before the first `newSlot`-driven projection, and the
    /// cold-start scenario expects exactly one observable-state emission,
    /// produced by that first tick.
    pub fn seed_head(&self, tuple: BeaconTuple<T>) {
        let root = tuple.block.canonical_root();
        self.tuple_cache
            .insert(root, BeaconTupleDetails::new(tuple.clone()));
        self.head_tracker.set_initial_head(BeaconChainHead::new(tuple));
    }

    /// Periodic slot-tick handler (SPEC_FULL.md §4.1 purge, §4.4
    /// `on_new_slot`). Runs on the continuous executor.
    pub fn on_new_slot(&self, new_slot: Slot) -> Result<(), ObservableStateError> {
        self.pool.purge(self.config.purge_threshold(new_slot));

        let snapshot = self.pool.snapshot_by_pubkey();
        self.pending_operations_channel.publish(snapshot.clone());
        metrics::inc_counter(&metrics::PENDING_OPERATIONS_PUBLISHED_TOTAL);

        let head = match self.head_tracker.current_head() {
            Some(head) => head,
            // Invariant 4: nothing to project before the first head exists.
            None => return Ok(()),
        };
        if head.block().slot() > new_slot {
            // `on_new_slot` stale guard (SPEC_FULL.md §4.4).
            return Ok(());
        }
        self.publisher.publish(&head, new_slot, &snapshot, None)?;
        Ok(())
    }

    /// Block-import handler (SPEC_FULL.md §4.1 `forget`, §4.3). Runs on the
    /// continuous executor, strictly after any event ahead of it in the
    /// merged input stream.
    pub fn on_block_tuple(&self, details: BeaconTupleDetails<T>) -> Result<(), ObservableStateError> {
        let root = details.tuple.block.canonical_root();
        self.tuple_cache.insert(root, details.clone());

        for attestation in T::block_attestations(&details.tuple.block) {
            let indices = self
                .spec
                .get_attestation_participants(&details.tuple.state.state, &attestation);
            let pubkeys = self
                .spec
                .map_indices_to_pubkeys(&details.tuple.state.state, &indices);
            for pubkey in pubkeys {
                self.pool.forget(&pubkey, attestation.data_slot());
            }
        }

        let new_head = self.head_tracker.update_head(&self.pool)?;
        if let Some(new_head) = new_head {
            // `on_new_head` stale guard (SPEC_FULL.md §4.4): only republish
            // if a projected state already covers the new head's slot.
            if let Some(latest_slot) = self.publisher.latest_slot() {
                if new_head.block().slot() <= latest_slot {
                    let snapshot = self.pool.snapshot_by_pubkey();
                    self.publisher
                        .publish(&new_head, latest_slot, &snapshot, Some(&details))?;
                }
            }
        }
        Ok(())
    }

    /// The 500ms periodic aggregation job (SPEC_FULL.md §4.1). Self-throttles
    /// until a projected state exists: expanding an attestation to its
    /// participants requires a state to read the validator registry from.
    pub fn run_aggregation_job_once(&self) {
        let latest_state = match self.publisher.latest_state() {
            Some(state) => state,
            None => return,
        };
        let drained = self.pool.drain_up_to(latest_state.slot());
        for attestation in drained {
            let indices = self
                .spec
                .get_attestation_participants(&latest_state.state, &attestation);
            let pubkeys = self.spec.map_indices_to_pubkeys(&latest_state.state, &indices);
            for pubkey in pubkeys {
                self.pool.ingest_latest(pubkey, attestation.clone());
            }
        }
    }
}
