//! Invokes the external head function, detects head change, resolves the
//! new head's tuple (SPEC_FULL.md §4.3).

use crate::channel::{ReplayChannel, ReplaySubscription};
use crate::error::HeadTrackerError;
use crate::metrics;
use crate::tuple_cache::TupleDetailsCache;
use attestation_pool::AttestationPool;
use osp_types::{BeaconChainHead, HeadFunction, ObservableStateTypes, TupleStorage};
use parking_lot::RwLock;
use slog::{debug, error, Logger};
use std::sync::Arc;

pub struct HeadTracker<T: ObservableStateTypes> {
    head_function: Arc<dyn HeadFunction<T>>,
    tuple_storage: Arc<dyn TupleStorage<T>>,
    tuple_cache: Arc<TupleDetailsCache<T>>,
    current_head: RwLock<Option<BeaconChainHead<T>>>,
    head_channel: ReplayChannel<BeaconChainHead<T>>,
    log: Logger,
}

impl<T: ObservableStateTypes> HeadTracker<T> {
    pub fn new(
        head_function: Arc<dyn HeadFunction<T>>,
        tuple_storage: Arc<dyn TupleStorage<T>>,
        tuple_cache: Arc<TupleDetailsCache<T>>,
        channel_capacity: usize,
        log: Logger,
    ) -> Self {
        Self {
            head_function,
            tuple_storage,
            tuple_cache,
            current_head: RwLock::new(None),
            head_channel: ReplayChannel::new(channel_capacity, "head"),
            log,
        }
    }

    /// Seeds the tracker with a known starting head without going through
    /// `find_head`, for cold start (SPEC_FULL.md §8 scenario 1: the genesis
    /// tuple arrives before any tick, so nothing has run the head function
    /// yet).
    pub fn set_initial_head(&self, head: BeaconChainHead<T>) {
        self.head_channel.publish(head.clone());
        *self.current_head.write() = Some(head);
    }

    pub fn current_head(&self) -> Option<BeaconChainHead<T>> {
        self.current_head.read().clone()
    }

    pub fn subscribe(&self) -> ReplaySubscription<BeaconChainHead<T>> {
        self.head_channel.subscribe()
    }

    /// Algorithm (SPEC_FULL.md §4.3):
    /// 1. Build a pending-operations snapshot from `pool`.
    /// 2. Ask the head function for a block, resolving attestations from
    ///    that snapshot.
    /// 3. Return `Ok(None)` if unchanged.
    /// 4. Otherwise resolve the new head's tuple from cache, then storage;
    ///    fail with `HeadTupleMissing` if both miss.
    /// 5. Publish the new head. (The caller is responsible for republishing
    ///    an observable state when appropriate — see `StatePublisher`.)
    pub fn update_head(
        &self,
        pool: &AttestationPool<T>,
    ) -> Result<Option<BeaconChainHead<T>>, HeadTrackerError> {
        let snapshot = pool.snapshot_by_pubkey();
        let resolver = move |pubkey: &T::PublicKey| snapshot.latest_attestation(pubkey);
        let candidate = self.head_function.find_head(&resolver);

        let unchanged = self
            .current_head
            .read()
            .as_ref()
            .map(|head| head.block().as_ref() == &candidate)
            .unwrap_or(false);
        if unchanged {
            return Ok(None);
        }

        let root = candidate.canonical_root();
        let tuple = match self.tuple_cache.get(&root) {
            Some(details) => details.tuple,
            None => match self.tuple_storage.get(root)? {
                Some(tuple) => tuple,
                None => {
                    error!(self.log, "Head tuple missing from cache and storage"; "root" => ?root);
                    return Err(HeadTrackerError::HeadTupleMissing);
                }
            },
        };

        let new_head = BeaconChainHead::new(tuple);
        debug!(self.log, "Head changed"; "slot" => new_head.block().slot().as_u64());
        metrics::inc_counter(&metrics::HEAD_CHANGES_TOTAL);
        *self.current_head.write() = Some(new_head.clone());
        self.head_channel.publish(new_head.clone());
        Ok(Some(new_head))
    }
}
