use crate::collaborators::{BeaconBlockRef, ObservableStateTypes};
use crate::state::BeaconStateEx;
use std::sync::Arc;

/// A (block, post-block state) pair loaded from storage by block root.
#[derive(Clone, Debug)]
pub struct BeaconTuple<T: ObservableStateTypes> {
    pub block: Arc<T::Block>,
    pub state: Arc<BeaconStateEx<T>>,
}

impl<T: ObservableStateTypes> BeaconTuple<T> {
    pub fn new(block: T::Block, state: BeaconStateEx<T>) -> Self {
        Self {
            block: Arc::new(block),
            state: Arc::new(state),
        }
    }

    pub fn slot(&self) -> crate::slot::Slot {
        self.block.slot()
    }
}

/// A `BeaconTuple` optionally augmented with the intermediate states the
/// importer produced while processing the block (SPEC_FULL.md §3). Any of
/// the three may be absent, e.g. when the importer didn't retain them.
#[derive(Clone, Debug)]
pub struct BeaconTupleDetails<T: ObservableStateTypes> {
    pub tuple: BeaconTuple<T>,
    /// State immediately after the per-slot transition at the block's slot.
    pub post_slot: Option<Arc<BeaconStateEx<T>>>,
    /// State immediately after the block transition. Equal to `tuple.state`.
    pub post_block: Option<Arc<BeaconStateEx<T>>>,
    /// State immediately after the epoch transition, if the block's slot
    /// was an epoch boundary.
    pub post_epoch: Option<Arc<BeaconStateEx<T>>>,
}

impl<T: ObservableStateTypes> BeaconTupleDetails<T> {
    pub fn new(tuple: BeaconTuple<T>) -> Self {
        Self {
            tuple,
            post_slot: None,
            post_block: None,
            post_epoch: None,
        }
    }

    pub fn with_post_slot(mut self, state: BeaconStateEx<T>) -> Self {
        self.post_slot = Some(Arc::new(state));
        self
    }

    pub fn with_post_block(mut self, state: BeaconStateEx<T>) -> Self {
        self.post_block = Some(Arc::new(state));
        self
    }

    pub fn with_post_epoch(mut self, state: BeaconStateEx<T>) -> Self {
        self.post_epoch = Some(Arc::new(state));
        self
    }

    /// The ordered, present-only intermediate states: `post_slot`, then
    /// `post_block`, then `post_epoch` (SPEC_FULL.md §4.4 same-slot path).
    pub fn ordered_intermediate_states(&self) -> Vec<Arc<BeaconStateEx<T>>> {
        [&self.post_slot, &self.post_block, &self.post_epoch]
            .iter()
            .filter_map(|maybe| maybe.clone())
            .collect()
    }
}
