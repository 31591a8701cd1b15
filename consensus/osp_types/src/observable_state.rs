use crate::collaborators::ObservableStateTypes;
use crate::snapshot::PendingOperationsSnapshot;
use crate::state::BeaconStateEx;
use crate::tuple::BeaconTuple;
use std::sync::Arc;

/// The state a validator at the current wall-clock slot should reason
/// about: the head block, its projected state, and the pending-operations
/// view used to build it (SPEC_FULL.md §3).
#[derive(Clone, Debug)]
pub struct ObservableBeaconState<T: ObservableStateTypes> {
    pub head_block: Arc<T::Block>,
    pub state: Arc<BeaconStateEx<T>>,
    pub pending_operations: PendingOperationsSnapshot<T>,
}

impl<T: ObservableStateTypes> ObservableBeaconState<T> {
    pub fn new(
        head_block: Arc<T::Block>,
        state: Arc<BeaconStateEx<T>>,
        pending_operations: PendingOperationsSnapshot<T>,
    ) -> Self {
        Self {
            head_block,
            state,
            pending_operations,
        }
    }
}

/// A wrapper over the current fork-choice head tuple.
#[derive(Clone, Debug)]
pub struct BeaconChainHead<T: ObservableStateTypes> {
    pub tuple: BeaconTuple<T>,
}

impl<T: ObservableStateTypes> BeaconChainHead<T> {
    pub fn new(tuple: BeaconTuple<T>) -> Self {
        Self { tuple }
    }

    pub fn block(&self) -> &Arc<T::Block> {
        &self.tuple.block
    }
}
