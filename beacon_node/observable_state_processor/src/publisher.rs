//! `publish(head, slot)` — the forward / same-slot / stale paths of
//! SPEC_FULL.md §4.4.

use crate::channel::{ReplayChannel, ReplaySubscription};
use crate::metrics;
use crate::projector::StateProjector;
use osp_types::{
    BeaconChainHead, BeaconStateEx, BeaconTupleDetails, ObservableBeaconState,
    ObservableStateTypes, PendingOperationsSnapshot, Slot, TransitionError,
};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct StatePublisher<T: ObservableStateTypes> {
    projector: StateProjector<T>,
    latest_state: RwLock<Option<Arc<BeaconStateEx<T>>>>,
    channel: ReplayChannel<ObservableBeaconState<T>>,
}

impl<T: ObservableStateTypes> StatePublisher<T> {
    pub fn new(projector: StateProjector<T>, channel_capacity: usize) -> Self {
        Self {
            projector,
            latest_state: RwLock::new(None),
            channel: ReplayChannel::new(channel_capacity, "observable_state"),
        }
    }

    pub fn latest_slot(&self) -> Option<Slot> {
        self.latest_state.read().as_ref().map(|s| s.slot())
    }

    /// The most recently published state itself, used by the aggregation
    /// job to expand drained attestations against (SPEC_FULL.md §4.1).
    pub fn latest_state(&self) -> Option<Arc<BeaconStateEx<T>>> {
        self.latest_state.read().clone()
    }

    pub fn subscribe(&self) -> ReplaySubscription<ObservableBeaconState<T>> {
        self.channel.subscribe()
    }

    /// `tuple_details` is only consulted on the same-slot path, and only
    /// when the caller has one to hand (freshly imported block). It is
    /// `None` for slot-tick-driven calls.
    pub fn publish(
        &self,
        head: &BeaconChainHead<T>,
        slot: Slot,
        pending_operations: &PendingOperationsSnapshot<T>,
        tuple_details: Option<&BeaconTupleDetails<T>>,
    ) -> Result<(), TransitionError> {
        let head_slot = head.block().slot();
        if slot > head_slot {
            self.publish_forward(head, slot, pending_operations)
        } else if slot == head_slot {
            self.publish_same_slot(head, pending_operations, tuple_details);
            Ok(())
        } else {
            // Stale path is unreachable when callers honor invariant 5;
            // `Processor` filters before calling `publish`.
            Ok(())
        }
    }

    fn publish_forward(
        &self,
        head: &BeaconChainHead<T>,
        slot: Slot,
        pending_operations: &PendingOperationsSnapshot<T>,
    ) -> Result<(), TransitionError> {
        let head_slot = head.block().slot();
        let projected = self.projector.project(&head.tuple.state, slot)?;
        self.emit(head, Arc::new(projected.clone()), pending_operations);

        if let Some(epoch_state) =
            self.projector
                .project_epoch_if_needed(head_slot, slot, &projected)?
        {
            self.emit(head, Arc::new(epoch_state), pending_operations);
        }
        Ok(())
    }

    fn publish_same_slot(
        &self,
        head: &BeaconChainHead<T>,
        pending_operations: &PendingOperationsSnapshot<T>,
        tuple_details: Option<&BeaconTupleDetails<T>>,
    ) {
        let intermediate = tuple_details
            .map(BeaconTupleDetails::ordered_intermediate_states)
            .unwrap_or_default();

        if intermediate.is_empty() {
            self.emit(head, Arc::clone(&head.tuple.state), pending_operations);
            return;
        }
        for state in intermediate {
            self.emit(head, state, pending_operations);
        }
    }

    fn emit(
        &self,
        head: &BeaconChainHead<T>,
        state: Arc<BeaconStateEx<T>>,
        pending_operations: &PendingOperationsSnapshot<T>,
    ) {
        *self.latest_state.write() = Some(Arc::clone(&state));
        let observable = ObservableBeaconState::new(
            Arc::clone(head.block()),
            state,
            pending_operations.clone(),
        );
        self.channel.publish(observable);
        metrics::inc_counter(&metrics::OBSERVABLE_STATE_PUBLISHED_TOTAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osp_types::testing::{FakeSpec, FakeState, FakeTypes};
    use osp_types::{BeaconTuple, ChainSpec, StateTransitions, TransitionType};
    use osp_types::testing::FakeBlock;

    struct IncrementTransitions;

    impl StateTransitions<FakeTypes> for IncrementTransitions {
        fn per_slot_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
            Ok(FakeState::new(state.slot.as_u64() + 1))
        }

        fn per_epoch_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
            Ok(FakeState::new(state.slot.as_u64()))
        }
    }

    fn head(slot: u64) -> BeaconChainHead<FakeTypes> {
        let block = FakeBlock::new(slot, 1);
        let state = BeaconStateEx::new(FakeState::new(slot), TransitionType::Block);
        BeaconChainHead::new(BeaconTuple::new(block, state))
    }

    fn publisher() -> StatePublisher<FakeTypes> {
        let projector = StateProjector::new(
            Arc::new(IncrementTransitions),
            Arc::new(FakeSpec::default()) as Arc<dyn ChainSpec<FakeTypes>>,
        );
        StatePublisher::new(projector, 8)
    }

    #[tokio::test]
    async fn forward_path_emits_one_state_off_boundary() {
        let publisher = publisher();
        let head = head(0);
        let snapshot = PendingOperationsSnapshot::empty();
        publisher.publish(&head, Slot::new(1), &snapshot, None).unwrap();

        let mut sub = publisher.subscribe();
        let emitted = sub.recv().await.unwrap();
        assert_eq!(emitted.state.slot(), Slot::new(1));
        assert_eq!(publisher.latest_slot(), Some(Slot::new(1)));
    }

    #[tokio::test]
    async fn forward_path_double_emits_at_epoch_boundary() {
        // SPEC_FULL.md §8 scenario 3: head at slot 7, tick at slot 8.
        let publisher = publisher();
        let head = head(7);
        let snapshot = PendingOperationsSnapshot::empty();
        publisher.publish(&head, Slot::new(8), &snapshot, None).unwrap();

        let mut sub = publisher.subscribe();
        let first = sub.recv().await.unwrap();
        assert_eq!(first.state.slot(), Slot::new(8));
        assert_ne!(first.state.transition_type, TransitionType::Epoch);

        let second = sub.recv().await.unwrap();
        assert_eq!(second.state.slot(), Slot::new(8));
        assert_eq!(second.state.transition_type, TransitionType::Epoch);
    }

    #[tokio::test]
    async fn same_slot_path_falls_back_to_final_state_when_no_details() {
        let publisher = publisher();
        let head = head(5);
        let snapshot = PendingOperationsSnapshot::empty();
        publisher.publish(&head, Slot::new(5), &snapshot, None).unwrap();

        let mut sub = publisher.subscribe();
        let emitted = sub.recv().await.unwrap();
        assert_eq!(emitted.state.slot(), Slot::new(5));
    }

    #[tokio::test]
    async fn same_slot_path_emits_ordered_intermediate_states() {
        let publisher = publisher();
        let head = head(5);
        let tuple = BeaconTuple::new(FakeBlock::new(5, 1), BeaconStateEx::new(FakeState::new(5), TransitionType::Block));
        let details = BeaconTupleDetails::new(tuple)
            .with_post_slot(BeaconStateEx::new(FakeState::new(5), TransitionType::Slot))
            .with_post_block(BeaconStateEx::new(FakeState::new(5), TransitionType::Block));
        let snapshot = PendingOperationsSnapshot::empty();
        publisher
            .publish(&head, Slot::new(5), &snapshot, Some(&details))
            .unwrap();

        let mut sub = publisher.subscribe();
        let first = sub.recv().await.unwrap();
        assert_eq!(first.state.transition_type, TransitionType::Slot);
        let second = sub.recv().await.unwrap();
        assert_eq!(second.state.transition_type, TransitionType::Block);
    }
}
