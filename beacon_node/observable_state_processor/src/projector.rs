//! Advances a known state forward by empty slots to a target slot, applying
//! epoch transitions at boundaries (SPEC_FULL.md §4.2).

use crate::metrics;
use osp_types::{BeaconStateEx, ChainSpec, ObservableStateTypes, Slot, StateTransitions, TransitionError, TransitionType};
use std::sync::Arc;

pub struct StateProjector<T: ObservableStateTypes> {
    transitions: Arc<dyn StateTransitions<T>>,
    spec: Arc<dyn ChainSpec<T>>,
}

impl<T: ObservableStateTypes> StateProjector<T> {
    pub fn new(transitions: Arc<dyn StateTransitions<T>>, spec: Arc<dyn ChainSpec<T>>) -> Self {
        Self { transitions, spec }
    }

    /// Advances `source` to `target_slot` one slot at a time via
    /// `per_slot_transition`, applying `per_epoch_transition` at every
    /// intermediate epoch boundary crossed but deliberately *not* at
    /// `target_slot` itself — that is `project_epoch_if_needed`'s job.
    ///
    /// `project(s, s.slot) == s`: if `source.slot() == target_slot` this
    /// returns `source` unchanged without calling any external transition.
    pub fn project(
        &self,
        source: &BeaconStateEx<T>,
        target_slot: Slot,
    ) -> Result<BeaconStateEx<T>, TransitionError> {
        let _timer = metrics::start_timer(&metrics::STATE_PROJECTION_TIME);
        let mut current = source.clone();
        while current.slot() < target_slot {
            let next_state = self.transitions.per_slot_transition(&current.state)?;
            let mut next = BeaconStateEx::new(next_state, TransitionType::Slot);
            if next.slot() < target_slot && self.spec.is_epoch_end(next.slot()) {
                let epoch_state = self.transitions.per_epoch_transition(&next.state)?;
                next = BeaconStateEx::new(epoch_state, TransitionType::Epoch);
            }
            current = next;
        }
        Ok(current)
    }

    /// Applies the epoch transition at `target_slot` if it is both an epoch
    /// boundary and distinct from `source_slot`. Returns `None` otherwise,
    /// matching SPEC_FULL.md §4.2's split between the "just-before" and
    /// "just-after" observable states at a boundary.
    pub fn project_epoch_if_needed(
        &self,
        source_slot: Slot,
        target_slot: Slot,
        projected: &BeaconStateEx<T>,
    ) -> Result<Option<BeaconStateEx<T>>, TransitionError> {
        if source_slot == target_slot || !self.spec.is_epoch_end(target_slot) {
            return Ok(None);
        }
        let epoch_state = self.transitions.per_epoch_transition(&projected.state)?;
        Ok(Some(BeaconStateEx::new(epoch_state, TransitionType::Epoch)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osp_types::testing::{FakeSpec, FakeState, FakeTypes};

    struct IncrementTransitions;

    impl StateTransitions<FakeTypes> for IncrementTransitions {
        fn per_slot_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
            Ok(FakeState::new(state.slot.as_u64() + 1))
        }

        fn per_epoch_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
            Ok(FakeState::new(state.slot.as_u64()))
        }
    }

    fn projector() -> StateProjector<FakeTypes> {
        StateProjector::new(Arc::new(IncrementTransitions), Arc::new(FakeSpec::default()))
    }

    #[test]
    fn project_to_same_slot_is_identity() {
        let projector = projector();
        let state = BeaconStateEx::new(FakeState::new(5), TransitionType::Block);
        let projected = projector.project(&state, Slot::new(5)).unwrap();
        assert_eq!(projected.slot(), Slot::new(5));
        assert_eq!(projected.transition_type, TransitionType::Block);
    }

    #[test]
    fn project_stops_before_epoch_transition_at_target() {
        // SLOTS_PER_EPOCH = 8: slot 8 is a boundary, but project() must not
        // apply the epoch transition there, only the per-slot one.
        let projector = projector();
        let state = BeaconStateEx::new(FakeState::new(7), TransitionType::Block);
        let projected = projector.project(&state, Slot::new(8)).unwrap();
        assert_eq!(projected.slot(), Slot::new(8));
        assert_eq!(projected.transition_type, TransitionType::Slot);
    }

    #[test]
    fn project_applies_epoch_transition_at_intermediate_boundary() {
        let projector = projector();
        let state = BeaconStateEx::new(FakeState::new(7), TransitionType::Block);
        let projected = projector.project(&state, Slot::new(9)).unwrap();
        assert_eq!(projected.slot(), Slot::new(9));
    }

    #[test]
    fn project_epoch_if_needed_is_none_off_boundary() {
        let projector = projector();
        let projected = BeaconStateEx::new(FakeState::new(9), TransitionType::Slot);
        assert!(projector
            .project_epoch_if_needed(Slot::new(7), Slot::new(9), &projected)
            .unwrap()
            .is_none());
    }

    #[test]
    fn project_epoch_if_needed_fires_exactly_at_boundary() {
        let projector = projector();
        let projected = BeaconStateEx::new(FakeState::new(8), TransitionType::Slot);
        let epoch_state = projector
            .project_epoch_if_needed(Slot::new(7), Slot::new(8), &projected)
            .unwrap()
            .unwrap();
        assert_eq!(epoch_state.transition_type, TransitionType::Epoch);
    }

    #[test]
    fn project_epoch_if_needed_is_none_when_source_equals_target() {
        let projector = projector();
        let projected = BeaconStateEx::new(FakeState::new(8), TransitionType::Slot);
        assert!(projector
            .project_epoch_if_needed(Slot::new(8), Slot::new(8), &projected)
            .unwrap()
            .is_none());
    }
}
