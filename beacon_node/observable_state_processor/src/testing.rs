//! Deterministic fakes for integration-testing the whole processor,
//! building on `osp_types::testing`'s `FakeTypes`. In the idiom of the
//! teacher's `BeaconChainBuilder`/`Bootstrapper` test harnesses.

use osp_types::testing::{FakeBlock, FakeState, FakeTypes};
use osp_types::{
    AttestationResolver, BeaconTuple, HeadFunction, Hash256, StateTransitions, StorageError,
    TransitionError, TupleStorage,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub use osp_types::testing::{FakeAttestation, FakeSpec};

/// Replays a scripted sequence of "winning" blocks, one per call, repeating
/// the last entry once exhausted. The attestation resolver is accepted for
/// interface compliance but unused: these fakes never need the latest
/// attestations to pick a winner.
pub struct ScriptedHeadFunction {
    script: Mutex<VecDeque<FakeBlock>>,
}

impl ScriptedHeadFunction {
    pub fn new(blocks: Vec<FakeBlock>) -> Self {
        Self {
            script: Mutex::new(blocks.into_iter().collect()),
        }
    }
}

impl HeadFunction<FakeTypes> for ScriptedHeadFunction {
    fn find_head(&self, _resolver: &AttestationResolver<'_, FakeTypes>) -> FakeBlock {
        let mut script = self.script.lock();
        if script.len() > 1 {
            script.pop_front().expect("checked non-empty above")
        } else {
            script.front().cloned().expect("ScriptedHeadFunction given an empty script")
        }
    }
}

/// An in-memory stand-in for on-disk tuple storage.
pub struct InMemoryTupleStorage {
    tuples: Mutex<HashMap<Hash256, BeaconTuple<FakeTypes>>>,
}

impl InMemoryTupleStorage {
    pub fn new() -> Self {
        Self {
            tuples: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, tuple: BeaconTuple<FakeTypes>) {
        self.tuples.lock().insert(tuple.block.canonical_root(), tuple);
    }
}

impl Default for InMemoryTupleStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TupleStorage<FakeTypes> for InMemoryTupleStorage {
    fn get(&self, block_root: Hash256) -> Result<Option<BeaconTuple<FakeTypes>>, StorageError> {
        Ok(self.tuples.lock().get(&block_root).cloned())
    }
}

/// Advances a `FakeState`'s slot by one per per-slot transition; the epoch
/// transition is a no-op on the slot itself, matching the minimal test
/// spec used throughout SPEC_FULL.md §8.
pub struct IncrementTransitions;

impl StateTransitions<FakeTypes> for IncrementTransitions {
    fn per_slot_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
        Ok(FakeState::new(state.slot.as_u64() + 1))
    }

    fn per_epoch_transition(&self, state: &FakeState) -> Result<FakeState, TransitionError> {
        Ok(FakeState::new(state.slot.as_u64()))
    }
}
