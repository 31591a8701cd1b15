//! Deterministic fakes for every external interface in SPEC_FULL.md §6,
//! shared by this crate's own tests and by `attestation_pool` and
//! `observable_state_processor`'s dev-dependencies. Grounded on the
//! teacher's habit of giving every consensus crate a small `test_utils`
//! surface that downstream crates also exercise (e.g. `types::test_utils`
//! used from `beacon_chain_builder.rs`'s tests).

use crate::collaborators::{
    AttestationRef, BeaconBlockRef, ChainSpec, ConsensusState, ObservableStateTypes,
};
use crate::slot::Slot;
use ethereum_types::H256 as Hash256;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FakeBlock {
    pub slot: Slot,
    pub root: Hash256,
    pub attestations: Vec<FakeAttestation>,
}

impl FakeBlock {
    pub fn new(slot: u64, root_byte: u8) -> Self {
        Self {
            slot: Slot::new(slot),
            root: Hash256::repeat_byte(root_byte),
            attestations: Vec::new(),
        }
    }

    pub fn with_attestations(slot: u64, root_byte: u8, attestations: Vec<FakeAttestation>) -> Self {
        Self {
            slot: Slot::new(slot),
            root: Hash256::repeat_byte(root_byte),
            attestations,
        }
    }
}

impl BeaconBlockRef for FakeBlock {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn canonical_root(&self) -> Hash256 {
        self.root
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FakeState {
    pub slot: Slot,
}

impl FakeState {
    pub fn new(slot: u64) -> Self {
        Self { slot: Slot::new(slot) }
    }
}

impl ConsensusState for FakeState {
    fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FakeAttestation {
    pub slot: Slot,
    /// Distinguishes otherwise-identical attestations in assertions.
    pub nonce: u64,
    pub participants: Vec<u64>,
}

impl FakeAttestation {
    pub fn new(slot: u64, nonce: u64, participants: Vec<u64>) -> Self {
        Self {
            slot: Slot::new(slot),
            nonce,
            participants,
        }
    }
}

impl AttestationRef for FakeAttestation {
    fn data_slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Clone, Debug)]
pub struct FakeTypes;

impl ObservableStateTypes for FakeTypes {
    type Block = FakeBlock;
    type State = FakeState;
    type Attestation = FakeAttestation;
    type ValidatorIndex = u64;
    type PublicKey = u64;

    fn block_attestations(block: &FakeBlock) -> Vec<FakeAttestation> {
        block.attestations.clone()
    }
}

/// A fixed-constants `ChainSpec` matching SPEC_FULL.md §8's worked
/// examples (`SLOTS_PER_EPOCH = 8`, `MIN_ATTESTATION_INCLUSION_DELAY = 1`),
/// where validator index and public key are the same `u64` for simplicity.
pub struct FakeSpec {
    pub slots_per_epoch: u64,
    pub min_attestation_inclusion_delay: u64,
}

impl Default for FakeSpec {
    fn default() -> Self {
        Self {
            slots_per_epoch: 8,
            min_attestation_inclusion_delay: 1,
        }
    }
}

impl ChainSpec<FakeTypes> for FakeSpec {
    fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }

    fn min_attestation_inclusion_delay(&self) -> u64 {
        self.min_attestation_inclusion_delay
    }

    fn is_epoch_end(&self, slot: Slot) -> bool {
        slot.as_u64() % self.slots_per_epoch == 0
    }

    fn get_attestation_participants(
        &self,
        _state: &FakeState,
        attestation: &FakeAttestation,
    ) -> Vec<u64> {
        attestation.participants.clone()
    }

    fn map_indices_to_pubkeys(&self, _state: &FakeState, indices: &[u64]) -> Vec<u64> {
        indices.to_vec()
    }
}
