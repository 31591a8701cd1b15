//! Data model and external-interface contracts for the Observable State
//! Processor (SPEC_FULL.md §3, §6).
//!
//! This crate owns no behaviour: it is the shared vocabulary that
//! `attestation_pool` and `observable_state_processor` are both generic
//! over, in the idiom of the teacher's `types` crate sitting underneath
//! `beacon_chain` and `fork_choice`.

mod collaborators;
mod config;
mod observable_state;
mod slot;
mod snapshot;
mod state;
mod tuple;
pub mod testing;

pub use collaborators::{
    AttestationRef, AttestationResolver, BeaconBlockRef, ChainSpec, ConsensusState,
    HeadFunction, ObservableStateTypes, StateTransitions, StorageError, TransitionError,
    TupleStorage,
};
pub use config::{
    ObservableStateConfig, DEFAULT_AGGREGATION_PERIOD, DEFAULT_CHANNEL_CAPACITY,
    DEFAULT_MIN_ATTESTATION_INCLUSION_DELAY, DEFAULT_SLOTS_PER_EPOCH,
    DEFAULT_TUPLE_CACHE_CAPACITY,
};
pub use observable_state::{BeaconChainHead, ObservableBeaconState};
pub use slot::{Epoch, Slot};
pub use snapshot::PendingOperationsSnapshot;
pub use state::{BeaconStateEx, TransitionType};
pub use tuple::{BeaconTuple, BeaconTupleDetails};

pub use ethereum_types::H256 as Hash256;
