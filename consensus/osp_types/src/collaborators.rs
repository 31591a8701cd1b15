//! External-interface traits (SPEC_FULL.md §6).
//!
//! These model collaborators the processor consumes but does not design:
//! the state-transition functions, the fork-choice algorithm, and tuple
//! storage. Grounded on the teacher's `ForkChoiceStore` (a trait bundling
//! everything fork choice needs from its host) and `Eth1Chain<T:
//! BeaconChainTypes>` (a narrow, single-purpose external-collaborator
//! trait parameterised by the chain's associated types).

use crate::slot::Slot;
use crate::tuple::BeaconTuple;
use ethereum_types::H256 as Hash256;
use std::fmt::Debug;
use std::hash::Hash;

/// A block identifier: opaque, hashable, owned externally.
pub trait BeaconBlockRef: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    fn slot(&self) -> Slot;
    fn canonical_root(&self) -> Hash256;
}

/// A post-block or post-slot/epoch consensus state: opaque, owned externally.
pub trait ConsensusState: Clone + Debug + Send + Sync + 'static {
    fn slot(&self) -> Slot;
}

/// An attestation: opaque, owned externally.
pub trait AttestationRef: Clone + Debug + Send + Sync + 'static {
    fn data_slot(&self) -> Slot;
}

/// Bundles the associated types that parameterise every OSP component, in
/// the idiom of the teacher's `BeaconChainTypes`.
pub trait ObservableStateTypes: Clone + Send + Sync + 'static {
    type Block: BeaconBlockRef;
    type State: ConsensusState;
    type Attestation: AttestationRef;
    type ValidatorIndex: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    type PublicKey: Clone + Eq + Ord + Hash + Debug + Send + Sync + 'static;

    /// The attestations a block includes on-chain. Used to `forget`
    /// (SPEC_FULL.md §4.1) them from the pending pool once imported: an
    /// attestation included on-chain no longer needs tracking as pending.
    fn block_attestations(block: &Self::Block) -> Vec<Self::Attestation>;
}

/// A transition failed. Propagated to the tick's caller; the tick simply
/// emits nothing and the next tick retries from the same head
/// (SPEC_FULL.md §7).
#[derive(Debug, Clone)]
pub struct TransitionError(pub String);

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transition failed: {}", self.0)
    }
}

impl std::error::Error for TransitionError {}

/// `per_slot_transition` / `per_epoch_transition` (SPEC_FULL.md §6).
pub trait StateTransitions<T: ObservableStateTypes>: Send + Sync {
    fn per_slot_transition(&self, state: &T::State) -> Result<T::State, TransitionError>;

    /// Applied only when called exactly at an epoch boundary; the caller
    /// (the State Projector) is responsible for only calling this then.
    fn per_epoch_transition(&self, state: &T::State) -> Result<T::State, TransitionError>;
}

/// `spec.get_attestation_participants` / `map_indices_to_pubkeys` /
/// `is_epoch_end` plus the two timing constants (SPEC_FULL.md §6).
pub trait ChainSpec<T: ObservableStateTypes>: Send + Sync {
    fn slots_per_epoch(&self) -> u64;
    fn min_attestation_inclusion_delay(&self) -> u64;
    fn is_epoch_end(&self, slot: Slot) -> bool;

    fn get_attestation_participants(
        &self,
        state: &T::State,
        attestation: &T::Attestation,
    ) -> Vec<T::ValidatorIndex>;

    fn map_indices_to_pubkeys(
        &self,
        state: &T::State,
        indices: &[T::ValidatorIndex],
    ) -> Vec<T::PublicKey>;
}

#[derive(Debug, Clone)]
pub enum StorageError {
    Io(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "tuple storage I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// `tuple_storage.get(block_root) -> maybe tuple` (SPEC_FULL.md §6). A
/// miss is `Ok(None)`; storage-layer faults are `Err`.
pub trait TupleStorage<T: ObservableStateTypes>: Send + Sync {
    fn get(&self, block_root: Hash256) -> Result<Option<BeaconTuple<T>>, StorageError>;
}

/// Resolves the latest cached attestation for a validator's public key, as
/// handed to the external head function (SPEC_FULL.md §6).
pub type AttestationResolver<'a, T> =
    dyn Fn(&<T as ObservableStateTypes>::PublicKey) -> Option<<T as ObservableStateTypes>::Attestation> + 'a;

/// `head_function(active_attestation_resolver) -> block` (SPEC_FULL.md §6).
/// A pure function: the fork-choice algorithm itself is out of scope, only
/// this contract is.
pub trait HeadFunction<T: ObservableStateTypes>: Send + Sync {
    fn find_head(&self, attestation_resolver: &AttestationResolver<'_, T>) -> T::Block;
}
