use crate::collaborators::{AttestationRef, ObservableStateTypes};
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable view over the attestation pool's latest-attestation cache,
/// grouped by public key (SPEC_FULL.md §4.5).
///
/// Built from a frozen copy of the cache so the pool may keep mutating
/// concurrently without disturbing anyone holding a snapshot.
#[derive(Clone, Debug)]
pub struct PendingOperationsSnapshot<T: ObservableStateTypes> {
    by_pubkey: Arc<HashMap<T::PublicKey, Vec<T::Attestation>>>,
}

impl<T: ObservableStateTypes> PendingOperationsSnapshot<T> {
    pub fn new(by_pubkey: HashMap<T::PublicKey, Vec<T::Attestation>>) -> Self {
        Self {
            by_pubkey: Arc::new(by_pubkey),
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    /// All attestations observed for `pubkey`, across every slot still in
    /// the cache.
    pub fn attestations_for(&self, pubkey: &T::PublicKey) -> &[T::Attestation] {
        self.by_pubkey
            .get(pubkey)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The highest-slot attestation cached for `pubkey`, if any.
    ///
    /// Open question 2 (DESIGN.md): the pool's "latest" means
    /// last-observed per (pubkey, slot), but a validator can equivocate
    /// across slots and be present under more than one slot key; this
    /// picks the highest-slot entry among those.
    pub fn latest_attestation(&self, pubkey: &T::PublicKey) -> Option<T::Attestation> {
        self.attestations_for(pubkey)
            .iter()
            .max_by_key(|a| a.data_slot())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.by_pubkey.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pubkey.is_empty()
    }

    /// Nominal accessor so the block-production collaborator compiles
    /// against the full pending-operations interface; this specification
    /// never populates proposer slashings (SPEC_FULL.md §4.5).
    pub fn peek_proposer_slashings(&self) -> &[()] {
        &[]
    }

    pub fn peek_attester_slashings(&self) -> &[()] {
        &[]
    }

    pub fn peek_voluntary_exits(&self) -> &[()] {
        &[]
    }

    pub fn peek_deposits(&self) -> &[()] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAttestation;
    use crate::testing::FakeTypes;

    #[test]
    fn latest_attestation_picks_highest_slot_per_pubkey() {
        let by_pubkey: HashMap<u64, Vec<FakeAttestation>> = maplit::hashmap! {
            1u64 => vec![FakeAttestation::new(3, 0, vec![1]), FakeAttestation::new(5, 0, vec![1])],
            2u64 => vec![FakeAttestation::new(4, 0, vec![2])],
        };
        let snapshot = PendingOperationsSnapshot::<FakeTypes>::new(by_pubkey);

        assert_eq!(snapshot.latest_attestation(&1).unwrap().slot, crate::Slot::new(5));
        assert_eq!(snapshot.latest_attestation(&2).unwrap().slot, crate::Slot::new(4));
        assert!(snapshot.latest_attestation(&3).is_none());
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn empty_snapshot_has_no_attestations() {
        let snapshot = PendingOperationsSnapshot::<FakeTypes>::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.attestations_for(&1).is_empty());
    }
}
