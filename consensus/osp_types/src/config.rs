use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// Default mainnet `SLOTS_PER_EPOCH`.
pub const DEFAULT_SLOTS_PER_EPOCH: u64 = 32;
/// Default mainnet `MIN_ATTESTATION_INCLUSION_DELAY`.
pub const DEFAULT_MIN_ATTESTATION_INCLUSION_DELAY: u64 = 1;
/// Default tuple-details cache capacity (SPEC_FULL.md invariant 3).
pub const DEFAULT_TUPLE_CACHE_CAPACITY: usize = 256;
/// Default aggregation job period (SPEC_FULL.md §4.1).
pub const DEFAULT_AGGREGATION_PERIOD: Duration = Duration::from_millis(500);
/// Default output-channel replay/back-pressure buffer capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// The few knobs the Observable State Processor actually owns, in the
/// idiom of the teacher's `ChainConfig`. The embedding application
/// constructs this directly; the processor has no CLI or file-loading
/// surface of its own (SPEC_FULL.md §6).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservableStateConfig {
    /// Maximum number of distinct blocks retained in the tuple-details cache.
    pub tuple_cache_capacity: usize,
    /// Period of the attestation-aggregation job.
    #[serde(with = "duration_millis")]
    pub aggregation_period: Duration,
    /// Capacity of each output broadcast channel.
    pub channel_capacity: usize,
    pub slots_per_epoch: u64,
    pub min_attestation_inclusion_delay: u64,
}

impl Default for ObservableStateConfig {
    fn default() -> Self {
        Self {
            tuple_cache_capacity: DEFAULT_TUPLE_CACHE_CAPACITY,
            aggregation_period: DEFAULT_AGGREGATION_PERIOD,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            slots_per_epoch: DEFAULT_SLOTS_PER_EPOCH,
            min_attestation_inclusion_delay: DEFAULT_MIN_ATTESTATION_INCLUSION_DELAY,
        }
    }
}

impl ObservableStateConfig {
    /// The purge threshold for a given current slot (SPEC_FULL.md §4.1):
    /// entries at or below this slot are evicted from the latest-attestation
    /// cache. Uses `≤`, preserved per open question 1 (DESIGN.md).
    pub fn purge_threshold(&self, current_slot: crate::slot::Slot) -> crate::slot::Slot {
        current_slot
            .saturating_sub(self.slots_per_epoch)
            .saturating_sub(self.min_attestation_inclusion_delay)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;

    #[test]
    fn purge_threshold_matches_worked_example() {
        let config = ObservableStateConfig {
            slots_per_epoch: 8,
            min_attestation_inclusion_delay: 1,
            ..ObservableStateConfig::default()
        };
        // SPEC_FULL.md §8 scenario 2: tick slot 10, threshold = 10 - 8 - 1 = 1.
        assert_eq!(config.purge_threshold(Slot::new(10)), Slot::new(1));
    }

    #[test]
    fn purge_threshold_saturates() {
        let config = ObservableStateConfig {
            slots_per_epoch: 8,
            min_attestation_inclusion_delay: 1,
            ..ObservableStateConfig::default()
        };
        assert_eq!(config.purge_threshold(Slot::new(0)), Slot::new(0));
    }
}
