use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A slot number.
///
/// Arithmetic saturates at zero rather than panicking, matching the
/// teacher's `naive_aggregation_pool::NaiveAggregationPool::prune`
/// comment ("Taking advantage of saturating subtraction on `Slot`").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(u64);

impl Slot {
    pub const fn new(slot: u64) -> Self {
        Slot(slot)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn saturating_sub<T: Into<Slot>>(&self, other: T) -> Slot {
        Slot(self.0.saturating_sub(other.into().0))
    }

    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0 / slots_per_epoch)
    }
}

impl From<u64> for Slot {
    fn from(n: u64) -> Self {
        Slot(n)
    }
}

impl Add<u64> for Slot {
    type Output = Slot;
    fn add(self, rhs: u64) -> Slot {
        Slot(self.0 + rhs)
    }
}

impl Sub<u64> for Slot {
    type Output = Slot;
    fn sub(self, rhs: u64) -> Slot {
        Slot(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(u64);

impl Epoch {
    pub const fn new(epoch: u64) -> Self {
        Epoch(epoch)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn start_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0 * slots_per_epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_sub_never_panics() {
        let slot = Slot::new(3);
        assert_eq!(slot.saturating_sub(10u64), Slot::new(0));
    }

    #[test]
    fn epoch_roundtrip() {
        let slot = Slot::new(17);
        assert_eq!(slot.epoch(8), Epoch::new(2));
        assert_eq!(Epoch::new(2).start_slot(8), Slot::new(16));
    }
}
