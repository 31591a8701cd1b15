use super::SlotClock;
use parking_lot::RwLock;
use std::ops::Add;
use std::sync::Arc;
use std::time::Duration;

/// Determines the present slot based upon a manually-set UNIX timestamp.
///
/// Used throughout this crate's and the processor crate's tests to drive
/// slot ticks deterministically rather than sleeping in wall-clock time.
#[derive(Clone)]
pub struct ManualSlotClock {
    genesis_duration: Duration,
    current_time: Arc<RwLock<Duration>>,
    slot_duration: Duration,
}

impl ManualSlotClock {
    pub fn new(genesis_duration: Duration, slot_duration: Duration) -> Self {
        Self {
            genesis_duration,
            current_time: Arc::new(RwLock::new(genesis_duration)),
            slot_duration,
        }
    }

    pub fn set_slot(&self, slot: u64) {
        *self.current_time.write() = self.genesis_duration + self.slot_duration * slot as u32;
    }

    pub fn set_current_time(&self, duration: Duration) {
        *self.current_time.write() = duration;
    }

    pub fn advance_slot(&self) {
        let next = self.now().unwrap_or(0) + 1;
        self.set_slot(next);
    }

    fn start_of(&self, slot: u64) -> Duration {
        self.genesis_duration.add(self.slot_duration * slot as u32)
    }
}

impl SlotClock for ManualSlotClock {
    fn now(&self) -> Option<u64> {
        let now = *self.current_time.read();
        now.checked_sub(self.genesis_duration)
            .map(|since_genesis| since_genesis.as_millis() as u64 / self.slot_duration.as_millis() as u64)
    }

    fn duration_to_slot(&self, slot: u64) -> Option<Duration> {
        self.start_of(slot).checked_sub(*self.current_time.read())
    }

    fn duration_to_next_slot(&self) -> Option<Duration> {
        let next = self.now()? + 1;
        self.duration_to_slot(next)
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_slot_at_a_time() {
        let clock = ManualSlotClock::new(Duration::from_secs(0), Duration::from_secs(12));
        assert_eq!(clock.now(), Some(0));
        clock.advance_slot();
        assert_eq!(clock.now(), Some(1));
        clock.advance_slot();
        assert_eq!(clock.now(), Some(2));
    }

    #[test]
    fn set_slot_is_absolute() {
        let clock = ManualSlotClock::new(Duration::from_secs(0), Duration::from_secs(12));
        clock.set_slot(10);
        assert_eq!(clock.now(), Some(10));
    }
}
