use super::SlotClock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Determines the present slot from the real system clock.
#[derive(Clone)]
pub struct SystemTimeSlotClock {
    genesis_duration: Duration,
    slot_duration: Duration,
}

impl SystemTimeSlotClock {
    pub fn new(genesis_duration: Duration, slot_duration: Duration) -> Self {
        Self {
            genesis_duration,
            slot_duration,
        }
    }

    fn now_since_unix(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }

    fn start_of(&self, slot: u64) -> Duration {
        self.genesis_duration + self.slot_duration * slot as u32
    }
}

impl SlotClock for SystemTimeSlotClock {
    fn now(&self) -> Option<u64> {
        let since_genesis = self.now_since_unix().checked_sub(self.genesis_duration)?;
        Some(since_genesis.as_millis() as u64 / self.slot_duration.as_millis() as u64)
    }

    fn duration_to_slot(&self, slot: u64) -> Option<Duration> {
        self.start_of(slot).checked_sub(self.now_since_unix())
    }

    fn duration_to_next_slot(&self) -> Option<Duration> {
        let next = self.now()? + 1;
        self.duration_to_slot(next)
    }

    fn slot_duration(&self) -> Duration {
        self.slot_duration
    }
}
