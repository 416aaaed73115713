//! Slot clock: wall-clock time to slot numbers and back.
//!
//! Timestamps inside transactions and blocks are seconds since the epoch
//! ("epoch time"). A slot is a `block_time`-long window; slot `n` starts at
//! epoch time `n * block_time`.

use super::{Result, SlotError};
use crate::config::SlotConfig;
use crate::ports::TimeSource;
use shared_types::round_for;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Maps time to slots for a fixed configuration.
#[derive(Clone)]
pub struct SlotClock {
    config: SlotConfig,
    time: Arc<dyn TimeSource>,
}

impl std::fmt::Debug for SlotClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotClock")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlotClock {
    /// Validate `config` and build a clock reading `time`.
    pub fn new(mut config: SlotConfig, time: Arc<dyn TimeSource>) -> Result<Self> {
        if config.block_time == 0 {
            return Err(SlotError::InvalidConfig("block time must be positive".into()));
        }
        if config.active_delegates == 0
            || config.delegate_schedule.iter().any(|c| c.delegates == 0)
        {
            return Err(SlotError::InvalidConfig(
                "active delegate count must be positive".into(),
            ));
        }
        config.delegate_schedule.sort_by_key(|c| c.height);
        Ok(Self { config, time })
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Epoch time of a unix timestamp, or of now. Times before the epoch
    /// map to zero.
    pub fn epoch_time(&self, unix: Option<u64>) -> u64 {
        let unix = unix.unwrap_or_else(|| self.time.now());
        unix.saturating_sub(self.config.epoch_time)
    }

    /// Unix timestamp of an epoch time.
    pub fn real_time(&self, epoch_time: u64) -> u64 {
        self.config.epoch_time + epoch_time
    }

    /// Slot containing `epoch_time`, or the current slot.
    pub fn slot_number(&self, epoch_time: Option<u64>) -> u64 {
        let epoch_time = epoch_time.unwrap_or_else(|| self.epoch_time(None));
        epoch_time / self.config.block_time
    }

    /// Epoch time at which `slot` starts.
    pub fn slot_time(&self, slot: u64) -> u64 {
        slot * self.config.block_time
    }

    /// Slot after the current one.
    pub fn next_slot(&self) -> u64 {
        self.slot_number(None) + 1
    }

    /// End (exclusive) of the lookahead window starting at `slot`.
    pub fn last_slot_of(&self, slot: u64, height: Option<u64>) -> u64 {
        slot + self.num_delegates(height)
    }

    /// Active set size at `height`; the base size when no height is given.
    pub fn num_delegates(&self, height: Option<u64>) -> u64 {
        let Some(height) = height else {
            return self.config.active_delegates;
        };
        self.config
            .delegate_schedule
            .iter()
            .rev()
            .find(|change| change.height <= height)
            .map_or(self.config.active_delegates, |change| change.delegates)
    }

    /// Round containing `height`.
    pub fn round_of(&self, height: u64) -> u64 {
        round_for(height, self.num_delegates(Some(height)))
    }

    /// The contiguous run of heights around `height` that share its round.
    /// Rounds may be shorter than `num_delegates` where the schedule
    /// changes the set size.
    pub fn round_heights(&self, height: u64) -> RangeInclusive<u64> {
        let round = self.round_of(height);
        let mut first = height;
        while first > 1 && self.round_of(first - 1) == round {
            first -= 1;
        }
        let mut last = height;
        while self.round_of(last + 1) == round {
            last += 1;
        }
        first..=last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelegateCountChange;

    struct FixedTime(u64);

    impl TimeSource for FixedTime {
        fn now(&self) -> u64 {
            self.0
        }
    }

    fn clock_at(unix: u64) -> SlotClock {
        SlotClock::new(SlotConfig::default(), Arc::new(FixedTime(unix))).unwrap()
    }

    #[test]
    fn test_slot_number_from_now() {
        let epoch = SlotConfig::default().epoch_time;
        let clock = clock_at(epoch + 975);
        assert_eq!(clock.epoch_time(None), 975);
        assert_eq!(clock.slot_number(None), 97);
        assert_eq!(clock.next_slot(), 98);
    }

    #[test]
    fn test_slot_time_and_lookahead() {
        let clock = clock_at(0);
        assert_eq!(clock.slot_time(97), 970);
        assert_eq!(clock.slot_number(Some(979)), 97);
        assert_eq!(clock.slot_number(Some(980)), 98);
        assert_eq!(clock.last_slot_of(97, None), 198);
    }

    #[test]
    fn test_before_epoch_is_slot_zero() {
        let clock = clock_at(5);
        assert_eq!(clock.slot_number(None), 0);
    }

    #[test]
    fn test_delegate_schedule() {
        let config = SlotConfig {
            delegate_schedule: vec![DelegateCountChange {
                height: 1_000,
                delegates: 51,
            }],
            ..SlotConfig::default()
        };
        let clock = SlotClock::new(config, Arc::new(FixedTime(0))).unwrap();

        assert_eq!(clock.num_delegates(Some(999)), 101);
        assert_eq!(clock.num_delegates(Some(1_000)), 51);
        assert_eq!(clock.num_delegates(None), 101);
        assert_eq!(clock.round_of(101), 1);
        assert_eq!(clock.round_of(1_020), 20);
    }

    #[test]
    fn test_round_heights_across_schedule_change() {
        let config = SlotConfig {
            active_delegates: 5,
            delegate_schedule: vec![DelegateCountChange {
                height: 8,
                delegates: 3,
            }],
            ..SlotConfig::default()
        };
        let clock = SlotClock::new(config, Arc::new(FixedTime(0))).unwrap();

        assert_eq!(clock.round_heights(1), 1..=5);
        assert_eq!(clock.round_heights(4), 1..=5);
        // 6 and 7 still count in fives; 8 and 9 count in threes
        assert_eq!(clock.round_heights(6), 6..=7);
        assert_eq!(clock.round_of(8), 3);
        assert_eq!(clock.round_heights(8), 8..=9);
        assert_eq!(clock.round_heights(10), 10..=12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SlotConfig {
            block_time: 0,
            ..SlotConfig::default()
        };
        assert!(SlotClock::new(config, Arc::new(FixedTime(0))).is_err());
    }
}
