//! Protocol constants shared by every subsystem.

use crate::amount::{Amount, FIXED_POINT};

/// Epoch start, unix seconds (2016-05-24T17:00:00Z).
pub const EPOCH_TIME: u64 = 1_464_109_200;

/// Slot length in seconds.
pub const BLOCK_TIME: u64 = 10;

/// Size of the active delegate set.
pub const ACTIVE_DELEGATES: u64 = 101;

/// Current block version.
pub const BLOCK_VERSION: u8 = 0;

/// Maximum payload length of a block in bytes.
pub const MAX_PAYLOAD_LENGTH: usize = 1024 * 1024;

/// Maximum transactions per block.
pub const MAX_TXS_PER_BLOCK: usize = 25;

/// Maximum votes an account may hold.
pub const MAX_VOTES: usize = 101;

/// Maximum vote entries in one transaction.
pub const MAX_VOTES_PER_TRANSACTION: usize = 33;

/// Multisignature limits.
pub const MULTISIG_MIN_KEYS: u8 = 1;
pub const MULTISIG_MAX_KEYS: u8 = 15;
pub const MULTISIG_MIN_LIFETIME: u8 = 1;
pub const MULTISIG_MAX_LIFETIME: u8 = 72;

/// Maximum delegate username length.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Round containing `height`: `ceil(height / delegates)`.
///
/// Height 0 does not exist; it maps to round 0.
pub const fn round_for(height: u64, delegates: u64) -> u64 {
    if delegates == 0 {
        return 0;
    }
    height.div_ceil(delegates)
}

/// Fee schedule in base units.
pub mod fees {
    use super::FIXED_POINT;

    pub const SEND: u64 = FIXED_POINT / 10;
    pub const SECOND_SIGNATURE: u64 = 5 * FIXED_POINT;
    pub const DELEGATE: u64 = 25 * FIXED_POINT;
    pub const VOTE: u64 = FIXED_POINT;
    /// Per keysgroup member plus one.
    pub const MULTISIGNATURE: u64 = 5 * FIXED_POINT;
    pub const IN_TRANSFER: u64 = FIXED_POINT / 10;
    pub const OUT_TRANSFER: u64 = FIXED_POINT / 10;
}

/// Block reward schedule.
///
/// Rewards start at `offset`, then step through `milestones` every
/// `distance` blocks and stay at the last milestone forever.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardSchedule {
    pub milestones: Vec<Amount>,
    pub offset: u64,
    pub distance: u64,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            milestones: [5, 4, 3, 2, 1].into_iter().map(Amount::coins).collect(),
            offset: 1_451_520,
            distance: 3_000_000,
        }
    }
}

impl RewardSchedule {
    /// Schedule with no rewards at all.
    pub fn none() -> Self {
        Self {
            milestones: Vec::new(),
            offset: u64::MAX,
            distance: 1,
        }
    }

    /// Milestone index in effect at `height`.
    pub fn milestone(&self, height: u64) -> usize {
        if height < self.offset || self.distance == 0 {
            return 0;
        }
        let step = (height - self.offset) / self.distance;
        usize::try_from(step)
            .unwrap_or(usize::MAX)
            .min(self.milestones.len().saturating_sub(1))
    }

    /// Reward paid to the generator of the block at `height`.
    pub fn reward(&self, height: u64) -> Amount {
        if height < self.offset {
            return Amount::ZERO;
        }
        self.milestones
            .get(self.milestone(height))
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_milestones() {
        let schedule = RewardSchedule::default();
        assert_eq!(schedule.reward(1), Amount::ZERO);
        assert_eq!(schedule.reward(1_451_519), Amount::ZERO);
        assert_eq!(schedule.reward(1_451_520), Amount::coins(5));
        assert_eq!(schedule.reward(1_451_520 + 3_000_000), Amount::coins(4));
        assert_eq!(schedule.reward(1_451_520 + 15_000_000), Amount::coins(1));
        assert_eq!(schedule.reward(u64::MAX), Amount::coins(1));
    }

    #[test]
    fn test_no_rewards() {
        assert_eq!(RewardSchedule::none().reward(10), Amount::ZERO);
    }

    #[test]
    fn test_round_for() {
        assert_eq!(round_for(1, 101), 1);
        assert_eq!(round_for(101, 101), 1);
        assert_eq!(round_for(102, 101), 2);
        assert_eq!(round_for(0, 101), 0);
    }

    #[test]
    fn test_fee_values() {
        assert_eq!(fees::SEND, 10_000_000);
        assert_eq!(fees::DELEGATE, 2_500_000_000);
    }
}
