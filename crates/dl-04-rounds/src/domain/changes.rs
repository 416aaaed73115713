//! Per-delegate shares of a closed round.

use crate::domain::Result;
use shared_types::Amount;

/// One delegate's share of the round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundShare {
    /// `fees + rewards`.
    pub balance: Amount,
    pub fees: Amount,
    /// Leftover of the even fee split. Reported at every index, credited
    /// to exactly one delegate by the caller.
    pub fees_remaining: Amount,
    pub rewards: Amount,
}

/// Fee split and reward list of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundChanges {
    round: u64,
    rewards: Vec<Amount>,
    fee_per_delegate: Amount,
    fees_remaining: Amount,
}

impl RoundChanges {
    /// Split `fees` (already truncated to whole base units) evenly over
    /// `active_delegates`. `rewards` is parallel to the round's generators.
    pub fn new(
        round: u64,
        fees: Amount,
        rewards: Vec<Amount>,
        active_delegates: u64,
    ) -> Result<Self> {
        let (fee_per_delegate, fees_remaining) = fees.div_rem(active_delegates)?;
        Ok(Self {
            round,
            rewards,
            fee_per_delegate,
            fees_remaining,
        })
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn fees_remaining(&self) -> Amount {
        if self.rewards.is_empty() {
            return Amount::ZERO;
        }
        self.fees_remaining
    }

    /// Share of the delegate at `index`. A round without blocks pays
    /// nothing at any index.
    pub fn at(&self, index: usize) -> Result<RoundShare> {
        if self.rewards.is_empty() {
            return Ok(RoundShare::default());
        }
        let rewards = self.rewards.get(index).copied().unwrap_or(Amount::ZERO);
        Ok(RoundShare {
            balance: self.fee_per_delegate.checked_add(rewards)?,
            fees: self.fee_per_delegate,
            fees_remaining: self.fees_remaining,
            rewards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::FIXED_POINT;

    #[test]
    fn test_fee_split_with_remainder() {
        let changes = RoundChanges::new(
            3,
            Amount::new(102),
            vec![Amount::coins(5); 101],
            101,
        )
        .unwrap();

        let share = changes.at(50).unwrap();
        assert_eq!(share.fees, Amount::new(1));
        assert_eq!(share.fees_remaining, Amount::new(1));
        assert_eq!(share.rewards, Amount::coins(5));
        assert_eq!(share.balance, Amount::new(5 * FIXED_POINT + 1));
        assert_eq!(changes.fees_remaining(), Amount::new(1));
    }

    #[test]
    fn test_truncated_aggregate_feeds_split() {
        let fees = Amount::floor_from_decimal("102.9").unwrap();
        let changes = RoundChanges::new(1, fees, vec![Amount::ZERO; 101], 101).unwrap();

        assert_eq!(changes.at(0).unwrap().fees, Amount::new(1));
        assert_eq!(changes.at(100).unwrap().fees_remaining, Amount::new(1));
    }

    #[test]
    fn test_empty_round_pays_nothing() {
        let changes = RoundChanges::new(9, Amount::new(1_000), Vec::new(), 101).unwrap();

        for index in [0, 1, 100] {
            assert_eq!(changes.at(index).unwrap(), RoundShare::default());
        }
        assert_eq!(changes.fees_remaining(), Amount::ZERO);
    }

    #[test]
    fn test_zero_delegates_rejected() {
        assert!(RoundChanges::new(1, Amount::new(10), vec![Amount::ZERO], 0).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_fee_split_conserves_round_fees(
                fees in 0u64..=1_000_000_000_000,
                delegates in 1u64..=201,
            ) {
                let count = usize::try_from(delegates).unwrap();
                let changes = RoundChanges::new(
                    1,
                    Amount::new(fees),
                    vec![Amount::ZERO; count],
                    delegates,
                )
                .unwrap();

                let mut paid = 0u64;
                for index in 0..count {
                    paid += changes.at(index).unwrap().fees.units();
                }
                paid += changes.fees_remaining().units();
                prop_assert_eq!(paid, fees);
                prop_assert!(changes.fees_remaining().units() < delegates);
            }
        }
    }
}
