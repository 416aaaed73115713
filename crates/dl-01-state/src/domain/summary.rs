//! Aggregates read back from storage.

use shared_types::{Amount, LedgerResult, PublicKey, TransactionId};

/// Fees, rewards and generators of every block in a round, in height order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Total fees, truncated to whole base units once.
    pub fees: Amount,
    /// Per-block rewards, parallel to `delegates`.
    pub rewards: Vec<Amount>,
    /// Generator of each block.
    pub delegates: Vec<PublicKey>,
}

impl RoundSummary {
    /// Build from a decimal fee aggregate (e.g. `"102.9"`), truncating the
    /// fee total toward zero.
    pub fn from_aggregate(
        fees: &str,
        rewards: Vec<Amount>,
        delegates: Vec<PublicKey>,
    ) -> LedgerResult<Self> {
        Ok(Self {
            fees: Amount::floor_from_decimal(fees)?,
            rewards,
            delegates,
        })
    }
}

/// Registered dapp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dapp {
    pub id: TransactionId,
    /// Key of the account that registered the dapp; in-transfers credit it.
    pub author: PublicKey,
}
