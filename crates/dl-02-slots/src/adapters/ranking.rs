//! Delegate ranking backed by the account table.

use crate::domain::{shuffle_for_round, Result, SlotClock};
use crate::ports::{ActiveDelegateSource, DelegateRanking};
use async_trait::async_trait;
use dl_01_state::{AccountFilter, AccountStore};
use shared_types::PublicKey;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::trace;

/// Reads the active set from registered delegate accounts.
pub struct AccountStoreDelegates<S: AccountStore> {
    accounts: Arc<S>,
}

impl<S: AccountStore> AccountStoreDelegates<S> {
    pub fn new(accounts: Arc<S>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl<S: AccountStore> ActiveDelegateSource for AccountStoreDelegates<S> {
    async fn active_delegates(&self, limit: u64) -> Result<Vec<PublicKey>> {
        let mut delegates: Vec<(i64, PublicKey)> = self
            .accounts
            .get_all(&AccountFilter::Delegates)
            .await?
            .into_iter()
            .filter_map(|account| account.public_key.map(|key| (account.vote, key)))
            .collect();

        delegates.sort_by_key(|(vote, key)| (Reverse(*vote), *key));
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(delegates.into_iter().take(limit).map(|(_, key)| key).collect())
    }
}

/// Active set shuffled with the round seed.
pub struct ShuffledRanking<D: ActiveDelegateSource> {
    source: D,
    clock: SlotClock,
}

impl<D: ActiveDelegateSource> ShuffledRanking<D> {
    pub fn new(source: D, clock: SlotClock) -> Self {
        Self { source, clock }
    }
}

#[async_trait]
impl<D: ActiveDelegateSource> DelegateRanking for ShuffledRanking<D> {
    async fn ranking_for_height(&self, height: u64) -> Result<Vec<PublicKey>> {
        let limit = self.clock.num_delegates(Some(height));
        let round = self.clock.round_of(height);
        let active = self.source.active_delegates(limit).await?;
        trace!(height, round, delegates = active.len(), "Ranking delegates");
        Ok(shuffle_for_round(round, active))
    }
}
