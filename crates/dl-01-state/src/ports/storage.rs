//! Driven ports: everything the ledger core reads from or writes to storage.

use crate::domain::{AccountFilter, Dapp, RoundSummary, StateResult};
use async_trait::async_trait;
use std::ops::RangeInclusive;
use shared_types::{
    Account, AccountDiff, Address, Block, LedgerOp, OpBatch, PublicKey, TransactionId,
};

/// Account table.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// First account matching `filter`.
    async fn get(&self, filter: &AccountFilter) -> StateResult<Option<Account>>;

    /// Every account matching `filter`.
    async fn get_all(&self, filter: &AccountFilter) -> StateResult<Vec<Account>>;

    /// Apply `diff` to the account at `address`, creating it if needed.
    ///
    /// The change is visible to the next read as soon as this returns. The
    /// returned ops describe what was done, for the durable log; they must
    /// not be committed again.
    async fn merge(&self, address: Address, diff: &AccountDiff) -> StateResult<Vec<LedgerOp>>;

    /// Create the account if absent, set its public key if not yet known,
    /// and return it.
    async fn set_and_get(
        &self,
        address: Address,
        public_key: Option<PublicKey>,
    ) -> StateResult<Account>;
}

/// Atomic application of op batches.
#[async_trait]
pub trait StorageTransaction: Send + Sync {
    /// Apply every op in order, or none of them.
    async fn commit(&self, batch: OpBatch) -> StateResult<()>;
}

/// Round aggregates.
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Sum fees, rewards and generators of the stored blocks at `heights`,
    /// the span of one round.
    async fn sum_round(&self, heights: RangeInclusive<u64>) -> StateResult<RoundSummary>;
}

/// Block table.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Chain tip.
    async fn last_block(&self) -> StateResult<Option<Block>>;

    async fn block_at_height(&self, height: u64) -> StateResult<Option<Block>>;

    /// Append a block at the next height.
    async fn append_block(&self, block: Block) -> StateResult<()>;

    /// Remove and return the chain tip.
    async fn pop_block(&self) -> StateResult<Block>;
}

/// Confirmed transaction lookups.
#[async_trait]
pub trait TransactionIndex: Send + Sync {
    /// `true` when a stored block contains `id`.
    async fn transaction_exists(&self, id: TransactionId) -> StateResult<bool>;

    /// `true` when a confirmed out-transfer already withdrew `source`.
    async fn out_transfer_exists(&self, source: TransactionId) -> StateResult<bool>;
}

/// Registered dapps.
#[async_trait]
pub trait DappRegistry: Send + Sync {
    async fn dapp(&self, id: TransactionId) -> StateResult<Option<Dapp>>;
}
