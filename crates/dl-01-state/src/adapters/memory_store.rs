//! In-memory implementation of every storage port.
//!
//! All tables live behind one lock. Batches are applied to a copy of the
//! tables that replaces the original only if every op succeeds.

use crate::domain::{tables, AccountFilter, Dapp, RoundSummary, StateError, StateResult};
use crate::ports::{
    AccountStore, BlockStore, DappRegistry, RoundStore, StorageTransaction, TransactionIndex,
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{
    plan_merge, Account, AccountDiff, Address, Amount, Block, BlockId, LedgerError,
    LedgerOp, OpBatch, PublicKey, RoundVote, TransactionId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;
use tracing::{debug, trace};

#[derive(Clone, Default)]
struct Tables {
    accounts: HashMap<Address, Account>,
    round_votes: Vec<RoundVote>,
    round_snapshot: Vec<RoundVote>,
    votes_snapshot: HashMap<Address, i64>,
    blocks: Vec<Block>,
    records: HashMap<&'static str, Vec<serde_json::Value>>,
    dapps: HashMap<TransactionId, Dapp>,
}

impl Tables {
    fn account_mut(&mut self, address: Address) -> &mut Account {
        self.accounts
            .entry(address)
            .or_insert_with(|| Account::new(address))
    }

    fn merge(&mut self, address: Address, diff: &AccountDiff) -> StateResult<Vec<LedgerOp>> {
        let existing = self.accounts.get(&address).cloned();
        let created = existing.is_none();
        let mut account = existing.unwrap_or_else(|| Account::new(address));

        let plan = plan_merge(&account, diff)?;
        let mut ops = plan.apply(&mut account);
        for op in &ops {
            if let LedgerOp::RecordRoundVote(vote) = op {
                self.round_votes.push(vote.clone());
            }
        }
        self.accounts.insert(address, account);

        if created {
            ops.insert(
                0,
                LedgerOp::CreateAccount {
                    address,
                    public_key: diff.public_key,
                },
            );
        }
        Ok(ops)
    }

    /// Apply one op; returns what to append to the journal.
    fn apply(&mut self, op: &LedgerOp) -> StateResult<Vec<LedgerOp>> {
        match op {
            LedgerOp::CreateAccount {
                address,
                public_key,
            } => {
                let account = self.account_mut(*address);
                if account.public_key.is_none() {
                    account.public_key = *public_key;
                }
            }
            LedgerOp::MergeAccount { address, diff } => return self.merge(*address, diff),
            LedgerOp::RecordRoundVote(vote) => self.round_votes.push(vote.clone()),
            LedgerOp::UpdateVotes { round } => self.update_votes(*round)?,
            LedgerOp::UpdateMissedBlocks {
                outsiders,
                backwards,
            } => {
                for address in outsiders {
                    let account = self.account_mut(*address);
                    let delta = if *backwards { -1 } else { 1 };
                    account.missed_blocks = account.missed_blocks.checked_add_signed(delta).ok_or(
                        LedgerError::NegativeCounter {
                            address: *address,
                            field: "missed_blocks",
                        },
                    )?;
                }
            }
            LedgerOp::FlushRound { round } => self.round_votes.retain(|v| v.round != *round),
            LedgerOp::SnapshotRound => self.round_snapshot = self.round_votes.clone(),
            LedgerOp::SnapshotVotes => {
                self.votes_snapshot = self
                    .accounts
                    .values()
                    .filter(|a| a.is_delegate)
                    .map(|a| (a.address, a.vote))
                    .collect();
            }
            LedgerOp::RestoreRoundSnapshot => self.round_votes = self.round_snapshot.clone(),
            LedgerOp::RestoreVotesSnapshot => {
                for (address, vote) in &self.votes_snapshot {
                    if let Some(account) = self.accounts.get_mut(address) {
                        account.vote = *vote;
                    }
                }
            }
            LedgerOp::MarkBlockId { block_id } => {
                for account in self.accounts.values_mut() {
                    if account.block_id == Some(*block_id) {
                        account.block_id = Some(BlockId::ZERO);
                    }
                }
            }
            LedgerOp::TruncateBlocks { height } => {
                let removed: Vec<Block> = self
                    .blocks
                    .iter()
                    .filter(|b| b.height > *height)
                    .cloned()
                    .collect();
                self.blocks.retain(|b| b.height <= *height);
                for block in &removed {
                    self.drop_records_of(block);
                }
            }
            LedgerOp::Insert { table, row } => {
                self.records.entry(*table).or_default().push(row.clone());
            }
        }
        Ok(vec![op.clone()])
    }

    fn update_votes(&mut self, round: u64) -> StateResult<()> {
        let mut sums: BTreeMap<PublicKey, i64> = BTreeMap::new();
        for vote in self.round_votes.iter().filter(|v| v.round == round) {
            let sum = sums.entry(vote.delegate).or_insert(0);
            *sum = sum
                .checked_add(vote.amount)
                .ok_or_else(|| LedgerError::Overflow(format!("votes of {}", vote.delegate)))?;
        }
        for (delegate, amount) in sums {
            let account = self.account_mut(Address::from_public_key(&delegate));
            account.vote = account
                .vote
                .checked_add(amount)
                .ok_or_else(|| LedgerError::Overflow(format!("vote of {}", delegate)))?;
        }
        Ok(())
    }

    fn drop_records_of(&mut self, block: &Block) {
        let ids: HashSet<String> = block
            .transactions
            .iter()
            .filter_map(|tx| tx.id)
            .map(|id| id.to_string())
            .collect();
        if ids.is_empty() {
            return;
        }
        for rows in self.records.values_mut() {
            rows.retain(|row| {
                row.get(tables::TRANSACTION_ID)
                    .and_then(|v| v.as_str())
                    .map_or(true, |id| !ids.contains(id))
            });
        }
    }
}

/// In-memory ledger storage.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    journal: Mutex<Vec<LedgerOp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account row directly (bootstrap and tests).
    pub fn insert_account(&self, account: Account) {
        self.tables.write().accounts.insert(account.address, account);
    }

    /// Register a dapp.
    pub fn register_dapp(&self, dapp: Dapp) {
        self.tables.write().dapps.insert(dapp.id, dapp);
    }

    /// Account at `address`, if any.
    pub fn account(&self, address: Address) -> Option<Account> {
        self.tables.read().accounts.get(&address).cloned()
    }

    /// Current round-vote entries.
    pub fn round_votes(&self) -> Vec<RoundVote> {
        self.tables.read().round_votes.clone()
    }

    /// Rows of a record table.
    pub fn records(&self, table: &str) -> Vec<serde_json::Value> {
        self.tables
            .read()
            .records
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every op applied so far, in order.
    pub fn journal(&self) -> Vec<LedgerOp> {
        self.journal.lock().clone()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, filter: &AccountFilter) -> StateResult<Option<Account>> {
        let tables = self.tables.read();
        let found = match filter {
            AccountFilter::Address(address) => tables.accounts.get(address).cloned(),
            AccountFilter::PublicKey(key) => tables
                .accounts
                .get(&Address::from_public_key(key))
                .filter(|a| filter.matches(a))
                .cloned(),
            _ => tables.accounts.values().find(|a| filter.matches(a)).cloned(),
        };
        Ok(found)
    }

    async fn get_all(&self, filter: &AccountFilter) -> StateResult<Vec<Account>> {
        let tables = self.tables.read();
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.address);
        Ok(accounts)
    }

    async fn merge(&self, address: Address, diff: &AccountDiff) -> StateResult<Vec<LedgerOp>> {
        let ops = self.tables.write().merge(address, diff)?;
        trace!(%address, ops = ops.len(), "Account merged");
        self.journal.lock().extend(ops.iter().cloned());
        Ok(ops)
    }

    async fn set_and_get(
        &self,
        address: Address,
        public_key: Option<PublicKey>,
    ) -> StateResult<Account> {
        let mut tables = self.tables.write();
        let created = !tables.accounts.contains_key(&address);
        let account = tables.account_mut(address);
        if account.public_key.is_none() {
            account.public_key = public_key;
        }
        let account = account.clone();
        drop(tables);

        if created {
            self.journal.lock().push(LedgerOp::CreateAccount {
                address,
                public_key,
            });
        }
        Ok(account)
    }
}

#[async_trait]
impl StorageTransaction for MemoryStore {
    async fn commit(&self, batch: OpBatch) -> StateResult<()> {
        let mut tables = self.tables.write();
        let mut working = tables.clone();
        let mut applied = Vec::with_capacity(batch.len());

        for (index, op) in batch.ops().iter().enumerate() {
            let ops = working
                .apply(op)
                .map_err(|e| StateError::CommitFailed {
                    index,
                    reason: e.to_string(),
                })?;
            applied.extend(ops);
        }

        *tables = working;
        drop(tables);
        debug!(ops = batch.len(), "Batch committed");
        self.journal.lock().extend(applied);
        Ok(())
    }
}

#[async_trait]
impl RoundStore for MemoryStore {
    async fn sum_round(&self, heights: RangeInclusive<u64>) -> StateResult<RoundSummary> {
        let tables = self.tables.read();
        let mut summary = RoundSummary::default();
        for block in tables
            .blocks
            .iter()
            .filter(|b| heights.contains(&b.height))
        {
            summary.fees = summary.fees.checked_add(block.total_fee)?;
            summary.rewards.push(block.reward);
            summary.delegates.push(block.generator_public_key);
        }
        Ok(summary)
    }
}

#[async_trait]
impl BlockStore for MemoryStore {
    async fn last_block(&self) -> StateResult<Option<Block>> {
        Ok(self.tables.read().blocks.last().cloned())
    }

    async fn block_at_height(&self, height: u64) -> StateResult<Option<Block>> {
        let tables = self.tables.read();
        Ok(tables.blocks.iter().find(|b| b.height == height).cloned())
    }

    async fn append_block(&self, block: Block) -> StateResult<()> {
        let mut tables = self.tables.write();
        let expected = tables.blocks.last().map_or(1, |b| b.height + 1);
        if block.height != expected {
            return Err(StateError::InvalidHeight {
                expected,
                actual: block.height,
            });
        }
        tables.blocks.push(block);
        Ok(())
    }

    async fn pop_block(&self) -> StateResult<Block> {
        let mut tables = self.tables.write();
        let block = tables.blocks.pop().ok_or(StateError::EmptyChain)?;
        tables.drop_records_of(&block);
        Ok(block)
    }
}

#[async_trait]
impl TransactionIndex for MemoryStore {
    async fn transaction_exists(&self, id: TransactionId) -> StateResult<bool> {
        let tables = self.tables.read();
        Ok(tables
            .blocks
            .iter()
            .flat_map(|b| b.transactions.iter())
            .any(|tx| tx.id == Some(id)))
    }

    async fn out_transfer_exists(&self, source: TransactionId) -> StateResult<bool> {
        let state = self.tables.read();
        let source = source.to_string();
        Ok(state
            .records
            .get(tables::OUT_TRANSFER)
            .is_some_and(|rows| {
                rows.iter().any(|row| {
                    row.get(tables::OUT_TRANSACTION_ID).and_then(|v| v.as_str())
                        == Some(source.as_str())
                })
            }))
    }
}

#[async_trait]
impl DappRegistry for MemoryStore {
    async fn dapp(&self, id: TransactionId) -> StateResult<Option<Dapp>> {
        Ok(self.tables.read().dapps.get(&id).cloned())
    }
}

/// Sum of every confirmed balance; used to check supply conservation.
pub fn total_balance(accounts: &[Account]) -> Amount {
    accounts.iter().map(|a| a.balance).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::KeyChange;

    fn key(secret: &str) -> PublicKey {
        Ed25519KeyPair::from_secret(secret).unwrap().public_key()
    }

    fn credit(amount: i64) -> AccountDiff {
        AccountDiff {
            balance: amount,
            u_balance: amount,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_merge_creates_account_lazily() {
        let store = MemoryStore::new();
        let address = Address::new(42);

        let ops = store.merge(address, &credit(500)).await.unwrap();

        assert!(matches!(ops[0], LedgerOp::CreateAccount { .. }));
        let account = store.account(address).unwrap();
        assert_eq!(account.balance, Amount::new(500));
        assert_eq!(account.u_balance, Amount::new(500));
    }

    #[tokio::test]
    async fn test_failed_merge_leaves_no_trace() {
        let store = MemoryStore::new();
        let address = Address::new(7);

        assert!(store.merge(address, &credit(-1)).await.is_err());
        assert!(store.account(address).is_none());
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_public_key_requires_known_key() {
        let store = MemoryStore::new();
        let owner = key("owner");
        let address = Address::from_public_key(&owner);
        store.merge(address, &credit(10)).await.unwrap();

        let filter = AccountFilter::PublicKey(owner);
        assert!(store.get(&filter).await.unwrap().is_none());

        store.set_and_get(address, Some(owner)).await.unwrap();
        assert!(store.get(&filter).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_commit_is_atomic() {
        let store = MemoryStore::new();
        let address = Address::new(1);
        store.merge(address, &credit(100)).await.unwrap();

        let batch = OpBatch::from(vec![
            LedgerOp::MergeAccount {
                address,
                diff: credit(50),
            },
            LedgerOp::MergeAccount {
                address,
                diff: credit(-1_000),
            },
        ]);
        let err = store.commit(batch).await.unwrap_err();

        assert!(matches!(err, StateError::CommitFailed { index: 1, .. }));
        assert_eq!(store.account(address).unwrap().balance, Amount::new(100));
    }

    #[tokio::test]
    async fn test_update_votes_and_flush() {
        let store = MemoryStore::new();
        let delegate = key("delegate");
        let voter = Address::new(9);
        store.merge(voter, &credit(1_000)).await.unwrap();

        let vote = AccountDiff {
            delegates: vec![KeyChange::Add(delegate)],
            ..Default::default()
        }
        .in_block(BlockId::new(1), 1);
        store.merge(voter, &vote).await.unwrap();
        assert_eq!(store.round_votes().len(), 1);

        store
            .commit(OpBatch::from(vec![
                LedgerOp::UpdateVotes { round: 1 },
                LedgerOp::FlushRound { round: 1 },
            ]))
            .await
            .unwrap();

        let delegate_account = store.account(Address::from_public_key(&delegate)).unwrap();
        assert_eq!(delegate_account.vote, 1_000);
        assert!(store.round_votes().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_restore() {
        let store = MemoryStore::new();
        let delegate = key("delegate");
        let mut account = Account::with_public_key(delegate);
        account.is_delegate = true;
        account.vote = 77;
        store.insert_account(account.clone());

        store
            .commit(OpBatch::from(vec![LedgerOp::SnapshotVotes]))
            .await
            .unwrap();
        account.vote = 5;
        store.insert_account(account.clone());

        store
            .commit(OpBatch::from(vec![LedgerOp::RestoreVotesSnapshot]))
            .await
            .unwrap();
        assert_eq!(store.account(account.address).unwrap().vote, 77);
    }

    #[tokio::test]
    async fn test_mark_block_id_resets_back_reference() {
        let store = MemoryStore::new();
        let address = Address::new(3);
        store
            .merge(address, &credit(5).in_block(BlockId::new(88), 1))
            .await
            .unwrap();

        store
            .commit(OpBatch::from(vec![LedgerOp::MarkBlockId {
                block_id: BlockId::new(88),
            }]))
            .await
            .unwrap();

        assert_eq!(store.account(address).unwrap().block_id, Some(BlockId::ZERO));
    }

    #[tokio::test]
    async fn test_missed_blocks_cannot_go_negative() {
        let store = MemoryStore::new();
        let batch = OpBatch::from(vec![LedgerOp::UpdateMissedBlocks {
            outsiders: vec![Address::new(5)],
            backwards: true,
        }]);
        assert!(store.commit(batch).await.is_err());
    }

    #[tokio::test]
    async fn test_sum_round_covers_height_span() {
        let store = MemoryStore::new();
        let keypair = Ed25519KeyPair::from_secret("generator").unwrap();
        let genesis = Block::genesis(&keypair, Vec::new()).unwrap();
        store.append_block(genesis.clone()).await.unwrap();
        let second = Block::forge(
            &keypair,
            (&genesis).into(),
            10,
            Amount::coins(5),
            Vec::new(),
        )
        .unwrap();
        store.append_block(second).await.unwrap();

        let round_one = store.sum_round(1..=1).await.unwrap();
        assert_eq!(round_one.delegates, vec![keypair.public_key()]);
        assert_eq!(round_one.rewards, vec![Amount::ZERO]);

        let both = store.sum_round(1..=2).await.unwrap();
        assert_eq!(both.rewards, vec![Amount::ZERO, Amount::coins(5)]);

        let second_only = store.sum_round(2..=4).await.unwrap();
        assert_eq!(second_only.rewards, vec![Amount::coins(5)]);
    }

    #[tokio::test]
    async fn test_append_rejects_gap() {
        let store = MemoryStore::new();
        let keypair = Ed25519KeyPair::from_secret("generator").unwrap();
        let genesis = Block::genesis(&keypair, Vec::new()).unwrap();
        let orphan = Block::forge(
            &keypair,
            shared_types::ChainTip {
                id: genesis.id,
                height: 5,
                timestamp: 0,
            },
            10,
            Amount::ZERO,
            Vec::new(),
        )
        .unwrap();

        assert!(matches!(
            store.append_block(orphan).await,
            Err(StateError::InvalidHeight { expected: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_out_transfer_lookup() {
        let store = MemoryStore::new();
        store
            .commit(OpBatch::from(vec![LedgerOp::Insert {
                table: tables::OUT_TRANSFER,
                row: serde_json::json!({
                    "transactionId": "1",
                    "outTransactionId": "99",
                }),
            }]))
            .await
            .unwrap();

        assert!(store.out_transfer_exists(TransactionId::new(99)).await.unwrap());
        assert!(!store.out_transfer_exists(TransactionId::new(98)).await.unwrap());
    }
}
