//! # Ledger Mutation Descriptions
//!
//! Every state change the ledger core makes is described by a [`LedgerOp`].
//! The storage layer applies a batch of ops atomically and may group
//! consecutive ops of the same entity and kind ([`OpBatch::grouped`]), but
//! never reorders across groups.

use crate::account::AccountDiff;
use crate::ids::{Address, BlockId, PublicKey};
use serde::Serialize;

/// One vote-weight delta recorded against a delegate for a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundVote {
    /// Voter account whose balance moved.
    pub address: Address,
    /// Signed delta in base units.
    pub amount: i64,
    /// Delegate receiving the weight change.
    pub delegate: PublicKey,
    pub block_id: Option<BlockId>,
    pub round: u64,
}

/// Storage mutation description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum LedgerOp {
    /// Insert an account row if absent.
    CreateAccount {
        address: Address,
        public_key: Option<PublicKey>,
    },
    /// Apply a diff to an account row.
    MergeAccount { address: Address, diff: AccountDiff },
    /// Append to the round-vote table.
    RecordRoundVote(RoundVote),
    /// Fold the round-vote table for `round` into delegate vote weights.
    UpdateVotes { round: u64 },
    /// Bump (or, backwards, drop) missed-block counters.
    UpdateMissedBlocks {
        outsiders: Vec<Address>,
        backwards: bool,
    },
    /// Drop round-vote entries for `round`.
    FlushRound { round: u64 },
    /// Capture the round-vote table.
    SnapshotRound,
    /// Capture delegate vote weights.
    SnapshotVotes,
    /// Replace the round-vote table with its snapshot.
    RestoreRoundSnapshot,
    /// Replace delegate vote weights with their snapshot.
    RestoreVotesSnapshot,
    /// Reset the back-reference of every account touched by `block_id`.
    MarkBlockId { block_id: BlockId },
    /// Delete blocks above `height`.
    TruncateBlocks { height: u64 },
    /// Insert a type-specific row (e.g. a delegate registration).
    Insert {
        table: &'static str,
        row: serde_json::Value,
    },
}

/// Target entity of an op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpEntity {
    Accounts,
    RoundVotes,
    Snapshots,
    Blocks,
    Table(&'static str),
}

/// Kind of mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Create,
    Update,
    Insert,
    Remove,
    Custom,
}

impl LedgerOp {
    /// Entity this op writes to.
    pub fn entity(&self) -> OpEntity {
        match self {
            LedgerOp::CreateAccount { .. }
            | LedgerOp::MergeAccount { .. }
            | LedgerOp::UpdateVotes { .. }
            | LedgerOp::UpdateMissedBlocks { .. }
            | LedgerOp::MarkBlockId { .. }
            | LedgerOp::RestoreVotesSnapshot => OpEntity::Accounts,
            LedgerOp::RecordRoundVote(_) | LedgerOp::FlushRound { .. } => OpEntity::RoundVotes,
            LedgerOp::SnapshotRound
            | LedgerOp::SnapshotVotes
            | LedgerOp::RestoreRoundSnapshot => OpEntity::Snapshots,
            LedgerOp::TruncateBlocks { .. } => OpEntity::Blocks,
            LedgerOp::Insert { table, .. } => OpEntity::Table(table),
        }
    }

    /// Mutation kind.
    pub fn kind(&self) -> OpKind {
        match self {
            LedgerOp::CreateAccount { .. } => OpKind::Create,
            LedgerOp::MergeAccount { .. } => OpKind::Update,
            LedgerOp::RecordRoundVote(_) | LedgerOp::Insert { .. } => OpKind::Insert,
            LedgerOp::FlushRound { .. } | LedgerOp::TruncateBlocks { .. } => OpKind::Remove,
            _ => OpKind::Custom,
        }
    }
}

/// A run of consecutive ops sharing entity and kind.
#[derive(Debug, PartialEq, Eq)]
pub struct OpGroup<'a> {
    pub entity: OpEntity,
    pub kind: OpKind,
    pub ops: &'a [LedgerOp],
}

/// Ordered list of ops committed as one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OpBatch(Vec<LedgerOp>);

impl OpBatch {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, op: LedgerOp) {
        self.0.push(op);
    }

    pub fn extend<I: IntoIterator<Item = LedgerOp>>(&mut self, ops: I) {
        self.0.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ops(&self) -> &[LedgerOp] {
        &self.0
    }

    pub fn into_ops(self) -> Vec<LedgerOp> {
        self.0
    }

    /// Split into runs of consecutive ops with the same entity and kind.
    ///
    /// Custom ops are never grouped with each other: each carries its own
    /// statement and their relative order matters.
    pub fn grouped(&self) -> Vec<OpGroup<'_>> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.0.len() {
            let boundary = i == self.0.len() || {
                let (prev, cur) = (&self.0[i - 1], &self.0[i]);
                prev.kind() == OpKind::Custom
                    || prev.entity() != cur.entity()
                    || prev.kind() != cur.kind()
            };
            if boundary {
                let first = &self.0[start];
                groups.push(OpGroup {
                    entity: first.entity(),
                    kind: first.kind(),
                    ops: &self.0[start..i],
                });
                start = i;
            }
        }
        groups
    }
}

impl From<Vec<LedgerOp>> for OpBatch {
    fn from(ops: Vec<LedgerOp>) -> Self {
        Self(ops)
    }
}

impl IntoIterator for OpBatch {
    type Item = LedgerOp;
    type IntoIter = std::vec::IntoIter<LedgerOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
