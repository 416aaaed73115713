//! # Round Scope
//!
//! Everything known about one block boundary, and the ordered ops it
//! produces. Planning is pure: the controller gathers the round sum and
//! outsiders, then commits whatever [`RoundScope::ops`] returns as one
//! batch.
//!
//! Forward, on every block:
//!
//! ```text
//! produced_blocks(generator) += 1
//! [finishing]  UpdateVotes, UpdateMissedBlocks, FlushRound,
//!              distribution, UpdateVotes, FlushRound
//! [next block finishes]  SnapshotRound, SnapshotVotes
//! [snapshot round ends]   TruncateBlocks
//! ```
//!
//! Backward runs the same ops with inverted signs, then restores the
//! snapshots when finishing and clears the block back-reference.

use super::{RoundChanges, RoundError, Result};
use dl_01_state::RoundSummary;
use shared_types::{AccountDiff, Address, Amount, BlockId, LedgerOp, OpBatch, PublicKey};

/// Tick direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn is_backward(self) -> bool {
        self == Direction::Backward
    }

    fn signed(self, amount: Amount) -> Result<i64> {
        Ok(match self {
            Direction::Forward => amount.as_delta()?,
            Direction::Backward => amount.as_negative_delta()?,
        })
    }

    fn unit(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// `true` when applying the block at `height` closes its round.
pub fn finishes_round_forward(height: u64, round_of: impl Fn(u64) -> u64) -> bool {
    height == 1 || round_of(height) != round_of(height + 1)
}

/// `true` when removing the block at `height` (whose parent is at
/// `previous_height`) reopens a closed round.
pub fn finishes_round_backward(
    height: u64,
    previous_height: u64,
    round_of: impl Fn(u64) -> u64,
) -> bool {
    let round = round_of(height);
    height == 1 || (round_of(previous_height) == round && round_of(height + 1) != round)
}

/// The round sum used for the height-1 block: one zero-reward block by
/// the genesis generator, whatever the stored aggregate says.
pub fn bootstrap_summary(generator: PublicKey) -> RoundSummary {
    RoundSummary {
        fees: Amount::ZERO,
        rewards: vec![Amount::ZERO],
        delegates: vec![generator],
    }
}

/// One block boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundScope {
    pub block_id: BlockId,
    pub height: u64,
    pub generator: PublicKey,
    pub round: u64,
    pub direction: Direction,
    pub finish_round: bool,
    /// The next block closes the round; snapshots are taken on this one.
    pub snapshot_due: bool,
    /// Active set size at this height, the fee divisor.
    pub active_delegates: u64,
    /// Fees, rewards and generators of the round. Empty unless finishing.
    pub summary: RoundSummary,
    /// Scheduled delegates that forged nothing. Empty unless finishing.
    pub outsiders: Vec<Address>,
    pub snapshot_round: Option<u64>,
}

impl RoundScope {
    /// `true` when this forward tick closes the configured snapshot round.
    pub fn finishes_snapshot(&self) -> bool {
        self.direction == Direction::Forward
            && self.finish_round
            && self.snapshot_round == Some(self.round)
    }

    /// Ordered ops for this boundary.
    pub fn ops(&self) -> Result<OpBatch> {
        if self.active_delegates == 0 {
            return Err(RoundError::InvalidConfig("active delegates must be positive".into()));
        }
        let backwards = self.direction.is_backward();
        let mut batch = OpBatch::new();

        batch.push(self.merge(
            &self.generator,
            AccountDiff {
                produced_blocks: self.direction.unit(),
                ..AccountDiff::default()
            },
        ));

        if self.finish_round {
            batch.push(LedgerOp::UpdateVotes { round: self.round });
            if !self.outsiders.is_empty() {
                batch.push(LedgerOp::UpdateMissedBlocks {
                    outsiders: self.outsiders.clone(),
                    backwards,
                });
            }
            batch.push(LedgerOp::FlushRound { round: self.round });
            batch.extend(self.distribution()?);
            batch.push(LedgerOp::UpdateVotes { round: self.round });
            batch.push(LedgerOp::FlushRound { round: self.round });
        }

        match self.direction {
            Direction::Forward => {
                if self.snapshot_due {
                    batch.push(LedgerOp::SnapshotRound);
                    batch.push(LedgerOp::SnapshotVotes);
                }
                if self.finishes_snapshot() {
                    batch.push(LedgerOp::TruncateBlocks {
                        height: self.height,
                    });
                }
            }
            Direction::Backward => {
                if self.finish_round {
                    batch.push(LedgerOp::RestoreRoundSnapshot);
                    batch.push(LedgerOp::RestoreVotesSnapshot);
                }
                batch.push(LedgerOp::MarkBlockId {
                    block_id: self.block_id,
                });
            }
        }

        Ok(batch)
    }

    /// Fee and reward credits for every block of the round, plus the fee
    /// remainder for one delegate: the last generator going forward, which
    /// is the first once the lists are reversed for undo.
    fn distribution(&self) -> Result<Vec<LedgerOp>> {
        let mut delegates = self.summary.delegates.clone();
        let mut rewards = self.summary.rewards.clone();
        if self.direction.is_backward() {
            delegates.reverse();
            rewards.reverse();
        }

        let changes = RoundChanges::new(self.round, self.summary.fees, rewards, self.active_delegates)?;
        let mut ops = Vec::with_capacity(delegates.len() + 1);

        for (index, delegate) in delegates.iter().enumerate() {
            let share = changes.at(index)?;
            let balance = self.direction.signed(share.balance)?;
            ops.push(self.merge(
                delegate,
                AccountDiff {
                    balance,
                    u_balance: balance,
                    fees: self.direction.signed(share.fees)?,
                    rewards: self.direction.signed(share.rewards)?,
                    ..AccountDiff::default()
                },
            ));
        }

        let remaining = changes.fees_remaining();
        let receiver = match self.direction {
            Direction::Forward => delegates.last(),
            Direction::Backward => delegates.first(),
        };
        if let (false, Some(delegate)) = (remaining.is_zero(), receiver) {
            let amount = self.direction.signed(remaining)?;
            ops.push(self.merge(
                delegate,
                AccountDiff {
                    balance: amount,
                    u_balance: amount,
                    fees: amount,
                    ..AccountDiff::default()
                },
            ));
        }
        Ok(ops)
    }

    fn merge(&self, delegate: &PublicKey, diff: AccountDiff) -> LedgerOp {
        LedgerOp::MergeAccount {
            address: Address::from_public_key(delegate),
            diff: AccountDiff {
                public_key: Some(*delegate),
                ..diff
            }
            .in_block(self.block_id, self.round),
        }
    }
}
