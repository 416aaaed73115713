//! # Transaction Applier
//!
//! Applies and undoes the balance and type-specific effects of a
//! transaction on either the confirmed or the unconfirmed track.
//!
//! The balance change is merged first. If the type-specific hook then
//! fails, the balance change is reversed before the hook's error is
//! returned, so a failed application leaves no net balance change.

use super::TransactionLogic;
use crate::domain::{BlockTag, Result, TransactionError};
use crate::kinds;
use shared_types::{Account, AccountDiff, BalanceTrack, Block, LedgerOp, Transaction};
use std::sync::Arc;
use tracing::error;

/// Confirmed and unconfirmed application of transactions.
#[derive(Clone)]
pub struct TransactionApplier {
    logic: Arc<TransactionLogic>,
}

impl TransactionApplier {
    pub fn new(logic: Arc<TransactionLogic>) -> Self {
        Self { logic }
    }

    fn tag(&self, block: &Block) -> BlockTag {
        BlockTag {
            block_id: block.id,
            round: self.logic.clock().round_of(block.height),
        }
    }

    /// Apply `tx` as part of `block`.
    #[tracing::instrument(skip(self, tx, block, sender), fields(id = ?tx.id, height = block.height))]
    pub async fn apply_confirmed(
        &self,
        tx: &Transaction,
        block: &Block,
        sender: &Account,
    ) -> Result<Vec<LedgerOp>> {
        let id = tx.id.unwrap_or_else(|| tx.compute_id());
        if !self.logic.ready(tx, sender) {
            return Err(TransactionError::NotReady(id));
        }

        let total = tx.total()?;
        self.ensure_funds(tx, sender, BalanceTrack::Confirmed)?;

        let tag = self.tag(block);
        let debit = tag.apply(BalanceTrack::Confirmed.diff(total.as_negative_delta()?));
        let credit = tag.apply(BalanceTrack::Confirmed.diff(total.as_delta()?));

        let mut ops = self.merge(sender, &debit).await?;
        match kinds::apply(&self.logic.kind_context(), tx, tag, sender).await {
            Ok(more) => {
                ops.extend(more);
                Ok(ops)
            }
            Err(e) => {
                self.reverse(sender, &credit, "apply_confirmed").await;
                Err(e)
            }
        }
    }

    /// Undo `tx` as part of rolling back `block`.
    #[tracing::instrument(skip(self, tx, block, sender), fields(id = ?tx.id, height = block.height))]
    pub async fn undo_confirmed(
        &self,
        tx: &Transaction,
        block: &Block,
        sender: &Account,
    ) -> Result<Vec<LedgerOp>> {
        let total = tx.total()?;
        let tag = self.tag(block);
        let credit = tag.apply(BalanceTrack::Confirmed.diff(total.as_delta()?));
        let debit = tag.apply(BalanceTrack::Confirmed.diff(total.as_negative_delta()?));

        let mut ops = self.merge(sender, &credit).await?;
        match kinds::undo(&self.logic.kind_context(), tx, tag, sender).await {
            Ok(more) => {
                ops.extend(more);
                Ok(ops)
            }
            Err(e) => {
                self.reverse(sender, &debit, "undo_confirmed").await;
                Err(e)
            }
        }
    }

    /// Apply `tx` to the pool track.
    #[tracing::instrument(skip(self, tx, sender), fields(id = ?tx.id))]
    pub async fn apply_unconfirmed(
        &self,
        tx: &Transaction,
        sender: &Account,
    ) -> Result<Vec<LedgerOp>> {
        let total = tx.total()?;
        self.ensure_funds(tx, sender, BalanceTrack::Unconfirmed)?;

        let debit = BalanceTrack::Unconfirmed.diff(total.as_negative_delta()?);
        let credit = BalanceTrack::Unconfirmed.diff(total.as_delta()?);

        let mut ops = self.merge(sender, &debit).await?;
        match kinds::apply_unconfirmed(&self.logic.kind_context(), tx, sender).await {
            Ok(more) => {
                ops.extend(more);
                Ok(ops)
            }
            Err(e) => {
                self.reverse(sender, &credit, "apply_unconfirmed").await;
                Err(e)
            }
        }
    }

    /// Undo `tx` on the pool track.
    #[tracing::instrument(skip(self, tx, sender), fields(id = ?tx.id))]
    pub async fn undo_unconfirmed(
        &self,
        tx: &Transaction,
        sender: &Account,
    ) -> Result<Vec<LedgerOp>> {
        let total = tx.total()?;
        let credit = BalanceTrack::Unconfirmed.diff(total.as_delta()?);
        let debit = BalanceTrack::Unconfirmed.diff(total.as_negative_delta()?);

        let mut ops = self.merge(sender, &credit).await?;
        match kinds::undo_unconfirmed(&self.logic.kind_context(), tx, sender).await {
            Ok(more) => {
                ops.extend(more);
                Ok(ops)
            }
            Err(e) => {
                self.reverse(sender, &debit, "undo_unconfirmed").await;
                Err(e)
            }
        }
    }

    fn ensure_funds(&self, tx: &Transaction, sender: &Account, track: BalanceTrack) -> Result<()> {
        let check = self.logic.check_balance(tx.total()?, track, tx, sender);
        if check.exceeded {
            return Err(TransactionError::InsufficientFunds {
                address: sender.address,
                balance: track.of(sender).to_human(),
            });
        }
        Ok(())
    }

    async fn merge(&self, sender: &Account, diff: &AccountDiff) -> Result<Vec<LedgerOp>> {
        Ok(self
            .logic
            .ports()
            .accounts
            .merge(sender.address, diff)
            .await?)
    }

    /// Reverse a balance change after a failed hook. A failure here leaves
    /// the account inconsistent and is logged as such.
    async fn reverse(&self, sender: &Account, diff: &AccountDiff, stage: &'static str) {
        if let Err(e) = self.merge(sender, diff).await {
            error!(
                address = %sender.address,
                stage,
                error = %e,
                "Failed to reverse balance change"
            );
        }
    }
}
