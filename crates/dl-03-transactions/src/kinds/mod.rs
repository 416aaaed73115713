//! Per-kind transaction logic.
//!
//! Every supported kind is a variant of [`TransactionAsset`]; the functions
//! here dispatch on it exhaustively, so a new kind cannot be added without
//! fees, verification, application and persistence.

mod delegate;
mod multisignature;
mod send;
mod signature;
mod transfer;
mod vote;

use crate::domain::{BlockTag, FeeTable, PendingRegistry, Result};
use crate::ports::LedgerPorts;
use dl_01_state::tables;
use shared_types::{
    Account, AccountDiff, Address, Amount, LedgerOp, PublicKey, Transaction, TransactionAsset,
    TransactionId,
};

/// What a kind hook may touch.
pub(crate) struct KindContext<'a> {
    pub ports: &'a LedgerPorts,
    pub pending: &'a PendingRegistry,
}

impl KindContext<'_> {
    /// Move both balance tracks of `address` by `delta`, creating the
    /// account if needed.
    async fn transfer(
        &self,
        address: Address,
        public_key: Option<PublicKey>,
        delta: i64,
        tag: BlockTag,
    ) -> Result<Vec<LedgerOp>> {
        self.ports.accounts.set_and_get(address, public_key).await?;
        let diff = tag.apply(AccountDiff {
            balance: delta,
            u_balance: delta,
            ..AccountDiff::default()
        });
        Ok(self.ports.accounts.merge(address, &diff).await?)
    }

    async fn merge(&self, address: Address, diff: AccountDiff) -> Result<Vec<LedgerOp>> {
        Ok(self.ports.accounts.merge(address, &diff).await?)
    }
}

/// Fee for `tx` under `table`.
pub(crate) fn calculate_fee(tx: &Transaction, table: &FeeTable) -> Result<Amount> {
    let base = table.base(tx.transaction_type());
    match &tx.asset {
        TransactionAsset::Multisignature(asset) => {
            Ok(base.checked_mul(asset.keysgroup.len() as u64 + 1)?)
        }
        _ => Ok(base),
    }
}

/// `true` when enough cosignatures are present.
pub(crate) fn ready(tx: &Transaction, sender: &Account) -> bool {
    match &tx.asset {
        TransactionAsset::Multisignature(asset) if !sender.is_multisig() => {
            tx.signatures.len() == asset.keysgroup.len()
        }
        _ if sender.is_multisig() => tx.signatures.len() >= usize::from(sender.multimin),
        _ => true,
    }
}

pub(crate) async fn verify(cx: &KindContext<'_>, tx: &Transaction, sender: &Account) -> Result<()> {
    match &tx.asset {
        TransactionAsset::Send => send::verify(tx),
        TransactionAsset::SecondSignature(asset) => signature::verify(tx, asset),
        TransactionAsset::Delegate(asset) => delegate::verify(cx, tx, asset, sender).await,
        TransactionAsset::Vote(votes) => vote::verify(cx, tx, votes, sender).await,
        TransactionAsset::Multisignature(asset) => multisignature::verify(tx, asset, sender),
        TransactionAsset::InTransfer(asset) => transfer::verify_in(cx, tx, asset).await,
        TransactionAsset::OutTransfer(asset) => transfer::verify_out(cx, tx, asset).await,
    }
}

pub(crate) async fn apply(
    cx: &KindContext<'_>,
    tx: &Transaction,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    match &tx.asset {
        TransactionAsset::Send => send::apply(cx, tx, tag).await,
        TransactionAsset::SecondSignature(asset) => signature::apply(cx, asset, tag, sender).await,
        TransactionAsset::Delegate(asset) => delegate::apply(cx, asset, tag, sender).await,
        TransactionAsset::Vote(votes) => vote::apply(cx, votes, tag, sender).await,
        TransactionAsset::Multisignature(asset) => {
            multisignature::apply(cx, asset, tag, sender).await
        }
        TransactionAsset::InTransfer(asset) => transfer::apply_in(cx, tx, asset, tag).await,
        TransactionAsset::OutTransfer(asset) => transfer::apply_out(cx, tx, asset, tag).await,
    }
}

pub(crate) async fn undo(
    cx: &KindContext<'_>,
    tx: &Transaction,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    match &tx.asset {
        TransactionAsset::Send => send::undo(cx, tx, tag).await,
        TransactionAsset::SecondSignature(asset) => signature::undo(cx, asset, tag, sender).await,
        TransactionAsset::Delegate(asset) => delegate::undo(cx, asset, tag, sender).await,
        TransactionAsset::Vote(votes) => vote::undo(cx, votes, tag, sender).await,
        TransactionAsset::Multisignature(asset) => {
            multisignature::undo(cx, asset, tag, sender).await
        }
        TransactionAsset::InTransfer(asset) => transfer::undo_in(cx, tx, asset, tag).await,
        TransactionAsset::OutTransfer(asset) => transfer::undo_out(cx, tx, asset, tag).await,
    }
}

pub(crate) async fn apply_unconfirmed(
    cx: &KindContext<'_>,
    tx: &Transaction,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    match &tx.asset {
        TransactionAsset::Send | TransactionAsset::InTransfer(_) => Ok(Vec::new()),
        TransactionAsset::SecondSignature(_) => signature::apply_unconfirmed(cx, sender).await,
        TransactionAsset::Delegate(asset) => delegate::apply_unconfirmed(cx, asset, sender).await,
        TransactionAsset::Vote(votes) => vote::apply_unconfirmed(cx, votes, sender).await,
        TransactionAsset::Multisignature(asset) => {
            multisignature::apply_unconfirmed(cx, asset, sender).await
        }
        TransactionAsset::OutTransfer(asset) => transfer::apply_unconfirmed_out(cx, asset),
    }
}

pub(crate) async fn undo_unconfirmed(
    cx: &KindContext<'_>,
    tx: &Transaction,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    match &tx.asset {
        TransactionAsset::Send | TransactionAsset::InTransfer(_) => Ok(Vec::new()),
        TransactionAsset::SecondSignature(_) => signature::undo_unconfirmed(cx, sender).await,
        TransactionAsset::Delegate(_) => delegate::undo_unconfirmed(cx, sender).await,
        TransactionAsset::Vote(votes) => vote::undo_unconfirmed(cx, votes, sender).await,
        TransactionAsset::Multisignature(asset) => {
            multisignature::undo_unconfirmed(cx, asset, sender).await
        }
        TransactionAsset::OutTransfer(asset) => transfer::undo_unconfirmed_out(cx, asset),
    }
}

/// Type-specific record row, if the kind has one.
pub(crate) fn db_save(tx: &Transaction) -> Option<LedgerOp> {
    let id = tx.id.unwrap_or_else(|| tx.compute_id());
    match &tx.asset {
        TransactionAsset::Send => None,
        TransactionAsset::SecondSignature(asset) => Some(signature::db_save(id, asset)),
        TransactionAsset::Delegate(asset) => Some(delegate::db_save(id, asset)),
        TransactionAsset::Vote(votes) => Some(vote::db_save(id, votes)),
        TransactionAsset::Multisignature(asset) => Some(multisignature::db_save(id, asset)),
        TransactionAsset::InTransfer(asset) => Some(transfer::db_save_in(id, asset)),
        TransactionAsset::OutTransfer(asset) => Some(transfer::db_save_out(id, asset)),
    }
}

/// Record row for `table`, keyed by the transaction id.
fn record(table: &'static str, id: TransactionId, mut row: serde_json::Value) -> LedgerOp {
    if let Some(fields) = row.as_object_mut() {
        fields.insert(tables::TRANSACTION_ID.to_string(), id.to_string().into());
    }
    LedgerOp::Insert { table, row }
}

/// Concatenated `+key`/`-key` entries, as stored in record tables.
fn joined(changes: &[shared_types::KeyChange]) -> String {
    changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
