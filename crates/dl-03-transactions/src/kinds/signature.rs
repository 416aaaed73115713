use super::{record, KindContext};
use crate::domain::{BlockTag, Result, TransactionError};
use dl_01_state::tables;
use serde_json::json;
use shared_types::{Account, AccountDiff, LedgerOp, SecondSignatureAsset, Transaction, TransactionId};

pub(super) fn verify(tx: &Transaction, _asset: &SecondSignatureAsset) -> Result<()> {
    if !tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
    }
    Ok(())
}

pub(super) async fn apply(
    cx: &KindContext<'_>,
    asset: &SecondSignatureAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        second_signature: Some(true),
        u_second_signature: Some(false),
        second_public_key: Some(Some(asset.public_key)),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn undo(
    cx: &KindContext<'_>,
    _asset: &SecondSignatureAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        second_signature: Some(false),
        u_second_signature: Some(true),
        second_public_key: Some(None),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn apply_unconfirmed(
    cx: &KindContext<'_>,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    if sender.second_signature || sender.u_second_signature {
        return Err(TransactionError::SecondSignatureExists);
    }
    let diff = AccountDiff {
        u_second_signature: Some(true),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) async fn undo_unconfirmed(
    cx: &KindContext<'_>,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        u_second_signature: Some(false),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) fn db_save(id: TransactionId, asset: &SecondSignatureAsset) -> LedgerOp {
    record(
        tables::SIGNATURES,
        id,
        json!({ "publicKey": asset.public_key.to_hex() }),
    )
}
