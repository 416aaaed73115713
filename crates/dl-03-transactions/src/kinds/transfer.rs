//! Dapp in-transfers and out-transfers.

use super::{record, KindContext};
use crate::domain::{BlockTag, Result, TransactionError};
use dl_01_state::{tables, Dapp};
use serde_json::json;
use shared_types::{
    Address, InTransferAsset, LedgerOp, OutTransferAsset, Transaction, TransactionId,
};

async fn dapp(cx: &KindContext<'_>, id: TransactionId) -> Result<Dapp> {
    cx.ports
        .dapps
        .dapp(id)
        .await?
        .ok_or(TransactionError::DappNotFound(id))
}

fn positive_amount(tx: &Transaction) -> Result<()> {
    if tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
    }
    Ok(())
}

pub(super) async fn verify_in(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &InTransferAsset,
) -> Result<()> {
    if tx.recipient_id.is_some() {
        return Err(TransactionError::InvalidRecipient(
            "in-transfer has no recipient".into(),
        ));
    }
    positive_amount(tx)?;
    dapp(cx, asset.dapp_id).await?;
    Ok(())
}

pub(super) async fn apply_in(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &InTransferAsset,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    let author = dapp(cx, asset.dapp_id).await?.author;
    cx.transfer(
        Address::from_public_key(&author),
        Some(author),
        tx.amount.as_delta()?,
        tag,
    )
    .await
}

pub(super) async fn undo_in(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &InTransferAsset,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    let author = dapp(cx, asset.dapp_id).await?.author;
    cx.transfer(
        Address::from_public_key(&author),
        Some(author),
        tx.amount.as_negative_delta()?,
        tag,
    )
    .await
}

pub(super) fn db_save_in(id: TransactionId, asset: &InTransferAsset) -> LedgerOp {
    record(
        tables::IN_TRANSFER,
        id,
        json!({ "dappId": asset.dapp_id.to_string() }),
    )
}

pub(super) async fn verify_out(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &OutTransferAsset,
) -> Result<()> {
    if tx.recipient_id.is_none() {
        return Err(TransactionError::InvalidRecipient("missing recipient".into()));
    }
    positive_amount(tx)?;
    dapp(cx, asset.dapp_id).await?;

    if cx.pending.out_transfer_pending(asset.transaction_id) {
        return Err(TransactionError::OutTransferPending(asset.transaction_id));
    }
    if cx
        .ports
        .transactions
        .out_transfer_exists(asset.transaction_id)
        .await?
    {
        return Err(TransactionError::OutTransferConfirmed(asset.transaction_id));
    }
    Ok(())
}

pub(super) async fn apply_out(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &OutTransferAsset,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    let recipient = tx
        .recipient_id
        .ok_or_else(|| TransactionError::InvalidRecipient("missing recipient".into()))?;
    cx.pending.end_out_transfer(asset.transaction_id);
    cx.transfer(recipient, None, tx.amount.as_delta()?, tag).await
}

pub(super) async fn undo_out(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &OutTransferAsset,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    let recipient = tx
        .recipient_id
        .ok_or_else(|| TransactionError::InvalidRecipient("missing recipient".into()))?;
    let ops = cx
        .transfer(recipient, None, tx.amount.as_negative_delta()?, tag)
        .await?;
    cx.pending.begin_out_transfer(asset.transaction_id);
    Ok(ops)
}

pub(super) fn apply_unconfirmed_out(
    cx: &KindContext<'_>,
    asset: &OutTransferAsset,
) -> Result<Vec<LedgerOp>> {
    if !cx.pending.begin_out_transfer(asset.transaction_id) {
        return Err(TransactionError::OutTransferPending(asset.transaction_id));
    }
    Ok(Vec::new())
}

pub(super) fn undo_unconfirmed_out(
    cx: &KindContext<'_>,
    asset: &OutTransferAsset,
) -> Result<Vec<LedgerOp>> {
    cx.pending.end_out_transfer(asset.transaction_id);
    Ok(Vec::new())
}

pub(super) fn db_save_out(id: TransactionId, asset: &OutTransferAsset) -> LedgerOp {
    let mut row = serde_json::Map::new();
    row.insert("dappId".into(), asset.dapp_id.to_string().into());
    row.insert(
        tables::OUT_TRANSACTION_ID.into(),
        asset.transaction_id.to_string().into(),
    );
    record(tables::OUT_TRANSFER, id, row.into())
}
