use super::KindContext;
use crate::domain::{BlockTag, Result, TransactionError};
use shared_types::{Address, LedgerOp, Transaction};

pub(super) fn verify(tx: &Transaction) -> Result<()> {
    recipient(tx)?;
    if tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
    }
    Ok(())
}

pub(super) async fn apply(
    cx: &KindContext<'_>,
    tx: &Transaction,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    cx.transfer(recipient(tx)?, None, tx.amount.as_delta()?, tag)
        .await
}

pub(super) async fn undo(
    cx: &KindContext<'_>,
    tx: &Transaction,
    tag: BlockTag,
) -> Result<Vec<LedgerOp>> {
    cx.transfer(recipient(tx)?, None, tx.amount.as_negative_delta()?, tag)
        .await
}

fn recipient(tx: &Transaction) -> Result<Address> {
    tx.recipient_id
        .ok_or_else(|| TransactionError::InvalidRecipient("missing recipient".into()))
}
