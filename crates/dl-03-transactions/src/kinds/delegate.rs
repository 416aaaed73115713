use super::{record, KindContext};
use crate::domain::{BlockTag, Result, TransactionError};
use dl_01_state::{tables, AccountFilter};
use serde_json::json;
use shared_types::constants::MAX_USERNAME_LENGTH;
use shared_types::{Account, AccountDiff, DelegateAsset, LedgerOp, Transaction, TransactionId};

pub(super) async fn verify(
    cx: &KindContext<'_>,
    tx: &Transaction,
    asset: &DelegateAsset,
    sender: &Account,
) -> Result<()> {
    if tx.recipient_id.is_some() {
        return Err(TransactionError::InvalidRecipient(
            "delegate registration has no recipient".into(),
        ));
    }
    if !tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
    }
    if sender.is_delegate {
        return Err(TransactionError::AlreadyDelegate);
    }
    validate_username(&asset.username)?;

    let taken = cx
        .ports
        .accounts
        .get(&AccountFilter::Username(asset.username.clone()))
        .await?;
    if taken.is_some() {
        return Err(TransactionError::UsernameTaken(asset.username.clone()));
    }
    Ok(())
}

pub(super) async fn apply(
    cx: &KindContext<'_>,
    asset: &DelegateAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        is_delegate: Some(true),
        u_is_delegate: Some(false),
        username: Some(Some(asset.username.clone())),
        u_username: Some(None),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn undo(
    cx: &KindContext<'_>,
    asset: &DelegateAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        is_delegate: Some(false),
        u_is_delegate: Some(true),
        username: Some(None),
        u_username: Some(Some(asset.username.clone())),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn apply_unconfirmed(
    cx: &KindContext<'_>,
    asset: &DelegateAsset,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    if sender.is_delegate || sender.u_is_delegate {
        return Err(TransactionError::AlreadyDelegate);
    }
    let pending = cx
        .ports
        .accounts
        .get(&AccountFilter::UnconfirmedUsername(asset.username.clone()))
        .await?;
    if pending.is_some() {
        return Err(TransactionError::UsernameTaken(asset.username.clone()));
    }

    let diff = AccountDiff {
        u_is_delegate: Some(true),
        u_username: Some(Some(asset.username.clone())),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) async fn undo_unconfirmed(
    cx: &KindContext<'_>,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        u_is_delegate: Some(false),
        u_username: Some(None),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) fn db_save(id: TransactionId, asset: &DelegateAsset) -> LedgerOp {
    record(
        tables::DELEGATES,
        id,
        json!({ "username": asset.username }),
    )
}

/// Lowercase, at most 20 characters from `[a-z0-9!@$&_.]`, and not
/// something that parses as an address.
pub(crate) fn validate_username(username: &str) -> Result<()> {
    let invalid = |reason: &str| Err(TransactionError::InvalidUsername(reason.to_string()));

    if username.is_empty() {
        return invalid("Empty username");
    }
    if username != username.to_lowercase() {
        return invalid("Username must be lowercase");
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return invalid("Username is too long. Maximum is 20 characters");
    }
    if looks_like_address(username) {
        return invalid("Username can not be a potential address");
    }
    if !username
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"!@$&_.".contains(&b))
    {
        return invalid(
            "Username can only contain alphanumeric characters with the exception of !@$&_.",
        );
    }
    Ok(())
}

fn looks_like_address(username: &str) -> bool {
    username
        .strip_suffix(['l', 'L'])
        .is_some_and(|digits| {
            (1..=21).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        })
}
