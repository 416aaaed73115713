use super::{joined, record, KindContext};
use crate::domain::{signing, BlockTag, Result, TransactionError};
use dl_01_state::tables;
use serde_json::json;
use shared_types::constants::{
    MULTISIG_MAX_KEYS, MULTISIG_MAX_LIFETIME, MULTISIG_MIN_KEYS, MULTISIG_MIN_LIFETIME,
};
use shared_types::{
    Account, AccountDiff, Address, KeyChange, LedgerOp, MultisignatureAsset, Transaction,
    TransactionId,
};
use std::collections::HashSet;

pub(super) fn verify(
    tx: &Transaction,
    asset: &MultisignatureAsset,
    sender: &Account,
) -> Result<()> {
    let invalid = |reason: &str| Err(TransactionError::InvalidMultisigConfig(reason.to_string()));

    if !tx.amount.is_zero() {
        return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
    }
    if asset.keysgroup.is_empty() {
        return invalid("Invalid multisignature keysgroup. Must not be empty");
    }
    if asset.keysgroup.len() > usize::from(MULTISIG_MAX_KEYS) {
        return invalid("Invalid multisignature keysgroup. Must contain at most 15 keys");
    }
    if !(MULTISIG_MIN_KEYS..=MULTISIG_MAX_KEYS).contains(&asset.min) {
        return invalid("Invalid multisignature min. Must be between 1 and 15");
    }
    if usize::from(asset.min) > asset.keysgroup.len() {
        return invalid("Invalid multisignature min. Must not exceed keysgroup size");
    }
    if !(MULTISIG_MIN_LIFETIME..=MULTISIG_MAX_LIFETIME).contains(&asset.lifetime) {
        return invalid("Invalid multisignature lifetime. Must be between 1 and 72");
    }
    if sender.is_multisig() {
        return Err(TransactionError::MultisigAlreadyEnabled);
    }
    if !super::ready(tx, sender) {
        return invalid("Every keysgroup member must sign the registration");
    }

    let mut seen = HashSet::with_capacity(asset.keysgroup.len());
    for change in &asset.keysgroup {
        let KeyChange::Add(key) = change else {
            return invalid("Invalid math operator in multisignature keysgroup");
        };
        if *key == tx.sender_public_key {
            return invalid("Invalid multisignature keysgroup. Can not contain sender");
        }
        if !seen.insert(*key) {
            return invalid("Encountered duplicate public key in multisignature keysgroup");
        }
        let signed = tx
            .signatures
            .iter()
            .any(|signature| signing::verify_signature(tx, key, signature));
        if !signed {
            return invalid("Failed to verify signature in multisignature keysgroup");
        }
    }
    Ok(())
}

pub(super) async fn apply(
    cx: &KindContext<'_>,
    asset: &MultisignatureAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    cx.pending.end_multisig(sender.address);

    let diff = AccountDiff {
        multisignatures: asset.keysgroup.clone(),
        multimin: i16::from(asset.min),
        multilifetime: i16::from(asset.lifetime),
        ..AccountDiff::default()
    };
    let ops = cx.merge(sender.address, tag.apply(diff)).await?;

    for change in &asset.keysgroup {
        let key = *change.key();
        cx.ports
            .accounts
            .set_and_get(Address::from_public_key(&key), Some(key))
            .await?;
    }
    Ok(ops)
}

pub(super) async fn undo(
    cx: &KindContext<'_>,
    asset: &MultisignatureAsset,
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        multisignatures: asset.keysgroup.iter().map(KeyChange::inverted).collect(),
        multimin: -i16::from(asset.min),
        multilifetime: -i16::from(asset.lifetime),
        ..AccountDiff::default()
    };
    let ops = cx.merge(sender.address, tag.apply(diff)).await?;
    cx.pending.begin_multisig(sender.address);
    Ok(ops)
}

pub(super) async fn apply_unconfirmed(
    cx: &KindContext<'_>,
    asset: &MultisignatureAsset,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    if !sender.u_multisignatures.is_empty() {
        return Err(TransactionError::MultisigAlreadyEnabled);
    }
    if !cx.pending.begin_multisig(sender.address) {
        return Err(TransactionError::MultisigPending(sender.address));
    }

    let diff = AccountDiff {
        u_multisignatures: asset.keysgroup.clone(),
        u_multimin: i16::from(asset.min),
        u_multilifetime: i16::from(asset.lifetime),
        ..AccountDiff::default()
    };
    match cx.merge(sender.address, diff).await {
        Ok(ops) => Ok(ops),
        Err(e) => {
            cx.pending.end_multisig(sender.address);
            Err(e)
        }
    }
}

pub(super) async fn undo_unconfirmed(
    cx: &KindContext<'_>,
    asset: &MultisignatureAsset,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    cx.pending.end_multisig(sender.address);
    let diff = AccountDiff {
        u_multisignatures: asset.keysgroup.iter().map(KeyChange::inverted).collect(),
        u_multimin: -i16::from(asset.min),
        u_multilifetime: -i16::from(asset.lifetime),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) fn db_save(id: TransactionId, asset: &MultisignatureAsset) -> LedgerOp {
    record(
        tables::MULTISIGNATURES,
        id,
        json!({
            "min": asset.min,
            "lifetime": asset.lifetime,
            "keysgroup": joined(&asset.keysgroup),
        }),
    )
}
