//! # Transaction Validator
//!
//! Ordered verification. The first failing check wins, so the order below
//! is part of the contract: callers and peers see the same error for the
//! same invalid transaction.

use super::TransactionLogic;
use crate::domain::{Result, TransactionError};
use crate::kinds;
use shared_types::{
    Account, BalanceTrack, PublicKey, Transaction, TransactionAsset, TOTAL_AMOUNT,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Verifies transactions against sender state.
#[derive(Clone)]
pub struct TransactionValidator {
    logic: Arc<TransactionLogic>,
}

impl TransactionValidator {
    pub fn new(logic: Arc<TransactionLogic>) -> Self {
        Self { logic }
    }

    /// Run every check against `sender` (and `requester`, for multisignature
    /// proxies) at `height`.
    #[tracing::instrument(
        skip(self, tx, sender, requester),
        fields(kind = %tx.transaction_type(), id = ?tx.id)
    )]
    pub async fn verify(
        &self,
        tx: &Transaction,
        sender: Option<&Account>,
        requester: Option<&Account>,
        height: u64,
    ) -> Result<()> {
        let result = self.run_checks(tx, sender, requester, height).await;
        if let Err(e) = &result {
            debug!(error = %e, "Transaction rejected");
        }
        result
    }

    async fn run_checks(
        &self,
        tx: &Transaction,
        sender: Option<&Account>,
        requester: Option<&Account>,
        height: u64,
    ) -> Result<()> {
        let logic = &self.logic;
        let in_genesis = logic.in_genesis_block(tx);

        // The transaction type is closed; unknown tags fail in `decode`.
        let sender = sender.ok_or(TransactionError::MissingSender)?;

        match (&tx.requester_public_key, requester) {
            (None, _) => {
                if sender.second_signature && tx.sign_signature.is_none() && !in_genesis {
                    return Err(TransactionError::MissingSecondSignature);
                }
                if !sender.second_signature && tx.sign_signature.is_some() {
                    return Err(TransactionError::UnexpectedSecondSignature);
                }
            }
            (Some(_), None) => return Err(TransactionError::MissingRequester),
            (Some(_), Some(requester)) => {
                if requester.second_signature && tx.sign_signature.is_none() {
                    return Err(TransactionError::MissingRequesterSecondSignature);
                }
                if !requester.second_signature && tx.sign_signature.is_some() {
                    return Err(TransactionError::UnexpectedRequesterSecondSignature);
                }
            }
        }

        if let Some(known) = sender.public_key {
            if known != tx.sender_public_key {
                return Err(TransactionError::SenderKeyMismatch {
                    expected: known,
                    actual: tx.sender_public_key,
                });
            }
        }

        if logic.config().genesis_public_key == Some(tx.sender_public_key) && !in_genesis {
            return Err(TransactionError::GenesisSpend);
        }

        if tx.sender_id != Some(sender.address) {
            return Err(TransactionError::SenderAddressMismatch {
                expected: sender.address,
                actual: tx
                    .sender_id
                    .map_or_else(|| "none".to_string(), |a| a.to_string()),
            });
        }

        let group = effective_multisig_group(tx, sender);
        if let Some(requester_key) = &tx.requester_public_key {
            if !group.contains(requester_key) {
                return Err(TransactionError::NotInMultisigGroup);
            }
        }

        let signer = tx.requester_public_key.unwrap_or(tx.sender_public_key);
        let signature = tx.signature.ok_or(TransactionError::InvalidSignature)?;
        if !logic.verify_signature(tx, &signer, &signature) {
            return Err(TransactionError::InvalidSignature);
        }
        if sender.second_signature && !in_genesis {
            let valid = match (&sender.second_public_key, &tx.sign_signature) {
                (Some(key), Some(sign_signature)) => {
                    logic.verify_second_signature(tx, key, sign_signature)
                }
                _ => false,
            };
            if !valid {
                return Err(TransactionError::InvalidSecondSignature);
            }
        }

        if !tx.signatures.is_empty() {
            let mut seen = HashSet::with_capacity(tx.signatures.len());
            if !tx.signatures.iter().all(|s| seen.insert(*s.as_bytes())) {
                return Err(TransactionError::DuplicateSignature);
            }
            for cosignature in &tx.signatures {
                let verified = group
                    .iter()
                    .filter(|key| Some(**key) != tx.requester_public_key)
                    .any(|key| logic.verify_signature(tx, key, cosignature));
                if !verified {
                    return Err(TransactionError::InvalidMultisignature);
                }
            }
        }

        let fee = logic.calculate_fee(tx, sender, height)?;
        if fee != tx.fee {
            return Err(TransactionError::InvalidFee {
                expected: fee,
                actual: tx.fee,
            });
        }

        if tx.amount.units() > TOTAL_AMOUNT {
            return Err(TransactionError::InvalidAmount(tx.amount.to_string()));
        }

        let total = tx.total()?;
        let check = logic.check_balance(total, BalanceTrack::Confirmed, tx, sender);
        if check.exceeded {
            return Err(TransactionError::InsufficientFunds {
                address: sender.address,
                balance: sender.balance.to_human(),
            });
        }

        let clock = logic.clock();
        if clock.slot_number(Some(u64::from(tx.timestamp))) > clock.slot_number(None) {
            return Err(TransactionError::FutureTimestamp);
        }

        kinds::verify(&logic.kind_context(), tx, sender).await?;

        let id = tx.id.unwrap_or_else(|| tx.compute_id());
        if logic.ports().transactions.transaction_exists(id).await? {
            return Err(TransactionError::AlreadyConfirmed(id));
        }
        Ok(())
    }
}

/// Keys allowed to act for `sender`: its multisignature group, or the
/// group a pending registration in `tx` is about to create.
fn effective_multisig_group(tx: &Transaction, sender: &Account) -> Vec<PublicKey> {
    let mut group = if sender.multisignatures.is_empty() {
        sender.u_multisignatures.clone()
    } else {
        sender.multisignatures.clone()
    };
    if let TransactionAsset::Multisignature(asset) = &tx.asset {
        for change in asset.keysgroup.iter().filter(|c| c.is_add()) {
            if !group.contains(change.key()) {
                group.push(*change.key());
            }
        }
    }
    group
}
