//! # Transactions
//!
//! A transaction carries a closed [`TransactionAsset`] union; its type tag is
//! derived from the variant. On the wire the tag is numeric and the asset a
//! keyed JSON object, which [`WireTransaction`] translates.
//!
//! ## Byte layout
//!
//! | Field | Size |
//! |-------|------|
//! | type | 1 |
//! | timestamp (LE) | 4 |
//! | sender public key | 32 |
//! | requester public key | 32, optional |
//! | recipient (BE numeric address, zero if absent) | 8 |
//! | amount (LE) | 8 |
//! | asset | variable |
//! | signature | 64, optional |
//! | second signature | 64, optional |
//!
//! The same layout is the signing payload (hashed with both signatures
//! skipped) and the id input (hashed with both included).

use crate::account::KeyChange;
use crate::amount::Amount;
use crate::errors::{LedgerError, LedgerResult};
use crate::ids::{Address, BlockId, PublicKey, Signature, TransactionId};
use serde::{Deserialize, Serialize};
use shared_crypto::{id_from_hash, sha256, Hash};
use std::fmt;

/// Numeric type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TransactionType {
    Send = 0,
    SecondSignature = 1,
    Delegate = 2,
    Vote = 3,
    Multisignature = 4,
    InTransfer = 6,
    OutTransfer = 7,
}

impl TransactionType {
    /// Wire tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = LedgerError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(TransactionType::Send),
            1 => Ok(TransactionType::SecondSignature),
            2 => Ok(TransactionType::Delegate),
            3 => Ok(TransactionType::Vote),
            4 => Ok(TransactionType::Multisignature),
            6 => Ok(TransactionType::InTransfer),
            7 => Ok(TransactionType::OutTransfer),
            other => Err(LedgerError::UnknownTransactionType(other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Send => "send",
            TransactionType::SecondSignature => "second signature",
            TransactionType::Delegate => "delegate",
            TransactionType::Vote => "vote",
            TransactionType::Multisignature => "multisignature",
            TransactionType::InTransfer => "in transfer",
            TransactionType::OutTransfer => "out transfer",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondSignatureAsset {
    pub public_key: PublicKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAsset {
    pub username: String,
    /// Filled with the sender key when the transaction is processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisignatureAsset {
    pub min: u8,
    pub lifetime: u8,
    pub keysgroup: Vec<KeyChange>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InTransferAsset {
    pub dapp_id: TransactionId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutTransferAsset {
    pub dapp_id: TransactionId,
    /// Id of the dapp-side transaction being withdrawn.
    pub transaction_id: TransactionId,
}

/// Type-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionAsset {
    Send,
    SecondSignature(SecondSignatureAsset),
    Delegate(DelegateAsset),
    Vote(Vec<KeyChange>),
    Multisignature(MultisignatureAsset),
    InTransfer(InTransferAsset),
    OutTransfer(OutTransferAsset),
}

impl TransactionAsset {
    /// Type tag of this payload.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionAsset::Send => TransactionType::Send,
            TransactionAsset::SecondSignature(_) => TransactionType::SecondSignature,
            TransactionAsset::Delegate(_) => TransactionType::Delegate,
            TransactionAsset::Vote(_) => TransactionType::Vote,
            TransactionAsset::Multisignature(_) => TransactionType::Multisignature,
            TransactionAsset::InTransfer(_) => TransactionType::InTransfer,
            TransactionAsset::OutTransfer(_) => TransactionType::OutTransfer,
        }
    }

    /// Asset bytes appended to the transaction layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            TransactionAsset::Send => Vec::new(),
            TransactionAsset::SecondSignature(asset) => asset.public_key.as_bytes().to_vec(),
            TransactionAsset::Delegate(asset) => asset.username.as_bytes().to_vec(),
            TransactionAsset::Vote(votes) => joined(votes).into_bytes(),
            TransactionAsset::Multisignature(asset) => {
                let mut bytes = vec![asset.min, asset.lifetime];
                bytes.extend_from_slice(joined(&asset.keysgroup).as_bytes());
                bytes
            }
            TransactionAsset::InTransfer(asset) => asset.dapp_id.to_string().into_bytes(),
            TransactionAsset::OutTransfer(asset) => {
                format!("{}{}", asset.dapp_id, asset.transaction_id).into_bytes()
            }
        }
    }
}

fn joined(changes: &[KeyChange]) -> String {
    changes.iter().map(ToString::to_string).collect()
}

/// A transaction, confirmed or pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTransaction", into = "WireTransaction")]
pub struct Transaction {
    /// Derived by `process`; `None` until then.
    pub id: Option<TransactionId>,
    pub asset: TransactionAsset,
    pub amount: Amount,
    pub fee: Amount,
    /// Seconds since the epoch.
    pub timestamp: u32,
    pub sender_public_key: PublicKey,
    /// Multisignature member submitting on behalf of the sender.
    pub requester_public_key: Option<PublicKey>,
    pub sender_id: Option<Address>,
    pub recipient_id: Option<Address>,
    pub signature: Option<Signature>,
    pub sign_signature: Option<Signature>,
    /// Multisignature cosignatures.
    pub signatures: Vec<Signature>,
    /// Block the transaction was included in.
    pub block_id: Option<BlockId>,
}

impl Transaction {
    /// Unsigned transaction with zero amount and fee.
    pub fn new(asset: TransactionAsset, sender_public_key: PublicKey, timestamp: u32) -> Self {
        Self {
            id: None,
            asset,
            amount: Amount::ZERO,
            fee: Amount::ZERO,
            timestamp,
            sender_public_key,
            requester_public_key: None,
            sender_id: Some(Address::from_public_key(&sender_public_key)),
            recipient_id: None,
            signature: None,
            sign_signature: None,
            signatures: Vec::new(),
            block_id: None,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.asset.transaction_type()
    }

    /// `amount + fee`.
    pub fn total(&self) -> LedgerResult<Amount> {
        self.amount.checked_add(self.fee)
    }

    /// Canonical bytes (see module docs).
    pub fn to_bytes(&self, skip_signature: bool, skip_second_signature: bool) -> Vec<u8> {
        let asset = self.asset.to_bytes();
        let mut bytes = Vec::with_capacity(1 + 4 + 32 + 32 + 8 + 8 + asset.len() + 128);

        bytes.push(self.transaction_type().tag());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(self.sender_public_key.as_bytes());
        if let Some(requester) = &self.requester_public_key {
            bytes.extend_from_slice(requester.as_bytes());
        }
        let recipient = self.recipient_id.map(Address::value).unwrap_or(0);
        bytes.extend_from_slice(&recipient.to_be_bytes());
        bytes.extend_from_slice(&self.amount.units().to_le_bytes());
        bytes.extend_from_slice(&asset);

        if !skip_signature {
            if let Some(signature) = &self.signature {
                bytes.extend_from_slice(signature.as_bytes());
            }
        }
        if !skip_second_signature {
            if let Some(signature) = &self.sign_signature {
                bytes.extend_from_slice(signature.as_bytes());
            }
        }
        bytes
    }

    /// `sha256` over the full layout.
    pub fn hash(&self) -> Hash {
        sha256(&self.to_bytes(false, false))
    }

    /// Id derived from [`Transaction::hash`].
    pub fn compute_id(&self) -> TransactionId {
        TransactionId::new(id_from_hash(&self.hash()))
    }
}

/// JSON shape of a transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    #[serde(rename = "type")]
    pub kind: u8,
    pub amount: Amount,
    pub fee: Amount,
    pub timestamp: u32,
    pub sender_public_key: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_public_key: Option<PublicKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_signature: Option<Signature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<Signature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
    #[serde(default)]
    pub asset: WireAsset,
}

/// JSON shape of the asset object; at most one key is set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SecondSignatureAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<DelegateAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<KeyChange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multisignature: Option<MultisignatureAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_transfer: Option<InTransferAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_transfer: Option<OutTransferAsset>,
}

impl TryFrom<WireTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(wire: WireTransaction) -> Result<Self, Self::Error> {
        let kind = TransactionType::try_from(wire.kind)?;
        let missing = || LedgerError::MissingAsset(wire.kind);
        let asset = wire.asset;
        let asset = match kind {
            TransactionType::Send => TransactionAsset::Send,
            TransactionType::SecondSignature => {
                TransactionAsset::SecondSignature(asset.signature.ok_or_else(missing)?)
            }
            TransactionType::Delegate => {
                TransactionAsset::Delegate(asset.delegate.ok_or_else(missing)?)
            }
            TransactionType::Vote => TransactionAsset::Vote(asset.votes.ok_or_else(missing)?),
            TransactionType::Multisignature => {
                TransactionAsset::Multisignature(asset.multisignature.ok_or_else(missing)?)
            }
            TransactionType::InTransfer => {
                TransactionAsset::InTransfer(asset.in_transfer.ok_or_else(missing)?)
            }
            TransactionType::OutTransfer => {
                TransactionAsset::OutTransfer(asset.out_transfer.ok_or_else(missing)?)
            }
        };

        Ok(Transaction {
            id: wire.id,
            asset,
            amount: wire.amount,
            fee: wire.fee,
            timestamp: wire.timestamp,
            sender_public_key: wire.sender_public_key,
            requester_public_key: wire.requester_public_key,
            sender_id: wire.sender_id,
            recipient_id: wire.recipient_id,
            signature: wire.signature,
            sign_signature: wire.sign_signature,
            signatures: wire.signatures,
            block_id: wire.block_id,
        })
    }
}

impl From<Transaction> for WireTransaction {
    fn from(tx: Transaction) -> Self {
        let kind = tx.transaction_type().tag();
        let mut asset = WireAsset::default();
        match tx.asset {
            TransactionAsset::Send => {}
            TransactionAsset::SecondSignature(a) => asset.signature = Some(a),
            TransactionAsset::Delegate(a) => asset.delegate = Some(a),
            TransactionAsset::Vote(v) => asset.votes = Some(v),
            TransactionAsset::Multisignature(a) => asset.multisignature = Some(a),
            TransactionAsset::InTransfer(a) => asset.in_transfer = Some(a),
            TransactionAsset::OutTransfer(a) => asset.out_transfer = Some(a),
        }
        WireTransaction {
            id: tx.id,
            kind,
            amount: tx.amount,
            fee: tx.fee,
            timestamp: tx.timestamp,
            sender_public_key: tx.sender_public_key,
            requester_public_key: tx.requester_public_key,
            sender_id: tx.sender_id,
            recipient_id: tx.recipient_id,
            signature: tx.signature,
            sign_signature: tx.sign_signature,
            signatures: tx.signatures,
            block_id: tx.block_id,
            asset,
        }
    }
}
