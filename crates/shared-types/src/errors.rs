//! # Error Types
//!
//! Errors raised by the ledger entities themselves: arithmetic, decoding and
//! merge invariant violations.

use crate::ids::Address;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Result alias for ledger entity operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised by amounts, identifiers, accounts and transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Integer overflow in money arithmetic.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// A merge would drive a balance track below zero.
    #[error("Negative {field} for {address}: {current} {delta:+}")]
    NegativeBalance {
        address: Address,
        field: &'static str,
        current: u64,
        delta: i64,
    },

    /// A counter field would go below zero.
    #[error("Negative {field} for {address}")]
    NegativeCounter {
        address: Address,
        field: &'static str,
    },

    /// Amount string is not a plain non-negative integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Unknown transaction type tag.
    #[error("Unknown transaction type {0}")]
    UnknownTransactionType(u8),

    /// Transaction asset is missing the payload its type requires.
    #[error("Missing asset payload for transaction type {0}")]
    MissingAsset(u8),

    /// Address string could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Identifier string could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// A `+key` / `-key` change entry could not be parsed.
    #[error("Invalid key change: {0}")]
    InvalidChange(String),

    /// Merge diff conflicts with the account it targets.
    #[error("Merge conflict for {address}: {reason}")]
    MergeConflict { address: Address, reason: String },

    /// Underlying crypto error.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
