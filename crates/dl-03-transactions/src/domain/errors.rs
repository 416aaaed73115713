//! # Transaction Errors
//!
//! Validation failures carry the offending value in their message. The
//! variants for the ordered verification checks come first, in check order.

use dl_01_state::StateError;
use shared_types::{Address, Amount, LedgerError, PublicKey, TransactionId};
use thiserror::Error;

/// Result type alias for transaction operations.
pub type Result<T> = std::result::Result<T, TransactionError>;

/// Transaction validation and application errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Unknown transaction type {0}")]
    UnknownType(u8),

    #[error("Missing sender")]
    MissingSender,

    #[error("Missing requester")]
    MissingRequester,

    #[error("Missing sender second signature")]
    MissingSecondSignature,

    #[error("Sender does not have a second signature")]
    UnexpectedSecondSignature,

    #[error("Missing requester second signature")]
    MissingRequesterSecondSignature,

    #[error("Requester does not have a second signature")]
    UnexpectedRequesterSecondSignature,

    #[error("Invalid sender public key: {actual} expected: {expected}")]
    SenderKeyMismatch {
        expected: PublicKey,
        actual: PublicKey,
    },

    #[error("Invalid sender. Can not send from genesis account")]
    GenesisSpend,

    #[error("Invalid sender address: {actual} expected: {expected}")]
    SenderAddressMismatch { expected: Address, actual: String },

    #[error("Account does not belong to multisignature group")]
    NotInMultisigGroup,

    #[error("Failed to verify signature")]
    InvalidSignature,

    #[error("Failed to verify second signature")]
    InvalidSecondSignature,

    #[error("Encountered duplicate signature in transaction")]
    DuplicateSignature,

    #[error("Failed to verify multisignature")]
    InvalidMultisignature,

    #[error("Invalid transaction fee: {actual} expected: {expected}")]
    InvalidFee { expected: Amount, actual: Amount },

    #[error("Invalid transaction amount: {0}")]
    InvalidAmount(String),

    #[error("Account does not have enough funds: {address} balance: {balance}")]
    InsufficientFunds { address: Address, balance: String },

    #[error("Invalid transaction timestamp. Timestamp is in the future")]
    FutureTimestamp,

    #[error("Transaction is already confirmed: {0}")]
    AlreadyConfirmed(TransactionId),

    /// A supplied id does not match the one derived from the bytes.
    #[error("Invalid transaction id: {actual} expected: {expected}")]
    InvalidId {
        expected: TransactionId,
        actual: TransactionId,
    },

    /// Multisignature threshold not yet reached.
    #[error("Transaction is not ready: {0}")]
    NotReady(TransactionId),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid transaction asset: {0}")]
    InvalidAsset(String),

    #[error("Account has already enabled a second signature")]
    SecondSignatureExists,

    #[error("Account is already a delegate")]
    AlreadyDelegate,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Delegate not found: {0}")]
    DelegateNotFound(PublicKey),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    #[error("Maximum number of {0} votes exceeded")]
    VoteLimitExceeded(usize),

    #[error("Account already has multisignatures enabled")]
    MultisigAlreadyEnabled,

    #[error("Signature on this account is pending confirmation: {0}")]
    MultisigPending(Address),

    #[error("Invalid multisignature: {0}")]
    InvalidMultisigConfig(String),

    #[error("Application not found: {0}")]
    DappNotFound(TransactionId),

    #[error("Transaction is already processed: {0}")]
    OutTransferPending(TransactionId),

    #[error("Transaction is already confirmed: {0}")]
    OutTransferConfirmed(TransactionId),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
