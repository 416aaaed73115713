//! Error types for ledger state storage.

use shared_types::{Address, LedgerError};
use thiserror::Error;

/// Result alias for storage operations.
pub type StateResult<T> = Result<T, StateError>;

/// Storage error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Account invariant or arithmetic failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Account not found: {0}")]
    AccountNotFound(Address),

    /// Block appended out of order.
    #[error("Invalid block height: expected {expected}, got {actual}")]
    InvalidHeight { expected: u64, actual: u64 },

    /// Attempt to remove a block from an empty chain.
    #[error("Chain is empty")]
    EmptyChain,

    /// An op in a batch failed; nothing in the batch was applied.
    #[error("Commit failed at op {index}: {reason}")]
    CommitFailed { index: usize, reason: String },
}
