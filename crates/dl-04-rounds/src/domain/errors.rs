//! Error types for round processing.

use dl_01_state::StateError;
use dl_02_slots::SlotError;
use shared_types::LedgerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoundError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("Invalid round configuration: {0}")]
    InvalidConfig(String),

    /// Backward tick given a previous block that is not the parent.
    #[error("Block at height {height} does not follow block at height {previous}")]
    NotConsecutive { height: u64, previous: u64 },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Delegate ranking error: {0}")]
    Ranking(#[from] SlotError),
}
