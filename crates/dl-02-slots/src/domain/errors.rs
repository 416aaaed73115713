//! Error types for the slot subsystem.

use dl_01_state::StateError;
use thiserror::Error;

/// Result type alias for slot operations.
pub type Result<T> = std::result::Result<T, SlotError>;

/// Slot and ranking errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// Configuration cannot produce slots.
    #[error("Invalid slot configuration: {0}")]
    InvalidConfig(String),

    /// Delegate lookup failed.
    #[error("State error: {0}")]
    State(#[from] StateError),
}
