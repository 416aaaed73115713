//! Error and abort types for forging.

use dl_01_state::StateError;
use dl_02_slots::SlotError;
use shared_bus::SequenceError;
use shared_crypto::CryptoError;
use shared_types::PublicKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForgingError>;

/// Hard failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgingError {
    /// Peers disagree with our chain tip too much to forge safely.
    #[error("Inadequate broadhash consensus {0} %")]
    InadequateConsensus(f64),

    /// A forging secret belongs to no account.
    #[error("Account with public key: {0} not found")]
    AccountNotFound(PublicKey),

    /// The block generator failed.
    #[error("Block generation failed: {0}")]
    Generation(String),

    /// The forging loop is gone.
    #[error("Forging loop stopped")]
    LoopStopped,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Slot error: {0}")]
    Slot(#[from] SlotError),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),
}

/// Why a tick ended without forging. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("node is syncing")]
    Syncing,

    #[error("rounds are not loaded")]
    RoundsNotLoaded,

    #[error("a round tick is running")]
    RoundsTicking,

    #[error("no delegate keypairs loaded")]
    NoKeypairs,

    #[error("chain has no blocks")]
    NoChain,

    #[error("block already forged for slot {0}")]
    AlreadyForged(u64),

    #[error("no enabled delegate owns a slot in this round")]
    NoForger,

    /// The owned slot found is not the current one.
    #[error("slot {found} is not the current slot {current}")]
    SlotMismatch { current: u64, found: u64 },
}

/// How a tick ended when no block was produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeAbort {
    #[error("Forging skipped: {0}")]
    Skipped(SkipReason),

    #[error(transparent)]
    Failed(#[from] ForgingError),
}

impl From<SkipReason> for ForgeAbort {
    fn from(reason: SkipReason) -> Self {
        ForgeAbort::Skipped(reason)
    }
}
