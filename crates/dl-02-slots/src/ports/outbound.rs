//! Driven ports (Outbound dependencies)

use crate::domain::Result;
use async_trait::async_trait;
use shared_types::PublicKey;

/// Time source for slot computation.
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// Default time source using system time.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Registered delegates eligible for the active set.
#[async_trait]
pub trait ActiveDelegateSource: Send + Sync {
    /// Top `limit` delegates by vote weight descending, then public key
    /// ascending.
    async fn active_delegates(&self, limit: u64) -> Result<Vec<PublicKey>>;
}

/// Deterministic per-round delegate order.
#[async_trait]
pub trait DelegateRanking: Send + Sync {
    /// Slot owners for the round containing `height`; slot `s` belongs to
    /// `ranking[s % ranking.len()]`.
    async fn ranking_for_height(&self, height: u64) -> Result<Vec<PublicKey>>;
}
