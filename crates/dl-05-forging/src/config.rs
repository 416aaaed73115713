//! Forging configuration.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgingConfig {
    /// Scheduler tick interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Broadhash consensus (percent) below which forging is refused.
    pub min_broadhash_consensus: f64,
    /// Peers polled before each forging attempt.
    pub max_peers: usize,
    /// Delegate passphrases loaded at startup.
    pub secrets: Vec<String>,
}

impl ForgingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ForgingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            min_broadhash_consensus: 51.0,
            max_peers: 100,
            secrets: Vec::new(),
        }
    }
}

impl fmt::Debug for ForgingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForgingConfig")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("min_broadhash_consensus", &self.min_broadhash_consensus)
            .field("max_peers", &self.max_peers)
            .field("secrets", &format_args!("[{} redacted]", self.secrets.len()))
            .finish()
    }
}
