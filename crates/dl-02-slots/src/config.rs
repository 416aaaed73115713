//! Configuration types for the slot clock.

use serde::Deserialize;
use shared_types::constants::{ACTIVE_DELEGATES, BLOCK_TIME, EPOCH_TIME};

/// Slot clock configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotConfig {
    /// Epoch start, unix seconds.
    pub epoch_time: u64,

    /// Slot length in seconds.
    pub block_time: u64,

    /// Active delegate set size before any scheduled change.
    pub active_delegates: u64,

    /// Protocol upgrades changing the active set size, by height.
    pub delegate_schedule: Vec<DelegateCountChange>,
}

/// Active set size in effect from `height` onwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateCountChange {
    pub height: u64,
    pub delegates: u64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            epoch_time: EPOCH_TIME,
            block_time: BLOCK_TIME,
            active_delegates: ACTIVE_DELEGATES,
            delegate_schedule: Vec::new(),
        }
    }
}
