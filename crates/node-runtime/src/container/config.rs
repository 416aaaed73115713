//! # Node Configuration
//!
//! Unified configuration for every ledger subsystem, read from one JSON
//! document. Every section is optional and falls back to mainnet defaults.
//!
//! ## Sources
//!
//! 1. JSON file, path from `DL_CONFIG` or the first CLI argument
//! 2. `DL_FORGING_SECRETS`: comma separated passphrases, replacing
//!    `forging.secrets`

use crate::genesis::GenesisConfig;
use dl_02_slots::SlotConfig;
use dl_03_transactions::TransactionConfig;
use dl_04_rounds::RoundConfig;
use dl_05_forging::ForgingConfig;
use serde::Deserialize;
use shared_bus::SequenceConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "DL_CONFIG";

/// Environment variable overriding the forging secrets.
pub const FORGING_SECRETS_ENV: &str = "DL_FORGING_SECRETS";

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    pub slots: SlotConfig,
    pub transactions: TransactionConfig,
    pub rounds: RoundConfig,
    pub forging: ForgingConfig,
    pub sequence: SequenceConfig,
    pub genesis: GenesisConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl NodeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, or use defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replace the forging secrets with the comma separated `secrets`.
    pub fn override_secrets(&mut self, secrets: &str) {
        self.forging.secrets = secrets
            .split(',')
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(str::to_owned)
            .collect();
    }

    /// Slots own the active set size, including its schedule; rounds read
    /// it from the slot clock.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots.active_delegates == 0 || self.slots.block_time == 0 {
            return Err(ConfigError::Invalid(
                "slots need a positive block time and delegate count".into(),
            ));
        }
        if let Some(change) = self.slots.delegate_schedule.iter().find(|c| c.delegates == 0) {
            return Err(ConfigError::Invalid(format!(
                "slots.delegateSchedule entry at height {} has no delegates",
                change.height
            )));
        }
        if self.rounds.snapshot_round == Some(0) {
            return Err(ConfigError::Invalid(
                "rounds.snapshotRound must be positive".into(),
            ));
        }
        if self.forging.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "forging.pollIntervalMs must be positive".into(),
            ));
        }
        Ok(())
    }
}
