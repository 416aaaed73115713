//! # Ledger Container
//!
//! Node configuration and the container holding every ledger subsystem
//! with its lifetime and wiring.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, CONFIG_PATH_ENV, FORGING_SECRETS_ENV};
pub use subsystems::{LedgerContainer, NodeError};
