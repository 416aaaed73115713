//! # Genesis Builder
//!
//! Creates the height-1 block and the accounts that exist before it.

use serde::Deserialize;
use shared_crypto::{CryptoError, Ed25519KeyPair};
use shared_types::{Account, Amount, Block, LedgerError, PublicKey};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Genesis creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A delegate registered before the first block.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisDelegate {
    pub public_key: PublicKey,
    pub username: String,
    /// Base units credited on both tracks.
    #[serde(default)]
    pub balance: u64,
}

/// Genesis block configuration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenesisConfig {
    /// Passphrase of the genesis block generator.
    pub generator_secret: String,

    /// Registered delegates. When empty, every forging key becomes a
    /// delegate named `genesis_<n>`.
    pub delegates: Vec<GenesisDelegate>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            generator_secret: "genesis".to_string(),
            delegates: Vec::new(),
        }
    }
}

impl fmt::Debug for GenesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenesisConfig")
            .field("generator_secret", &"[redacted]")
            .field("delegates", &self.delegates)
            .finish()
    }
}

/// The genesis block and the accounts it starts from.
#[derive(Clone, Debug)]
pub struct Genesis {
    pub block: Block,
    pub accounts: Vec<Account>,
}

pub struct GenesisBuilder {
    config: GenesisConfig,
    forging_keys: Vec<PublicKey>,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self {
            config,
            forging_keys: Vec::new(),
        }
    }

    /// Keys registered as delegates when the config names none.
    pub fn with_forging_keys(mut self, keys: Vec<PublicKey>) -> Self {
        self.forging_keys = keys;
        self
    }

    pub fn build(self) -> Result<Genesis, GenesisError> {
        let generator = Ed25519KeyPair::from_secret(&self.config.generator_secret)?;
        let block = Block::genesis(&generator, Vec::new())?;

        let delegates = if self.config.delegates.is_empty() {
            self.forging_keys
                .iter()
                .enumerate()
                .map(|(i, key)| GenesisDelegate {
                    public_key: *key,
                    username: format!("genesis_{}", i + 1),
                    balance: 0,
                })
                .collect()
        } else {
            self.config.delegates
        };

        let mut keys = BTreeSet::new();
        let mut names = BTreeSet::new();
        let mut accounts = Vec::with_capacity(delegates.len());
        for delegate in delegates {
            if !keys.insert(delegate.public_key) {
                return Err(GenesisError::InvalidConfig(format!(
                    "duplicate delegate key {}",
                    delegate.public_key
                )));
            }
            if !names.insert(delegate.username.clone()) {
                return Err(GenesisError::InvalidConfig(format!(
                    "duplicate delegate username {}",
                    delegate.username
                )));
            }

            let mut account = Account::with_public_key(delegate.public_key);
            account.is_delegate = true;
            account.u_is_delegate = true;
            account.username = Some(delegate.username.clone());
            account.u_username = Some(delegate.username);
            account.balance = Amount::new(delegate.balance);
            account.u_balance = Amount::new(delegate.balance);
            account.block_id = Some(block.id);
            accounts.push(account);
        }

        Ok(Genesis { block, accounts })
    }
}
