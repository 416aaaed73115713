//! # Keyring
//!
//! Delegate keypairs known to this node and which of them may forge.
//! Loading a key and enabling it are separate: a key can be known but
//! disabled.

use super::{ForgingError, Result};
use dl_01_state::{AccountFilter, AccountStore};
use shared_crypto::Ed25519KeyPair;
use shared_types::PublicKey;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct Keyring {
    keypairs: HashMap<PublicKey, Ed25519KeyPair>,
    enabled: BTreeSet<PublicKey>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, key: &PublicKey) -> bool {
        self.enabled.contains(key)
    }

    /// Register `keypair`, then report whether its key is enabled.
    pub fn is_enabled_keypair(&mut self, keypair: &Ed25519KeyPair) -> bool {
        let key = keypair.public_key();
        self.keypairs.entry(key).or_insert_with(|| keypair.clone());
        self.is_enabled(&key)
    }

    /// Enable `keypair` (registering it), or every known key when `None`.
    pub fn enable(&mut self, keypair: Option<Ed25519KeyPair>) {
        match keypair {
            Some(keypair) => {
                let key = keypair.public_key();
                self.keypairs.insert(key, keypair);
                self.enabled.insert(key);
            }
            None => self.enabled.extend(self.keypairs.keys().copied()),
        }
    }

    /// Disable `key`, or every key when `None`. Keypairs stay known.
    pub fn disable(&mut self, key: Option<&PublicKey>) {
        match key {
            Some(key) => {
                self.enabled.remove(key);
            }
            None => self.enabled.clear(),
        }
    }

    /// Derive a keypair for every secret and register those that belong to
    /// delegates, then enable every known key. Fails without registering
    /// anything if a secret belongs to no account.
    #[tracing::instrument(skip_all, fields(secrets = secrets.len()))]
    pub async fn load_from_secrets(
        &mut self,
        secrets: &[String],
        accounts: &dyn AccountStore,
    ) -> Result<usize> {
        let mut delegates = Vec::with_capacity(secrets.len());
        for secret in secrets {
            let keypair = Ed25519KeyPair::from_secret(secret)?;
            let key = keypair.public_key();
            let account = accounts
                .get(&AccountFilter::PublicKey(key))
                .await?
                .ok_or(ForgingError::AccountNotFound(key))?;

            if account.is_delegate {
                info!(address = %account.address, "Forging enabled on account");
                delegates.push(keypair);
            } else {
                warn!(
                    address = %account.address,
                    public_key = %key,
                    "Account is not a delegate, skipping"
                );
            }
        }

        let loaded = delegates.len();
        for keypair in delegates {
            self.keypairs.insert(keypair.public_key(), keypair);
        }
        self.enable(None);
        Ok(loaded)
    }

    pub fn keypair(&self, key: &PublicKey) -> Option<&Ed25519KeyPair> {
        self.keypairs.get(key)
    }

    /// Every known keypair, enabled or not.
    pub fn keypairs(&self) -> impl Iterator<Item = &Ed25519KeyPair> {
        self.keypairs.values()
    }

    pub fn is_empty(&self) -> bool {
        self.keypairs.is_empty()
    }

    /// Enabled keys in key order.
    pub fn enabled_keys(&self) -> Vec<PublicKey> {
        self.enabled.iter().copied().collect()
    }
}
