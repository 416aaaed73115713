//! Driven ports used by transaction logic.
//!
//! The storage traits themselves live in `dl-01-state`; this bundles the
//! ones transaction logic needs behind shared handles.

use dl_01_state::{AccountStore, DappRegistry, TransactionIndex};
use std::sync::Arc;

/// Storage handles for transaction verification and application.
#[derive(Clone)]
pub struct LedgerPorts {
    pub accounts: Arc<dyn AccountStore>,
    pub transactions: Arc<dyn TransactionIndex>,
    pub dapps: Arc<dyn DappRegistry>,
}

impl LedgerPorts {
    /// Use one store for every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AccountStore + TransactionIndex + DappRegistry + 'static,
    {
        Self {
            accounts: store.clone(),
            transactions: store.clone(),
            dapps: store,
        }
    }
}
