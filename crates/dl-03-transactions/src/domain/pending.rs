//! Unconfirmed registrations that must not be repeated while pending.

use parking_lot::Mutex;
use shared_types::{Address, TransactionId};
use std::collections::HashSet;

/// Pending multisignature registrations and out-transfer withdrawals.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    multisig: Mutex<HashSet<Address>>,
    out_transfers: Mutex<HashSet<TransactionId>>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `address` has a multisignature registration pending.
    pub fn multisig_pending(&self, address: Address) -> bool {
        self.multisig.lock().contains(&address)
    }

    /// Mark a registration pending; `false` if one already was.
    pub fn begin_multisig(&self, address: Address) -> bool {
        self.multisig.lock().insert(address)
    }

    pub fn end_multisig(&self, address: Address) {
        self.multisig.lock().remove(&address);
    }

    /// `true` when a pending out-transfer withdraws `source`.
    pub fn out_transfer_pending(&self, source: TransactionId) -> bool {
        self.out_transfers.lock().contains(&source)
    }

    /// Mark `source` withdrawn; `false` if it already was.
    pub fn begin_out_transfer(&self, source: TransactionId) -> bool {
        self.out_transfers.lock().insert(source)
    }

    pub fn end_out_transfer(&self, source: TransactionId) {
        self.out_transfers.lock().remove(&source);
    }
}
