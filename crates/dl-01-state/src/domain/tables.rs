//! Names of the type-specific record tables and their key columns.

pub const DELEGATES: &str = "delegates";
pub const VOTES: &str = "votes";
pub const SIGNATURES: &str = "signatures";
pub const MULTISIGNATURES: &str = "multisignatures";
pub const IN_TRANSFER: &str = "intransfer";
pub const OUT_TRANSFER: &str = "outtransfer";

/// Column holding the id of the transaction a row belongs to.
pub const TRANSACTION_ID: &str = "transactionId";

/// Out-transfer column holding the withdrawn dapp-side transaction id.
pub const OUT_TRANSACTION_ID: &str = "outTransactionId";
