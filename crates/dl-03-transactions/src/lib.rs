//! # dl-03-transactions
//!
//! Transaction application engine for Delegate-Ledger.
//!
//! ## Role in System
//!
//! - **Validation**: [`TransactionValidator::verify`] runs the ordered
//!   signature, fee, amount, balance, timestamp and type-specific checks.
//! - **Application**: [`TransactionApplier`] applies and undoes balance and
//!   type-specific effects on the confirmed (block) and unconfirmed (pool)
//!   tracks, reversing the balance change when a type hook fails.
//! - **Logic**: [`TransactionLogic`] owns ids, bytes, signing, fees,
//!   readiness and record rows.
//!
//! ## Transaction kinds
//!
//! | Tag | Kind | Fee |
//! |-----|------|-----|
//! | 0 | send | 0.1 |
//! | 1 | second signature | 5 |
//! | 2 | delegate registration | 25 |
//! | 3 | vote | 1 |
//! | 4 | multisignature registration | 5 per member plus one |
//! | 6 | dapp in-transfer | 0.1 |
//! | 7 | dapp out-transfer | 0.1 |

pub mod config;
pub mod domain;
mod kinds;
pub mod ports;
pub mod service;

pub use config::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
