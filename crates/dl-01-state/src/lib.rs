//! # dl-01-state
//!
//! Ledger state storage for Delegate-Ledger.
//!
//! ## Role in System
//!
//! - **Account table**: confirmed and unconfirmed account fields, changed
//!   only through diff merges.
//! - **Round-vote table**: per-round vote-weight deltas, folded into
//!   delegate votes when a round closes.
//! - **Snapshots**: round-vote and vote-weight copies used to roll a round
//!   back.
//! - **Blocks and records**: the chain itself plus the type-specific rows
//!   written when transactions are saved.
//!
//! The ledger core only sees the ports in [`ports`]; [`MemoryStore`]
//! implements all of them for single-node operation and tests.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
