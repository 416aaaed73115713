//! # Node Runtime Library
//!
//! Wiring of a single Delegate-Ledger node, exposed for the binary and for
//! tests.
//!
//! - `container/` - configuration and the subsystem container
//! - `genesis/` - genesis block and accounts
//! - `handlers/` - block application and removal
//! - `adapters/` - node-side implementations of ledger ports

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod handlers;

pub use container::{ConfigError, LedgerContainer, NodeConfig, NodeError};
