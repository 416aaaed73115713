//! # dl-05-forging
//!
//! Forging for Delegate-Ledger: which local delegate key owns the current
//! slot, and producing exactly one block in it.
//!
//! ## Gates
//!
//! A tick does nothing while the node is syncing, before rounds are
//! loaded, or while a round tick is running. Consensus among peers is
//! checked inside the `default` sequence right before the block generator
//! is called.
//!
//! ## Ownership
//!
//! The [`Keyring`] is owned by the [`ForgingScheduler`]. Other tasks change
//! it only by sending [`ForgingCommand`]s through a [`ForgingHandle`] to
//! the loop started by [`ForgingScheduler::run`].

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use config::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
