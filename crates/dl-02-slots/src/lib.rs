//! # dl-02-slots
//!
//! Slot clock and delegate ordering for Delegate-Ledger.
//!
//! ## Role in System
//!
//! - Converts wall-clock time into epoch time and slot numbers.
//! - Tracks the active set size, including scheduled changes by height.
//! - Produces the per-round slot owner list: the top delegates by vote,
//!   shuffled with a seed derived from the round number.
//!
//! ```text
//! slot s at height h  ──▶  ranking_for_height(h)[s % N]
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use config::*;
pub use domain::*;
pub use ports::*;
