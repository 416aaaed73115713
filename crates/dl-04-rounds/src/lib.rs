//! # dl-04-rounds
//!
//! Round closing for Delegate-Ledger.
//!
//! A round is `SlotClock::num_delegates` consecutive blocks at its height.
//! On every block the generator's produced-block counter moves; on the
//! last block of a round the fees and rewards collected in the round are
//! distributed to the delegates that forged, absent delegates get a missed
//! block, and vote weights are refreshed from the round-vote table.
//!
//! Every tick has an exact inverse ([`RoundController::backward_tick`]) so
//! the chain can be rolled back block by block.
//!
//! ```text
//! block ──▶ RoundController::tick ──▶ RoundScope::ops ──▶ StorageTransaction::commit
//!                  │                                              │
//!                  └── rounds ticking flag                        └──▶ FinishRound event
//! ```

pub mod config;
pub mod domain;
pub mod service;

pub use config::*;
pub use domain::*;
pub use service::*;
