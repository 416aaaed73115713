//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports of the ledger crates that
//! only make sense inside a running node.
//!
//! ```text
//! ForgingScheduler ──BlockGenerator──→ LocalBlockGenerator
//!                                            │
//!                                            ↓
//!                                      ChainProcessor ("balances")
//!                                            │
//!                                            ↓
//!                                   BlockForged → Event Bus
//! ```

pub mod block_generator;

pub use block_generator::*;
