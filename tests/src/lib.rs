//! # Delegate-Ledger Test Suite
//!
//! Unified test crate exercising the ledger crates together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs        # Clocks, delegates, ledger harness
//! │   └── integration/
//! │       ├── scenarios.rs   # Slot ownership, round close, transfers
//! │       └── inverse_laws.rs# Apply/undo and tick/backward-tick identities
//! └── benches/
//!     └── ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p dl-tests
//!
//! # By category
//! cargo test -p dl-tests integration::scenarios
//! cargo test -p dl-tests integration::inverse_laws
//!
//! # Benchmarks
//! cargo bench -p dl-tests
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod integration;
