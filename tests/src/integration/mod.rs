//! Cross-crate tests.
//!
//! - `scenarios`: end-to-end behaviour of forging, transactions and rounds
//! - `inverse_laws`: every forward operation has an exact undo

pub mod inverse_laws;
pub mod scenarios;
