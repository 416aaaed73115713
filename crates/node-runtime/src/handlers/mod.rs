//! # Block Handlers
//!
//! Everything that moves the chain tip: applying a block and removing the
//! last one.

pub mod chain_processor;

pub use chain_processor::*;
