//! # Genesis Module
//!
//! The genesis block is the only block without a parent:
//!
//! - Height: 1
//! - Timestamp: 0 (the epoch itself)
//! - No transactions, no reward
//! - Signed by the configured generator secret
//!
//! Its round tick distributes the bootstrap round to the generator alone.

pub mod builder;

pub use builder::{Genesis, GenesisBuilder, GenesisConfig, GenesisDelegate, GenesisError};
