//! Adapters layer (Hexagonal Architecture)

mod consensus;

pub use consensus::*;
