//! Ports layer (Hexagonal Architecture)

mod storage;

pub use storage::*;
