//! Adapters layer (Hexagonal Architecture)

mod ranking;

pub use ranking::*;
