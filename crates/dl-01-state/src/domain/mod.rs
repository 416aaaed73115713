//! Domain layer for ledger state.

mod errors;
mod filter;
mod summary;
pub mod tables;

pub use errors::*;
pub use filter::*;
pub use summary::*;
