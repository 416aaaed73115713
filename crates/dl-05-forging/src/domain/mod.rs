//! Forging domain: keyring, slot ownership and abort reasons.

mod errors;
mod keyring;
mod slot;

pub use errors::*;
pub use keyring::*;
pub use slot::*;
