//! Domain layer for transaction logic.
//!
//! Pure pieces only: errors, fees, signing payloads, balance checks and the
//! pending-registration registry. Everything that reads account state lives
//! in [`crate::kinds`] and [`crate::service`].

mod balance;
mod errors;
mod fees;
mod pending;
pub mod signing;
mod tag;

pub use balance::*;
pub use errors::*;
pub use fees::*;
pub use pending::*;
pub use tag::*;
