//! Forging services.

mod forging_loop;
mod scheduler;

pub use forging_loop::*;
pub use scheduler::*;
