//! Round controller service.

mod controller;

pub use controller::*;
