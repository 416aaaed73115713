//! Application services: the logic core, the validator and the applier.

mod applier;
mod logic;
mod validator;

pub use applier::*;
pub use logic::*;
pub use validator::*;
