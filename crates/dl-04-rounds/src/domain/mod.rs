//! Round domain: share computation, outsiders and the per-tick op plan.

mod changes;
mod errors;
mod outsiders;
mod scope;

pub use changes::*;
pub use errors::*;
pub use outsiders::*;
pub use scope::*;
