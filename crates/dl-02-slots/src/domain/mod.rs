//! Domain layer for slots and delegate ordering.

mod clock;
mod errors;
mod shuffle;

pub use clock::*;
pub use errors::*;
pub use shuffle::*;
