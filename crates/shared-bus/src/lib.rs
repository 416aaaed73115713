//! # Shared Bus - Node Coordination Primitives
//!
//! Everything the ledger subsystems use to coordinate without calling each
//! other directly:
//!
//! - **Event bus:** fire-and-forget [`LedgerEvent`] notifications.
//! - **Node state flags:** readiness gates read by the forging scheduler
//!   and written by the loader and round controller.
//! - **Sequences:** named single-worker FIFO queues that serialize ledger
//!   mutation (`default`, `balances`, `db`).
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌──────────────┐
//! │   Rounds     │ ────────────▶ │  Event Bus   │ ────────────▶ │   Runtime    │
//! └──────────────┘               └──────────────┘               └──────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod flags;
pub mod publisher;
pub mod sequence;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use flags::{NodeStateFlags, TickingGuard};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use sequence::{PendingUnit, Sequence, SequenceConfig, SequenceError};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Names of the standard sequences.
pub mod sequences {
    /// Forging attempts and peer/consensus refresh.
    pub const DEFAULT: &str = "default";
    /// Block application and round ticks.
    pub const BALANCES: &str = "balances";
    /// Storage maintenance.
    pub const DB: &str = "db";
}
