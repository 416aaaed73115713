//! # Ledger Events
//!
//! Fire-and-forget notifications emitted by the ledger core. Publishers never
//! wait on subscribers.

use serde::{Deserialize, Serialize};
use shared_types::{BlockId, PublicKey};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A forward tick closed `round`.
    FinishRound { round: u64 },

    /// The configured snapshot round was reached and blocks above it were
    /// truncated.
    SnapshotFinished { round: u64 },

    /// The chain is loaded and rounds may tick.
    BlockchainReady,

    /// A locally forged block was accepted onto the chain.
    BlockForged {
        height: u64,
        block_id: BlockId,
        generator: PublicKey,
    },
}

impl LedgerEvent {
    /// Topic this event belongs to.
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::FinishRound { .. } | Self::SnapshotFinished { .. } => EventTopic::Rounds,
            Self::BlockchainReady => EventTopic::Chain,
            Self::BlockForged { .. } => EventTopic::Forging,
        }
    }
}

/// Event topics for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Round controller events.
    Rounds,
    /// Chain loading events.
    Chain,
    /// Forging events.
    Forging,
    /// Every topic.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
