//! Peer consensus view with a settable value, for nodes without peers.

use crate::domain::Result;
use crate::ports::PeerConsensusView;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

#[derive(Debug, Default)]
pub struct FixedConsensus {
    consensus: RwLock<Option<f64>>,
}

impl FixedConsensus {
    pub fn new(consensus: Option<f64>) -> Self {
        Self {
            consensus: RwLock::new(consensus),
        }
    }

    pub fn set(&self, consensus: Option<f64>) {
        *self.consensus.write() = consensus;
    }
}

#[async_trait]
impl PeerConsensusView for FixedConsensus {
    async fn refresh(&self, limit: usize) -> Result<()> {
        trace!(limit, "Consensus refresh skipped, no peers");
        Ok(())
    }

    fn broadhash_consensus(&self) -> Option<f64> {
        *self.consensus.read()
    }
}
