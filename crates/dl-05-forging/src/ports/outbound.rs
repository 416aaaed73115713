//! Driven ports: what the scheduler calls out to.

use crate::domain::Result;
use async_trait::async_trait;
use shared_crypto::Ed25519KeyPair;
use shared_types::Block;

/// Builds, signs and hands a block over to the chain.
#[async_trait]
pub trait BlockGenerator: Send + Sync {
    /// Generate the block for the slot starting at `timestamp` (epoch
    /// seconds), signed with `keypair`.
    async fn generate_block(&self, keypair: &Ed25519KeyPair, timestamp: u64) -> Result<Block>;
}

/// How far connected peers agree with this node's chain tip.
#[async_trait]
pub trait PeerConsensusView: Send + Sync {
    /// Poll up to `limit` peers.
    async fn refresh(&self, limit: usize) -> Result<()>;

    /// Broadhash consensus in percent, `None` when it cannot be computed.
    fn broadhash_consensus(&self) -> Option<f64>;
}
