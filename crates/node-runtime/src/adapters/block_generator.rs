//! Local block generator: signs an empty block on the current tip and
//! hands it to the chain processor.

use crate::handlers::ChainProcessor;
use async_trait::async_trait;
use dl_01_state::BlockStore;
use dl_05_forging::{BlockGenerator, ForgingError};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, ChainTip, RewardSchedule};
use std::sync::Arc;
use tracing::debug;

pub struct LocalBlockGenerator {
    blocks: Arc<dyn BlockStore>,
    chain: ChainProcessor,
    rewards: RewardSchedule,
    events: Arc<dyn EventPublisher>,
}

impl LocalBlockGenerator {
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        chain: ChainProcessor,
        rewards: RewardSchedule,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            blocks,
            chain,
            rewards,
            events,
        }
    }
}

#[async_trait]
impl BlockGenerator for LocalBlockGenerator {
    async fn generate_block(
        &self,
        keypair: &Ed25519KeyPair,
        timestamp: u64,
    ) -> dl_05_forging::Result<Block> {
        let tip = self
            .blocks
            .last_block()
            .await?
            .ok_or_else(|| ForgingError::Generation("chain has no blocks".into()))?;
        let timestamp = u32::try_from(timestamp)
            .map_err(|_| ForgingError::Generation(format!("timestamp {timestamp} out of range")))?;
        let height = tip.height + 1;

        let block = Block::forge(
            keypair,
            ChainTip::from(&tip),
            timestamp,
            self.rewards.reward(height),
            Vec::new(),
        )
        .map_err(|e| ForgingError::Generation(e.to_string()))?;
        debug!(height, id = %block.id, "Block generated");

        self.chain
            .process_block(block.clone())
            .await
            .map_err(|e| ForgingError::Generation(e.to_string()))?;

        self.events
            .publish(LedgerEvent::BlockForged {
                height,
                block_id: block.id,
                generator: keypair.public_key(),
            })
            .await;
        Ok(block)
    }
}
