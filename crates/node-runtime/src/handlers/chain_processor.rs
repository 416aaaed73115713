//! # Chain Processor
//!
//! Appends and removes blocks inside the `balances` sequence, so block
//! application and round ticks never interleave.
//!
//! ## Forward
//!
//! 1. Verify every transaction against its sender
//! 2. Apply them on the confirmed track
//! 3. Store the block
//! 4. Round tick
//!
//! A failure undoes whatever was already applied, in reverse order.
//!
//! ## Backward
//!
//! Undo transactions last to first, backward round tick, then drop the
//! block.

use dl_01_state::{AccountFilter, AccountStore, BlockStore, StateError};
use dl_03_transactions::{TransactionApplier, TransactionError, TransactionValidator};
use dl_04_rounds::{RoundController, RoundError, RoundTick};
use shared_bus::{Sequence, SequenceError};
use shared_types::{Account, Address, Block, PublicKey, Transaction};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Round(#[from] RoundError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("Unknown requester {0}")]
    UnknownRequester(PublicKey),

    #[error("Parent of block at height {0} not found")]
    MissingParent(u64),

    #[error("Cannot remove the genesis block")]
    GenesisRemoval,
}

pub type ChainResult<T> = Result<T, ChainError>;

struct ChainState {
    blocks: Arc<dyn BlockStore>,
    accounts: Arc<dyn AccountStore>,
    validator: TransactionValidator,
    applier: TransactionApplier,
    rounds: RoundController,
}

/// Block application in the `balances` sequence. Cheap to clone.
#[derive(Clone)]
pub struct ChainProcessor {
    state: Arc<ChainState>,
    sequence: Sequence,
}

impl ChainProcessor {
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        accounts: Arc<dyn AccountStore>,
        validator: TransactionValidator,
        applier: TransactionApplier,
        rounds: RoundController,
        sequence: Sequence,
    ) -> Self {
        Self {
            state: Arc::new(ChainState {
                blocks,
                accounts,
                validator,
                applier,
                rounds,
            }),
            sequence,
        }
    }

    /// Append `block` on top of the chain.
    pub async fn process_block(&self, block: Block) -> ChainResult<RoundTick> {
        let state = Arc::clone(&self.state);
        self.sequence.run(async move { state.apply(block).await }).await?
    }

    /// Remove the last block; returns it with its backward tick.
    pub async fn pop_last_block(&self) -> ChainResult<(Block, RoundTick)> {
        let state = Arc::clone(&self.state);
        self.sequence.run(async move { state.pop().await }).await?
    }
}

impl ChainState {
    #[tracing::instrument(skip(self, block), fields(height = block.height, id = %block.id))]
    async fn apply(&self, block: Block) -> ChainResult<RoundTick> {
        for tx in &block.transactions {
            let sender = self.sender(&tx.sender_public_key).await?;
            let requester = match &tx.requester_public_key {
                Some(key) => Some(self.requester(key).await?),
                None => None,
            };
            self.validator
                .verify(tx, Some(&sender), requester.as_ref(), block.height)
                .await?;
        }

        let mut applied: Vec<&Transaction> = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let result = match self.sender(&tx.sender_public_key).await {
                Ok(sender) => self
                    .applier
                    .apply_confirmed(tx, &block, &sender)
                    .await
                    .map_err(ChainError::from),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(error = %e, "Block application failed, undoing");
                self.undo_all(&applied, &block).await;
                return Err(e);
            }
            applied.push(tx);
        }

        if let Err(e) = self.blocks.append_block(block.clone()).await {
            self.undo_all(&applied, &block).await;
            return Err(e.into());
        }

        match self.rounds.tick(&block).await {
            Ok(tick) => {
                info!(round = tick.round, "Block applied");
                Ok(tick)
            }
            Err(e) => {
                error!(error = %e, "Round tick failed, removing block");
                if let Err(pop) = self.blocks.pop_block().await {
                    error!(error = %pop, "Failed to remove block after round failure");
                }
                self.undo_all(&applied, &block).await;
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn pop(&self) -> ChainResult<(Block, RoundTick)> {
        let block = self
            .blocks
            .last_block()
            .await?
            .ok_or(StateError::EmptyChain)?;
        if block.height <= 1 {
            return Err(ChainError::GenesisRemoval);
        }
        let previous = self
            .blocks
            .block_at_height(block.height - 1)
            .await?
            .ok_or(ChainError::MissingParent(block.height))?;

        for tx in block.transactions.iter().rev() {
            let sender = self.sender(&tx.sender_public_key).await?;
            self.applier.undo_confirmed(tx, &block, &sender).await?;
        }

        let tick = self.rounds.backward_tick(&block, &previous).await?;
        self.blocks.pop_block().await?;
        info!(height = block.height, round = tick.round, "Block removed");
        Ok((block, tick))
    }

    /// Sender account, created with its key on first use.
    async fn sender(&self, key: &PublicKey) -> ChainResult<Account> {
        Ok(self
            .accounts
            .set_and_get(Address::from_public_key(key), Some(*key))
            .await?)
    }

    async fn requester(&self, key: &PublicKey) -> ChainResult<Account> {
        self.accounts
            .get(&AccountFilter::PublicKey(*key))
            .await?
            .ok_or(ChainError::UnknownRequester(*key))
    }

    async fn undo_all(&self, applied: &[&Transaction], block: &Block) {
        for tx in applied.iter().rev() {
            let undone = match self.sender(&tx.sender_public_key).await {
                Ok(sender) => self
                    .applier
                    .undo_confirmed(tx, block, &sender)
                    .await
                    .map_err(ChainError::from),
                Err(e) => Err(e),
            };
            if let Err(e) = undone {
                error!(error = %e, tx = ?tx.id, "Failed to undo transaction");
            }
        }
    }
}
