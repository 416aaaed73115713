//! # Round Controller
//!
//! Runs a [`RoundScope`] for every applied or removed block. The rounds
//! ticking flag is held for the whole tick so the forging scheduler stays
//! out, and it is released on every exit path.
//!
//! Round numbers, round ends and the fee divisor all come from the slot
//! clock, the same height table that tags round-vote records and ranks
//! the forgers.

use crate::config::RoundConfig;
use crate::domain::{
    bootstrap_summary, compute_outsiders, finishes_round_backward, finishes_round_forward,
    Direction, Result, RoundError, RoundScope,
};
use dl_01_state::{RoundStore, RoundSummary, StorageTransaction};
use dl_02_slots::{DelegateRanking, SlotClock};
use shared_bus::{EventPublisher, LedgerEvent, NodeStateFlags};
use shared_types::Block;
use std::sync::Arc;
use tracing::{debug, info};

/// Collaborators of the round controller.
#[derive(Clone)]
pub struct RoundDependencies {
    pub rounds: Arc<dyn RoundStore>,
    pub storage: Arc<dyn StorageTransaction>,
    pub ranking: Arc<dyn DelegateRanking>,
    pub events: Arc<dyn EventPublisher>,
    pub flags: Arc<NodeStateFlags>,
    pub clock: SlotClock,
}

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundTick {
    pub round: u64,
    pub finished: bool,
    /// Ops committed.
    pub ops: usize,
}

pub struct RoundController {
    config: RoundConfig,
    deps: RoundDependencies,
}

impl RoundController {
    /// Validates `config` and seeds the snapshot round flag from it.
    pub fn new(config: RoundConfig, deps: RoundDependencies) -> Result<Self> {
        if config.snapshot_round == Some(0) {
            return Err(RoundError::InvalidConfig(
                "snapshot round must be positive".into(),
            ));
        }
        if config.snapshot_round.is_some() {
            deps.flags.set_snapshot_round(config.snapshot_round);
        }
        Ok(Self { config, deps })
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Account for `block` having been applied.
    #[tracing::instrument(skip(self, block), fields(height = block.height))]
    pub async fn tick(&self, block: &Block) -> Result<RoundTick> {
        let finish = finishes_round_forward(block.height, |h| self.deps.clock.round_of(h));
        self.run(block, Direction::Forward, finish).await
    }

    /// Account for `block` being removed; `previous` is its parent.
    #[tracing::instrument(skip(self, block, previous), fields(height = block.height))]
    pub async fn backward_tick(&self, block: &Block, previous: &Block) -> Result<RoundTick> {
        if previous.height + 1 != block.height {
            return Err(RoundError::NotConsecutive {
                height: block.height,
                previous: previous.height,
            });
        }
        let finish = finishes_round_backward(block.height, previous.height, |h| {
            self.deps.clock.round_of(h)
        });
        self.run(block, Direction::Backward, finish).await
    }

    async fn run(&self, block: &Block, direction: Direction, finish: bool) -> Result<RoundTick> {
        let _ticking = self.deps.flags.ticking();

        let scope = self.scope(block, direction, finish).await?;
        let batch = scope.ops()?;
        let ops = batch.len();
        self.deps.storage.commit(batch).await?;
        debug!(round = scope.round, ops, ?direction, "Round tick committed");

        if direction == Direction::Forward && finish {
            if scope.finishes_snapshot() {
                info!(round = scope.round, "Snapshot round finished");
                self.deps
                    .events
                    .publish(LedgerEvent::SnapshotFinished { round: scope.round })
                    .await;
            }
            info!(round = scope.round, "Round finished");
            self.deps
                .events
                .publish(LedgerEvent::FinishRound { round: scope.round })
                .await;
        }

        Ok(RoundTick {
            round: scope.round,
            finished: finish,
            ops,
        })
    }

    async fn scope(&self, block: &Block, direction: Direction, finish: bool) -> Result<RoundScope> {
        let clock = &self.deps.clock;
        let active_delegates = clock.num_delegates(Some(block.height));
        let round = clock.round_of(block.height);

        let (summary, outsiders) = if finish {
            let summary = if block.height == 1 {
                bootstrap_summary(block.generator_public_key)
            } else {
                self.deps
                    .rounds
                    .sum_round(clock.round_heights(block.height))
                    .await?
            };
            let ranking = self.deps.ranking.ranking_for_height(block.height).await?;
            let outsiders = compute_outsiders(&ranking, &summary.delegates);
            (summary, outsiders)
        } else {
            (RoundSummary::default(), Vec::new())
        };

        Ok(RoundScope {
            block_id: block.id,
            height: block.height,
            generator: block.generator_public_key,
            round,
            direction,
            finish_round: finish,
            snapshot_due: finishes_round_forward(block.height + 1, |h| clock.round_of(h)),
            active_delegates,
            summary,
            outsiders,
            snapshot_round: self.deps.flags.snapshot_round(),
        })
    }
}
