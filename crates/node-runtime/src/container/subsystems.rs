//! # Ledger Container
//!
//! Holds every ledger subsystem of a single node and wires them over one
//! in-memory store.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: store, event bus, node state flags, slot clock
//! Level 1: genesis accounts, transaction logic, delegate ranking
//! Level 2: round controller, `balances` sequence, chain processor
//! Level 3: genesis block applied, rounds loaded, BlockchainReady
//! Level 4: forging scheduler (built on demand)
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use dl_01_state::{AccountStore, BlockStore, MemoryStore};
use dl_02_slots::{
    AccountStoreDelegates, DelegateRanking, ShuffledRanking, SlotClock, SlotError, TimeSource,
};
use dl_03_transactions::{LedgerPorts, TransactionApplier, TransactionLogic, TransactionValidator};
use dl_04_rounds::{RoundController, RoundDependencies, RoundError};
use dl_05_forging::{FixedConsensus, ForgingDependencies, ForgingScheduler};
use shared_bus::{sequences, EventPublisher, InMemoryEventBus, LedgerEvent, NodeStateFlags, Sequence};
use shared_crypto::{CryptoError, Ed25519KeyPair};
use shared_types::RewardSchedule;

use crate::adapters::LocalBlockGenerator;
use crate::container::config::NodeConfig;
use crate::genesis::{GenesisBuilder, GenesisError};
use crate::handlers::{ChainError, ChainProcessor};

/// Node startup errors.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Round(#[from] RoundError),

    #[error("Failed to apply genesis block: {0}")]
    Chain(#[from] ChainError),
}

/// Every subsystem of a running node.
pub struct LedgerContainer {
    pub config: NodeConfig,
    pub store: Arc<MemoryStore>,
    pub event_bus: Arc<InMemoryEventBus>,
    pub flags: Arc<NodeStateFlags>,
    pub clock: SlotClock,
    pub ranking: Arc<dyn DelegateRanking>,
    pub validator: TransactionValidator,
    pub applier: TransactionApplier,
    pub chain: ChainProcessor,
    /// Forging attempts.
    pub default_sequence: Sequence,
}

impl LedgerContainer {
    /// Build every subsystem and apply the genesis block. Must be called
    /// from within a Tokio runtime.
    #[instrument(skip_all)]
    pub async fn bootstrap(
        config: NodeConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, NodeError> {
        let clock = SlotClock::new(config.slots.clone(), time)?;
        let store = Arc::new(MemoryStore::new());
        let event_bus = Arc::new(InMemoryEventBus::new());
        let flags = Arc::new(NodeStateFlags::new());

        let forging_keys = config
            .forging
            .secrets
            .iter()
            .map(|secret| Ed25519KeyPair::from_secret(secret).map(|k| k.public_key()))
            .collect::<Result<Vec<_>, _>>()?;
        let genesis = GenesisBuilder::new(config.genesis.clone())
            .with_forging_keys(forging_keys)
            .build()?;
        for account in &genesis.accounts {
            store.insert_account(account.clone());
        }
        info!(
            id = %genesis.block.id,
            delegates = genesis.accounts.len(),
            "Genesis state created"
        );

        let mut transactions = config.transactions.clone();
        transactions.genesis_block_id.get_or_insert(genesis.block.id);
        transactions
            .genesis_public_key
            .get_or_insert(genesis.block.generator_public_key);
        let logic = Arc::new(TransactionLogic::new(
            transactions,
            clock.clone(),
            LedgerPorts::from_store(store.clone()),
        ));
        let validator = TransactionValidator::new(logic.clone());
        let applier = TransactionApplier::new(logic);

        let ranking: Arc<dyn DelegateRanking> = Arc::new(ShuffledRanking::new(
            AccountStoreDelegates::new(store.clone()),
            clock.clone(),
        ));
        let rounds = RoundController::new(
            config.rounds.clone(),
            RoundDependencies {
                rounds: store.clone(),
                storage: store.clone(),
                ranking: ranking.clone(),
                events: event_bus.clone(),
                flags: flags.clone(),
                clock: clock.clone(),
            },
        )?;

        let chain = ChainProcessor::new(
            store.clone(),
            store.clone(),
            validator.clone(),
            applier.clone(),
            rounds,
            Sequence::spawn(sequences::BALANCES, &config.sequence),
        );
        chain.process_block(genesis.block).await?;

        flags.set_rounds_loaded(true);
        event_bus.publish(LedgerEvent::BlockchainReady).await;
        info!("Blockchain ready");

        let default_sequence = Sequence::spawn(sequences::DEFAULT, &config.sequence);
        Ok(Self {
            config,
            store,
            event_bus,
            flags,
            clock,
            ranking,
            validator,
            applier,
            chain,
            default_sequence,
        })
    }

    /// Scheduler forging empty blocks onto this node's chain. Without peers
    /// the broadhash consensus is unknown and never blocks forging.
    pub fn forging_scheduler(&self) -> ForgingScheduler {
        let blocks: Arc<dyn BlockStore> = self.store.clone();
        let accounts: Arc<dyn AccountStore> = self.store.clone();
        let generator = LocalBlockGenerator::new(
            blocks.clone(),
            self.chain.clone(),
            RewardSchedule::default(),
            self.event_bus.clone(),
        );

        ForgingScheduler::new(
            self.config.forging.clone(),
            ForgingDependencies {
                clock: self.clock.clone(),
                flags: self.flags.clone(),
                blocks,
                accounts,
                ranking: self.ranking.clone(),
                generator: Arc::new(generator),
                peers: Arc::new(FixedConsensus::new(None)),
                sequence: self.default_sequence.clone(),
            },
        )
    }
}
