//! # Forging Scheduler
//!
//! One [`ForgingScheduler::tick`] per poll interval. A tick either forges
//! the block for the current slot or says why it did not:
//!
//! 1. Node state gates (syncing, rounds not loaded, round tick running).
//! 2. Keys: load from the configured secrets when none are known.
//! 3. At most one block per slot.
//! 4. Slot ownership over one round of lookahead.
//! 5. The owned slot must be the current one.
//! 6. Consensus check and block generation inside the `default` sequence.

use crate::config::ForgingConfig;
use crate::domain::{
    find_slot, ForgeAbort, ForgingError, Keyring, Result, SkipReason, SlotData,
};
use crate::ports::{BlockGenerator, PeerConsensusView};
use dl_01_state::{AccountStore, BlockStore};
use dl_02_slots::{DelegateRanking, SlotClock};
use shared_bus::{NodeStateFlags, Sequence};
use shared_types::{Block, PublicKey};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Collaborators of the scheduler.
#[derive(Clone)]
pub struct ForgingDependencies {
    pub clock: SlotClock,
    pub flags: Arc<NodeStateFlags>,
    pub blocks: Arc<dyn BlockStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub ranking: Arc<dyn DelegateRanking>,
    pub generator: Arc<dyn BlockGenerator>,
    pub peers: Arc<dyn PeerConsensusView>,
    /// The `default` sequence; forging attempts never overlap.
    pub sequence: Sequence,
}

/// A block forged by this node.
#[derive(Clone, Debug)]
pub struct ForgedBlock {
    pub slot: u64,
    pub block: Block,
}

/// Whether forging is on, for one key or for the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForgingStatus {
    pub enabled: bool,
    pub delegates: Vec<PublicKey>,
}

pub struct ForgingScheduler {
    pub(crate) config: ForgingConfig,
    deps: ForgingDependencies,
    keyring: Keyring,
    last_forged_slot: Option<u64>,
}

impl ForgingScheduler {
    pub fn new(config: ForgingConfig, deps: ForgingDependencies) -> Self {
        Self {
            config,
            deps,
            keyring: Keyring::new(),
            last_forged_slot: None,
        }
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    pub fn keyring_mut(&mut self) -> &mut Keyring {
        &mut self.keyring
    }

    /// Slot of the last forging attempt.
    pub fn last_forged_slot(&self) -> Option<u64> {
        self.last_forged_slot
    }

    /// Status of `key`, or of every enabled key when `None`.
    pub fn forging_status(&self, key: Option<&PublicKey>) -> ForgingStatus {
        match key {
            Some(key) => ForgingStatus {
                enabled: self.keyring.is_enabled(key),
                delegates: vec![*key],
            },
            None => {
                let delegates = self.keyring.enabled_keys();
                ForgingStatus {
                    enabled: !delegates.is_empty(),
                    delegates,
                }
            }
        }
    }

    /// Run one scheduling step.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&mut self) -> std::result::Result<ForgedBlock, ForgeAbort> {
        let flags = &self.deps.flags;
        if flags.is_syncing() {
            return Err(SkipReason::Syncing.into());
        }
        if !flags.rounds_loaded() {
            return Err(SkipReason::RoundsNotLoaded.into());
        }
        if flags.rounds_ticking() {
            return Err(SkipReason::RoundsTicking.into());
        }

        if self.keyring.is_empty() {
            self.keyring
                .load_from_secrets(&self.config.secrets, self.deps.accounts.as_ref())
                .await
                .inspect_err(|e| error!(error = %e, "Failed to load delegates"))?;
            if self.keyring.is_empty() {
                return Err(SkipReason::NoKeypairs.into());
            }
        }

        let clock = &self.deps.clock;
        let last_block = self
            .deps
            .blocks
            .last_block()
            .await
            .map_err(ForgingError::from)?
            .ok_or(SkipReason::NoChain)?;

        let current_slot = clock.slot_number(None);
        if current_slot == clock.slot_number(Some(u64::from(last_block.timestamp)))
            || self.last_forged_slot == Some(current_slot)
        {
            return Err(SkipReason::AlreadyForged(current_slot).into());
        }

        let Some(data) = self
            .block_slot_data(current_slot, last_block.height + 1)
            .await?
        else {
            warn!(slot = current_slot, "Skipping delegate slot");
            return Err(SkipReason::NoForger.into());
        };

        let found = clock.slot_number(Some(data.time));
        if found != current_slot {
            debug!(current_slot, found, "Delegate slot is not the current one");
            return Err(SkipReason::SlotMismatch {
                current: current_slot,
                found,
            }
            .into());
        }

        self.last_forged_slot = Some(current_slot);
        let generator = data.keypair.public_key();
        match self.forge(data).await {
            Ok(block) => {
                info!(
                    height = block.height,
                    slot = current_slot,
                    %generator,
                    "Forged new block"
                );
                Ok(ForgedBlock {
                    slot: current_slot,
                    block,
                })
            }
            Err(e) => {
                error!(error = %e, slot = current_slot, "Failed to generate block within delegate slot");
                Err(ForgeAbort::Failed(e))
            }
        }
    }

    /// The slot this node may forge in, scanning from `slot`, for the block
    /// at `height`.
    pub async fn block_slot_data(&self, slot: u64, height: u64) -> Result<Option<SlotData>> {
        let ranking = self.deps.ranking.ranking_for_height(height).await?;
        Ok(find_slot(&self.deps.clock, &ranking, &self.keyring, slot, height))
    }

    async fn forge(&self, data: SlotData) -> Result<Block> {
        let peers = Arc::clone(&self.deps.peers);
        let generator = Arc::clone(&self.deps.generator);
        let max_peers = self.config.max_peers;
        let min_consensus = self.config.min_broadhash_consensus;

        let unit = async move {
            peers.refresh(max_peers).await?;
            if let Some(consensus) = peers.broadhash_consensus() {
                if consensus < min_consensus {
                    return Err(ForgingError::InadequateConsensus(consensus));
                }
            }
            generator.generate_block(&data.keypair, data.time).await
        };
        self.deps.sequence.run(unit).await?
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::FixedConsensus;
    use async_trait::async_trait;
    use dl_01_state::MemoryStore;
    use dl_02_slots::{SlotConfig, TimeSource};
    use parking_lot::Mutex;
    use shared_bus::SequenceConfig;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::Account;

    pub(crate) struct FixedTime(pub u64);

    impl TimeSource for FixedTime {
        fn now(&self) -> u64 {
            SlotConfig::default().epoch_time + self.0
        }
    }

    pub(crate) struct FixedRanking(pub Vec<PublicKey>);

    #[async_trait]
    impl DelegateRanking for FixedRanking {
        async fn ranking_for_height(&self, _height: u64) -> dl_02_slots::Result<Vec<PublicKey>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingGenerator {
        pub calls: Mutex<Vec<(PublicKey, u64)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl BlockGenerator for RecordingGenerator {
        async fn generate_block(&self, keypair: &Ed25519KeyPair, timestamp: u64) -> Result<Block> {
            self.calls.lock().push((keypair.public_key(), timestamp));
            if self.fail {
                return Err(ForgingError::Generation("disk full".into()));
            }
            let mut block = Block::genesis(keypair, Vec::new())
                .map_err(|e| ForgingError::Generation(e.to_string()))?;
            block.timestamp = u32::try_from(timestamp).unwrap();
            Ok(block)
        }
    }

    pub(crate) struct Setup {
        pub store: Arc<MemoryStore>,
        pub flags: Arc<NodeStateFlags>,
        pub generator: Arc<RecordingGenerator>,
        pub peers: Arc<FixedConsensus>,
        pub delegate: Ed25519KeyPair,
    }

    /// 97 delegates, clock in slot 97, last block in slot 98, the local
    /// delegate at `position` in the ranking.
    pub(crate) async fn scheduler(
        position: usize,
        generator: RecordingGenerator,
        secrets: Vec<String>,
    ) -> (ForgingScheduler, Setup) {
        let delegate = Ed25519KeyPair::from_secret("local delegate").unwrap();
        let mut ranking: Vec<PublicKey> = (0..97u8).map(|i| PublicKey::new([i; 32])).collect();
        ranking[position] = delegate.public_key();

        let store = Arc::new(MemoryStore::new());
        let mut account = Account::with_public_key(delegate.public_key());
        account.is_delegate = true;
        store.insert_account(account);

        let other = Ed25519KeyPair::from_secret("someone else").unwrap();
        let mut last = Block::genesis(&other, Vec::new()).unwrap();
        last.timestamp = 980;
        store.append_block(last).await.unwrap();

        let config = SlotConfig {
            active_delegates: 97,
            ..SlotConfig::default()
        };
        let clock = SlotClock::new(config, Arc::new(FixedTime(975))).unwrap();
        let flags = Arc::new(NodeStateFlags::new());
        flags.set_rounds_loaded(true);
        let generator = Arc::new(generator);
        let peers = Arc::new(FixedConsensus::new(Some(100.0)));

        let deps = ForgingDependencies {
            clock,
            flags: flags.clone(),
            blocks: store.clone(),
            accounts: store.clone(),
            ranking: Arc::new(FixedRanking(ranking)),
            generator: generator.clone(),
            peers: peers.clone(),
            sequence: Sequence::spawn("default", &SequenceConfig::default()),
        };
        let config = ForgingConfig {
            secrets,
            ..ForgingConfig::default()
        };
        let scheduler = ForgingScheduler::new(config, deps);
        (
            scheduler,
            Setup {
                store,
                flags,
                generator,
                peers,
                delegate,
            },
        )
    }

    fn enabled(mut scheduler: ForgingScheduler, setup: &Setup) -> ForgingScheduler {
        scheduler
            .keyring_mut()
            .enable(Some(setup.delegate.clone()));
        scheduler
    }

    #[tokio::test]
    async fn test_block_slot_data_current_slot() {
        let (scheduler, setup) = scheduler(0, RecordingGenerator::default(), Vec::new()).await;
        let scheduler = enabled(scheduler, &setup);

        let data = scheduler.block_slot_data(97, 2).await.unwrap().unwrap();
        assert_eq!(data.slot, 97);
        assert_eq!(data.time, 970);
        assert_eq!(data.keypair.public_key(), setup.delegate.public_key());
    }

    #[tokio::test]
    async fn test_forges_once_per_slot() {
        let (scheduler, setup) = scheduler(0, RecordingGenerator::default(), Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);

        let forged = scheduler.tick().await.unwrap();
        assert_eq!(forged.slot, 97);
        assert_eq!(forged.block.timestamp, 970);

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::AlreadyForged(97))
        );
        assert_eq!(
            setup.generator.calls.lock().clone(),
            vec![(setup.delegate.public_key(), 970)]
        );
        assert_eq!(scheduler.last_forged_slot(), Some(97));
    }

    #[tokio::test]
    async fn test_state_gates() {
        let (scheduler, setup) = scheduler(0, RecordingGenerator::default(), Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);

        setup.flags.set_syncing(true);
        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::Syncing)
        );
        setup.flags.set_syncing(false);

        setup.flags.set_rounds_loaded(false);
        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::RoundsNotLoaded)
        );
        setup.flags.set_rounds_loaded(true);

        {
            let _ticking = setup.flags.ticking();
            assert_eq!(
                scheduler.tick().await.unwrap_err(),
                ForgeAbort::Skipped(SkipReason::RoundsTicking)
            );
        }

        assert!(setup.generator.calls.lock().is_empty());
        assert!(scheduler.tick().await.is_ok());
    }

    #[tokio::test]
    async fn test_no_keys_without_secrets() {
        let (mut scheduler, setup) =
            scheduler(0, RecordingGenerator::default(), Vec::new()).await;

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::NoKeypairs)
        );
        assert!(setup.generator.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_loads_keys_from_secrets() {
        let (mut scheduler, setup) = scheduler(
            0,
            RecordingGenerator::default(),
            vec!["local delegate".into()],
        )
        .await;

        assert!(scheduler.tick().await.is_ok());
        assert_eq!(
            scheduler.forging_status(None),
            ForgingStatus {
                enabled: true,
                delegates: vec![setup.delegate.public_key()],
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_secret_fails_tick() {
        let (mut scheduler, _setup) = scheduler(
            0,
            RecordingGenerator::default(),
            vec!["nobody".into()],
        )
        .await;

        let abort = scheduler.tick().await.unwrap_err();
        assert!(matches!(
            abort,
            ForgeAbort::Failed(ForgingError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_poor_consensus_rejected() {
        let (scheduler, setup) = scheduler(0, RecordingGenerator::default(), Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);
        setup.peers.set(Some(10.0));

        let abort = scheduler.tick().await.unwrap_err();
        assert_eq!(
            abort,
            ForgeAbort::Failed(ForgingError::InadequateConsensus(10.0))
        );
        assert!(abort
            .to_string()
            .contains("Inadequate broadhash consensus 10 %"));
        assert!(setup.generator.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_not_our_slot() {
        let (scheduler, setup) = scheduler(0, RecordingGenerator::default(), Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);
        scheduler.keyring_mut().disable(None);
        scheduler
            .keyring_mut()
            .enable(Some(Ed25519KeyPair::from_secret("unranked").unwrap()));

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::NoForger)
        );
    }

    #[tokio::test]
    async fn test_later_slot_is_not_forged_now() {
        let (scheduler, setup) = scheduler(3, RecordingGenerator::default(), Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::SlotMismatch {
                current: 97,
                found: 100
            })
        );
        assert!(setup.generator.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_is_reported() {
        let failing = RecordingGenerator {
            fail: true,
            ..RecordingGenerator::default()
        };
        let (scheduler, setup) = scheduler(0, failing, Vec::new()).await;
        let mut scheduler = enabled(scheduler, &setup);

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Failed(ForgingError::Generation("disk full".into()))
        );
        // the slot is spent even though generation failed
        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::AlreadyForged(97))
        );
        assert_eq!(setup.generator.calls.lock().len(), 1);
        assert!(setup.store.last_block().await.unwrap().is_some());
    }
}
