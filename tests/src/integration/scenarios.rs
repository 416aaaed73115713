//! # Ledger Scenarios
//!
//! End-to-end behaviour across the ledger crates:
//!
//! 1. **Slots**: the shuffled active set decides who forges, and the
//!    scheduler forges only in the owner's current slot
//! 2. **Transfers**: confirmed send and its undo on the shared store
//! 3. **Rounds**: a full 101-block round closes with an even fee split,
//!    the truncated remainder going to the last generator
//! 4. **Consensus**: poor broadhash consensus refuses to forge

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dl_01_state::{BlockStore, MemoryStore};
    use dl_02_slots::{AccountStoreDelegates, DelegateRanking, ShuffledRanking};
    use dl_05_forging::{
        FixedConsensus, ForgeAbort, ForgingConfig, ForgingDependencies, ForgingError,
        ForgingScheduler, SkipReason,
    };
    use shared_bus::{sequences, EventFilter, LedgerEvent, NodeStateFlags, Sequence, SequenceConfig};
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{Address, Amount, Block, PublicKey, TransactionAsset};

    use crate::fixtures::{
        block_at, clock_at, delegate_account, delegate_keys, funded, signed, Ledger,
        RecordingGenerator,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// 97 registered delegates, clock in slot 97, last block in slot 98.
    struct Network {
        store: Arc<MemoryStore>,
        keys: Vec<Ed25519KeyPair>,
        ranking: Arc<dyn DelegateRanking>,
    }

    async fn network() -> Network {
        let store = Arc::new(MemoryStore::new());
        let keys = delegate_keys(97);
        for (i, keypair) in keys.iter().enumerate() {
            store.insert_account(delegate_account(keypair, &format!("delegate_{i}")));
        }

        let outsider = Ed25519KeyPair::from_secret("outsider").unwrap();
        let mut last = Block::genesis(&outsider, Vec::new()).unwrap();
        last.timestamp = 980;
        store.append_block(last).await.unwrap();

        let ranking = Arc::new(ShuffledRanking::new(
            AccountStoreDelegates::new(store.clone()),
            clock_at(975, 97),
        ));
        Network {
            store,
            keys,
            ranking,
        }
    }

    impl Network {
        fn keypair(&self, key: &PublicKey) -> Ed25519KeyPair {
            self.keys
                .iter()
                .find(|k| k.public_key() == *key)
                .cloned()
                .unwrap()
        }

        fn scheduler(
            &self,
            consensus: Option<f64>,
        ) -> (ForgingScheduler, Arc<RecordingGenerator>, Arc<FixedConsensus>) {
            let flags = Arc::new(NodeStateFlags::new());
            flags.set_rounds_loaded(true);
            let generator = Arc::new(RecordingGenerator::default());
            let peers = Arc::new(FixedConsensus::new(consensus));

            let deps = ForgingDependencies {
                clock: clock_at(975, 97),
                flags,
                blocks: self.store.clone(),
                accounts: self.store.clone(),
                ranking: self.ranking.clone(),
                generator: generator.clone(),
                peers: peers.clone(),
                sequence: Sequence::spawn(sequences::DEFAULT, &SequenceConfig::default()),
            };
            let scheduler = ForgingScheduler::new(ForgingConfig::default(), deps);
            (scheduler, generator, peers)
        }
    }

    // =============================================================================
    // SLOTS
    // =============================================================================

    #[tokio::test]
    async fn test_owner_of_current_slot_forges() {
        let net = network().await;
        let ranking = net.ranking.ranking_for_height(2).await.unwrap();
        assert_eq!(ranking.len(), 97);
        let owner = net.keypair(&ranking[0]);

        let (mut scheduler, generator, _) = net.scheduler(Some(100.0));
        scheduler.keyring_mut().enable(Some(owner.clone()));

        let data = scheduler.block_slot_data(97, 2).await.unwrap().unwrap();
        assert_eq!(data.slot, 97);
        assert_eq!(data.time, 970);
        assert_eq!(data.keypair.public_key(), owner.public_key());

        let forged = scheduler.tick().await.unwrap();
        assert_eq!(forged.slot, 97);
        assert_eq!(*generator.calls.lock(), vec![(owner.public_key(), 970)]);
    }

    #[tokio::test]
    async fn test_later_slot_owner_waits() {
        let net = network().await;
        let ranking = net.ranking.ranking_for_height(2).await.unwrap();
        let owner = net.keypair(&ranking[5]);

        let (mut scheduler, generator, _) = net.scheduler(Some(100.0));
        scheduler.keyring_mut().enable(Some(owner));

        let data = scheduler.block_slot_data(97, 2).await.unwrap().unwrap();
        assert_eq!(data.slot, 102);
        assert_eq!(data.time, 1020);

        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::SlotMismatch {
                current: 97,
                found: 102
            })
        );
        assert!(generator.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_ranking_follows_round() {
        let net = network().await;

        let first = net.ranking.ranking_for_height(2).await.unwrap();
        let same_round = net.ranking.ranking_for_height(97).await.unwrap();
        let next_round = net.ranking.ranking_for_height(98).await.unwrap();

        assert_eq!(first, same_round);
        assert_ne!(first, next_round);
        let mut a = first.clone();
        let mut b = next_round.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    // =============================================================================
    // TRANSFERS
    // =============================================================================

    #[tokio::test]
    async fn test_send_and_undo_on_shared_store() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, sender) = funded("alice", 10_000_000);
        ledger.store.insert_account(sender.clone());
        let recipient = Address::new(77);
        let tx = signed(&keypair, TransactionAsset::Send, Some(recipient), 100, 10);
        let block = block_at(5);

        ledger
            .applier
            .apply_confirmed(&tx, &block, &sender)
            .await
            .unwrap();
        assert_eq!(ledger.account(sender.address).balance, Amount::new(9_999_890));
        assert_eq!(ledger.account(recipient).balance, Amount::new(100));

        let current = ledger.account(sender.address);
        ledger
            .applier
            .undo_confirmed(&tx, &block, &current)
            .await
            .unwrap();
        assert_eq!(ledger.account(sender.address).balance, Amount::new(10_000_000));
        assert_eq!(ledger.account(recipient).balance, Amount::ZERO);
    }

    // =============================================================================
    // ROUNDS
    // =============================================================================

    #[tokio::test]
    async fn test_full_round_splits_fees_evenly() {
        let keys = delegate_keys(101);
        let ledger = Ledger::new(101, keys.iter().map(|k| k.public_key()).collect());
        let mut events = ledger.bus.subscribe(EventFilter::all());

        let generators: Vec<&Ed25519KeyPair> = keys.iter().collect();
        let mut fees = vec![0; 101];
        fees[1] = 102;
        let rewards = vec![Amount::coins(5).units(); 101];
        let blocks = ledger.append_chain(&generators, &fees, &rewards).await;

        for block in &blocks[1..100] {
            let tick = ledger.rounds.tick(block).await.unwrap();
            assert!(!tick.finished);
        }
        let tick = ledger.rounds.tick(&blocks[100]).await.unwrap();
        assert!(tick.finished);
        assert_eq!(tick.round, 1);
        assert_eq!(
            events.try_recv().unwrap(),
            Some(LedgerEvent::FinishRound { round: 1 })
        );

        // 102 over 101 delegates: 1 each, remainder 1 to the last generator
        let genesis = ledger.account_of(&keys[0].public_key());
        assert_eq!(genesis.balance, Amount::new(1));
        assert_eq!(genesis.rewards, Amount::ZERO);

        let middle = ledger.account_of(&keys[50].public_key());
        assert_eq!(middle.fees, Amount::new(1));
        assert_eq!(middle.rewards, Amount::coins(5));
        assert_eq!(middle.balance, Amount::new(Amount::coins(5).units() + 1));
        assert_eq!(middle.produced_blocks, 1);
        assert_eq!(middle.missed_blocks, 0);

        let last = ledger.account_of(&keys[100].public_key());
        assert_eq!(last.fees, Amount::new(2));
        assert_eq!(last.balance, Amount::new(Amount::coins(5).units() + 2));
        assert_eq!(last.u_balance, last.balance);

        let paid: u64 = keys
            .iter()
            .map(|k| ledger.account_of(&k.public_key()).balance.units())
            .sum();
        assert_eq!(paid, 102 + 100 * Amount::coins(5).units());
        assert!(!ledger.flags.rounds_ticking());
    }

    // =============================================================================
    // CONSENSUS
    // =============================================================================

    #[tokio::test]
    async fn test_poor_consensus_refuses_to_forge() {
        let net = network().await;
        let ranking = net.ranking.ranking_for_height(2).await.unwrap();
        let owner = net.keypair(&ranking[0]);

        let (mut scheduler, generator, peers) = net.scheduler(Some(10.0));
        scheduler.keyring_mut().enable(Some(owner));

        let err = scheduler.tick().await.unwrap_err();
        assert_eq!(
            err,
            ForgeAbort::Failed(ForgingError::InadequateConsensus(10.0))
        );
        assert_eq!(err.to_string(), "Inadequate broadhash consensus 10 %");
        assert!(generator.calls.lock().is_empty());

        // the slot is spent even after consensus recovers
        peers.set(Some(100.0));
        assert_eq!(
            scheduler.tick().await.unwrap_err(),
            ForgeAbort::Skipped(SkipReason::AlreadyForged(97))
        );
        assert_eq!(net.store.last_block().await.unwrap().unwrap().height, 1);
    }
}
