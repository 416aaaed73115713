//! # Shared Test Fixtures
//!
//! Fixed clocks, delegate keys and a ledger harness wiring one
//! [`MemoryStore`] behind the transaction applier and the round controller.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use dl_01_state::{BlockStore, MemoryStore};
use dl_02_slots::{DelegateRanking, SlotClock, SlotConfig, TimeSource};
use dl_03_transactions::{
    signing, LedgerPorts, TransactionApplier, TransactionConfig, TransactionLogic,
};
use dl_04_rounds::{RoundConfig, RoundController, RoundDependencies};
use dl_05_forging::{BlockGenerator, ForgingError};
use shared_bus::{InMemoryEventBus, NodeStateFlags};
use shared_crypto::Ed25519KeyPair;
use shared_types::constants::EPOCH_TIME;
use shared_types::{Account, Address, Amount, Block, ChainTip, PublicKey, Transaction, TransactionAsset};

// =============================================================================
// CLOCKS
// =============================================================================

/// Reads `EPOCH_TIME + offset`.
pub struct FixedTime(pub u64);

impl TimeSource for FixedTime {
    fn now(&self) -> u64 {
        EPOCH_TIME + self.0
    }
}

/// Clock `offset` seconds into the epoch with `delegates` per round.
pub fn clock_at(offset: u64, delegates: u64) -> SlotClock {
    let config = SlotConfig {
        active_delegates: delegates,
        ..SlotConfig::default()
    };
    SlotClock::new(config, Arc::new(FixedTime(offset))).unwrap()
}

// =============================================================================
// DELEGATES
// =============================================================================

/// Keypairs for `"delegate 0"` .. `"delegate {count-1}"`.
pub fn delegate_keys(count: usize) -> Vec<Ed25519KeyPair> {
    (0..count)
        .map(|i| Ed25519KeyPair::from_secret(&format!("delegate {i}")).unwrap())
        .collect()
}

/// Registered delegate account owned by `keypair`.
pub fn delegate_account(keypair: &Ed25519KeyPair, username: &str) -> Account {
    let mut account = Account::with_public_key(keypair.public_key());
    account.is_delegate = true;
    account.u_is_delegate = true;
    account.username = Some(username.to_string());
    account.u_username = Some(username.to_string());
    account
}

/// Account owned by `secret` holding `balance` on both tracks.
pub fn funded(secret: &str, balance: u64) -> (Ed25519KeyPair, Account) {
    let keypair = Ed25519KeyPair::from_secret(secret).unwrap();
    let mut account = Account::with_public_key(keypair.public_key());
    account.balance = Amount::new(balance);
    account.u_balance = Amount::new(balance);
    (keypair, account)
}

/// Ranking that ignores height.
pub struct FixedRanking(pub Vec<PublicKey>);

#[async_trait]
impl DelegateRanking for FixedRanking {
    async fn ranking_for_height(&self, _height: u64) -> dl_02_slots::Result<Vec<PublicKey>> {
        Ok(self.0.clone())
    }
}

/// Block generator that records its calls and returns an unstored block.
#[derive(Default)]
pub struct RecordingGenerator {
    pub calls: Mutex<Vec<(PublicKey, u64)>>,
}

#[async_trait]
impl BlockGenerator for RecordingGenerator {
    async fn generate_block(
        &self,
        keypair: &Ed25519KeyPair,
        timestamp: u64,
    ) -> dl_05_forging::Result<Block> {
        self.calls.lock().push((keypair.public_key(), timestamp));
        let mut block = Block::genesis(keypair, Vec::new())
            .map_err(|e| ForgingError::Generation(e.to_string()))?;
        block.timestamp = u32::try_from(timestamp).unwrap();
        Ok(block)
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Signed transaction with its id set.
pub fn signed(
    keypair: &Ed25519KeyPair,
    asset: TransactionAsset,
    recipient: Option<Address>,
    amount: u64,
    fee: u64,
) -> Transaction {
    let mut tx = Transaction::new(asset, keypair.public_key(), 100);
    tx.recipient_id = recipient;
    tx.amount = Amount::new(amount);
    tx.fee = Amount::new(fee);
    tx.signature = Some(signing::sign(keypair, &tx));
    tx.id = Some(tx.compute_id());
    tx
}

// =============================================================================
// LEDGER HARNESS
// =============================================================================

/// One store behind a transaction applier and a round controller.
pub struct Ledger {
    pub store: Arc<MemoryStore>,
    pub flags: Arc<NodeStateFlags>,
    pub bus: Arc<InMemoryEventBus>,
    pub applier: TransactionApplier,
    pub rounds: RoundController,
}

impl Ledger {
    /// `delegates` blocks per round, ranked as given.
    pub fn new(delegates: u64, ranking: Vec<PublicKey>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let flags = Arc::new(NodeStateFlags::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let clock = clock_at(1_000_000, delegates);
        let logic = TransactionLogic::new(
            TransactionConfig::default(),
            clock.clone(),
            LedgerPorts::from_store(store.clone()),
        );
        let applier = TransactionApplier::new(Arc::new(logic));

        let rounds = RoundController::new(
            RoundConfig::default(),
            RoundDependencies {
                rounds: store.clone(),
                storage: store.clone(),
                ranking: Arc::new(FixedRanking(ranking)),
                events: bus.clone(),
                flags: flags.clone(),
                clock,
            },
        )
        .unwrap();

        Self {
            store,
            flags,
            bus,
            applier,
            rounds,
        }
    }

    /// Stored account at `address`, or a fresh one.
    pub fn account(&self, address: Address) -> Account {
        self.store
            .account(address)
            .unwrap_or_else(|| Account::new(address))
    }

    /// Stored account of `key`, or a fresh one.
    pub fn account_of(&self, key: &PublicKey) -> Account {
        self.account(Address::from_public_key(key))
    }

    /// Append a chain forged by `generators` in turn, with per-block fees
    /// and rewards. Returns the blocks, genesis first.
    pub async fn append_chain(
        &self,
        generators: &[&Ed25519KeyPair],
        fees: &[u64],
        rewards: &[u64],
    ) -> Vec<Block> {
        let mut blocks = vec![Block::genesis(generators[0], Vec::new()).unwrap()];
        for (i, keypair) in generators.iter().enumerate().skip(1) {
            let tip = ChainTip::from(blocks.last().unwrap());
            let reward = Amount::new(rewards.get(i).copied().unwrap_or(0));
            let mut block = Block::forge(keypair, tip, tip.timestamp + 10, reward, Vec::new()).unwrap();
            block.total_fee = Amount::new(fees.get(i).copied().unwrap_or(0));
            blocks.push(block);
        }
        for block in &blocks {
            self.store.append_block(block.clone()).await.unwrap();
        }
        blocks
    }
}

/// Block at `height` signed by a fixed generator, for applier calls.
pub fn block_at(height: u64) -> Block {
    let generator = Ed25519KeyPair::from_secret("generator").unwrap();
    let mut block = Block::genesis(&generator, Vec::new()).unwrap();
    block.height = height;
    block
}

/// Account fields the round engine touches.
pub fn round_fields(account: &Account) -> (Amount, Amount, Amount, Amount, u64, u64) {
    (
        account.balance,
        account.u_balance,
        account.fees,
        account.rewards,
        account.produced_blocks,
        account.missed_blocks,
    )
}

/// `account` with the last touching block cleared, for comparisons across
/// apply and undo.
pub fn without_block_id(mut account: Account) -> Account {
    account.block_id = None;
    account
}
