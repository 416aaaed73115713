//! # Transaction Logic
//!
//! Everything about a transaction that does not change account state:
//! canonical bytes, ids, signing, fees, readiness, balance sufficiency and
//! the record rows saved with a block.

use crate::config::TransactionConfig;
use crate::domain::{
    check_balance, signing, BalanceCheck, FeeSchedule, PendingRegistry, Result, TransactionError,
};
use crate::kinds::{self, KindContext};
use crate::ports::LedgerPorts;
use dl_02_slots::SlotClock;
use shared_crypto::{Ed25519KeyPair, Hash};
use shared_types::{
    Account, Amount, BalanceTrack, LedgerError, LedgerOp, PublicKey, Signature, Transaction,
    TransactionId, WireTransaction,
};

/// Shared core of the validator and the applier.
pub struct TransactionLogic {
    config: TransactionConfig,
    fees: FeeSchedule,
    clock: SlotClock,
    ports: LedgerPorts,
    pending: PendingRegistry,
}

impl TransactionLogic {
    pub fn new(config: TransactionConfig, clock: SlotClock, ports: LedgerPorts) -> Self {
        let fees = config.fee_schedule();
        Self {
            config,
            fees,
            clock,
            ports,
            pending: PendingRegistry::new(),
        }
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    pub fn clock(&self) -> &SlotClock {
        &self.clock
    }

    pub fn ports(&self) -> &LedgerPorts {
        &self.ports
    }

    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    pub(crate) fn kind_context(&self) -> KindContext<'_> {
        KindContext {
            ports: &self.ports,
            pending: &self.pending,
        }
    }

    /// `true` when `tx` was included in the genesis block.
    pub fn in_genesis_block(&self, tx: &Transaction) -> bool {
        self.config.genesis_block_id.is_some() && tx.block_id == self.config.genesis_block_id
    }

    /// Decode a wire transaction. Unknown type tags are rejected here.
    pub fn decode(&self, wire: WireTransaction) -> Result<Transaction> {
        Transaction::try_from(wire).map_err(|e| match e {
            LedgerError::UnknownTransactionType(tag) => TransactionError::UnknownType(tag),
            other => TransactionError::Ledger(other),
        })
    }

    /// Bind `tx` to its sender: derive the id (rejecting a mismatched
    /// claimed id) and set the sender address.
    pub fn process(
        &self,
        mut tx: Transaction,
        sender: Option<&Account>,
        requester: Option<&Account>,
    ) -> Result<Transaction> {
        let sender = sender.ok_or(TransactionError::MissingSender)?;
        if tx.requester_public_key.is_some() && requester.is_none() {
            return Err(TransactionError::MissingRequester);
        }

        let id = tx.compute_id();
        if let Some(claimed) = tx.id {
            if claimed != id {
                return Err(TransactionError::InvalidId {
                    expected: id,
                    actual: claimed,
                });
            }
        }
        tx.id = Some(id);
        tx.sender_id = Some(sender.address);

        if let shared_types::TransactionAsset::Delegate(asset) = &mut tx.asset {
            asset.public_key = Some(tx.sender_public_key);
        }
        Ok(tx)
    }

    /// Multisignature threshold reached.
    pub fn ready(&self, tx: &Transaction, sender: &Account) -> bool {
        kinds::ready(tx, sender)
    }

    /// Check that `track` of `sender` covers `amount`.
    pub fn check_balance(
        &self,
        amount: Amount,
        track: BalanceTrack,
        tx: &Transaction,
        sender: &Account,
    ) -> BalanceCheck {
        check_balance(amount, track, tx, sender, self.config.genesis_block_id)
    }

    pub fn bytes(&self, tx: &Transaction, skip_signature: bool, skip_second: bool) -> Vec<u8> {
        tx.to_bytes(skip_signature, skip_second)
    }

    pub fn hash(&self, tx: &Transaction) -> Hash {
        tx.hash()
    }

    pub fn id(&self, tx: &Transaction) -> TransactionId {
        tx.compute_id()
    }

    pub fn sign(&self, keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
        signing::sign(keypair, tx)
    }

    pub fn second_sign(&self, keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
        signing::second_sign(keypair, tx)
    }

    pub fn multisign(&self, keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
        signing::multisign(keypair, tx)
    }

    pub fn verify_signature(
        &self,
        tx: &Transaction,
        public_key: &PublicKey,
        signature: &Signature,
    ) -> bool {
        signing::verify_signature(tx, public_key, signature)
    }

    pub fn verify_second_signature(
        &self,
        tx: &Transaction,
        public_key: &PublicKey,
        signature: &Signature,
    ) -> bool {
        signing::verify_second_signature(tx, public_key, signature)
    }

    /// Exact fee for `tx` at `height`.
    pub fn calculate_fee(&self, tx: &Transaction, _sender: &Account, height: u64) -> Result<Amount> {
        kinds::calculate_fee(tx, self.fees.at(height))
    }

    /// Record rows to persist with a block containing `tx`.
    pub fn db_save(&self, tx: &Transaction) -> Vec<LedgerOp> {
        kinds::db_save(tx).into_iter().collect()
    }
}
