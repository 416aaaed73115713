//! # Blocks
//!
//! ## Byte layout
//!
//! | Field | Size |
//! |-------|------|
//! | version (LE) | 4 |
//! | timestamp (LE) | 4 |
//! | previous block id (BE, zero if absent) | 8 |
//! | number of transactions (LE) | 4 |
//! | total amount (LE) | 8 |
//! | total fee (LE) | 8 |
//! | reward (LE) | 8 |
//! | payload length (LE) | 4 |
//! | payload hash | 32 |
//! | generator public key | 32 |
//! | block signature | 64, optional |

use crate::amount::Amount;
use crate::errors::{LedgerError, LedgerResult};
use crate::ids::{BlockId, PublicKey, Signature};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use shared_crypto::{id_from_hash, sha256, Ed25519KeyPair, Hash, Sha256Hasher};

/// A block and its transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub version: u32,
    /// Seconds since the epoch, slot aligned.
    pub timestamp: u32,
    pub height: u64,
    pub previous_block: Option<BlockId>,
    pub number_of_transactions: u32,
    pub total_amount: Amount,
    pub total_fee: Amount,
    pub reward: Amount,
    pub payload_length: u32,
    #[serde(with = "hex_hash")]
    pub payload_hash: Hash,
    pub generator_public_key: PublicKey,
    pub block_signature: Option<Signature>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Parent a new block is forged on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainTip {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: u32,
}

impl From<&Block> for ChainTip {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id,
            height: block.height,
            timestamp: block.timestamp,
        }
    }
}

impl Block {
    /// Build and sign a block on top of `tip`.
    ///
    /// Transactions must already carry their ids and signatures; their full
    /// bytes form the payload.
    pub fn forge(
        keypair: &Ed25519KeyPair,
        tip: ChainTip,
        timestamp: u32,
        reward: Amount,
        transactions: Vec<Transaction>,
    ) -> LedgerResult<Block> {
        Self::build(
            keypair,
            Some(tip.id),
            tip.height + 1,
            timestamp,
            reward,
            transactions,
        )
    }

    /// Build and sign the height-1 block.
    pub fn genesis(
        keypair: &Ed25519KeyPair,
        transactions: Vec<Transaction>,
    ) -> LedgerResult<Block> {
        Self::build(keypair, None, 1, 0, Amount::ZERO, transactions)
    }

    fn build(
        keypair: &Ed25519KeyPair,
        previous_block: Option<BlockId>,
        height: u64,
        timestamp: u32,
        reward: Amount,
        transactions: Vec<Transaction>,
    ) -> LedgerResult<Block> {
        let mut hasher = Sha256Hasher::new();
        let mut payload_length: usize = 0;
        let mut total_amount = Amount::ZERO;
        let mut total_fee = Amount::ZERO;

        for tx in &transactions {
            let bytes = tx.to_bytes(false, false);
            payload_length += bytes.len();
            hasher.update(&bytes);
            total_amount = total_amount.checked_add(tx.amount)?;
            total_fee = total_fee.checked_add(tx.fee)?;
        }

        let mut block = Block {
            id: BlockId::ZERO,
            version: 0,
            timestamp,
            height,
            previous_block,
            number_of_transactions: u32::try_from(transactions.len())
                .map_err(|_| LedgerError::Overflow("transaction count".into()))?,
            total_amount,
            total_fee,
            reward,
            payload_length: u32::try_from(payload_length)
                .map_err(|_| LedgerError::Overflow("payload length".into()))?,
            payload_hash: hasher.finalize(),
            generator_public_key: keypair.public_key(),
            block_signature: None,
            transactions,
        };
        block.block_signature = Some(keypair.sign(&block.signing_hash()));
        block.id = block.compute_id();
        Ok(block)
    }

    /// Canonical bytes (see module docs).
    pub fn to_bytes(&self, skip_signature: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + 4 + 8 + 4 + 8 * 3 + 4 + 32 + 32 + 64);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        let previous = self.previous_block.map(BlockId::value).unwrap_or(0);
        bytes.extend_from_slice(&previous.to_be_bytes());
        bytes.extend_from_slice(&self.number_of_transactions.to_le_bytes());
        bytes.extend_from_slice(&self.total_amount.units().to_le_bytes());
        bytes.extend_from_slice(&self.total_fee.units().to_le_bytes());
        bytes.extend_from_slice(&self.reward.units().to_le_bytes());
        bytes.extend_from_slice(&self.payload_length.to_le_bytes());
        bytes.extend_from_slice(&self.payload_hash);
        bytes.extend_from_slice(self.generator_public_key.as_bytes());
        if !skip_signature {
            if let Some(signature) = &self.block_signature {
                bytes.extend_from_slice(signature.as_bytes());
            }
        }
        bytes
    }

    /// Hash signed by the generator.
    pub fn signing_hash(&self) -> Hash {
        sha256(&self.to_bytes(true))
    }

    /// Id over the signed bytes.
    pub fn compute_id(&self) -> BlockId {
        BlockId::new(id_from_hash(&sha256(&self.to_bytes(false))))
    }

    /// Check the generator signature.
    pub fn verify_signature(&self) -> LedgerResult<()> {
        let signature = self
            .block_signature
            .as_ref()
            .ok_or(shared_crypto::CryptoError::SignatureVerificationFailed)?;
        self.generator_public_key
            .verify(&self.signing_hash(), signature)?;
        Ok(())
    }
}

mod hex_hash {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| de::Error::custom("payload hash must be 32 bytes"))
    }
}
