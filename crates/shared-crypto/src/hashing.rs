//! # SHA-256 Hashing
//!
//! One-shot and streaming SHA-256 plus the 8-byte identifier construction
//! shared by transactions, blocks and addresses.

use sha2::{Digest, Sha256};

/// SHA-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Stateful SHA-256 hasher.
///
/// Used for the block payload hash, which is a rolling hash over the byte
/// serialization of every transaction in block order.
#[derive(Clone, Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Derive an 8-byte identifier from a hash.
///
/// The first 8 bytes are reversed and read big-endian, which is the same
/// as reading them little-endian.
pub fn id_from_hash(hash: &Hash) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(head)
}

/// Hash `data` and derive its identifier.
pub fn id_from_bytes(data: &[u8]) -> u64 {
    id_from_hash(&sha256(data))
}
