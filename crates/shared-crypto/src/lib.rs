//! # Shared Crypto - Signing and Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Transaction/block hashing, 8-byte identifiers, addresses |
//! | `signatures` | Ed25519 | Transaction, block and cosignature signing |
//!
//! ## Key Derivation
//!
//! Forging and account keys are derived from a secret passphrase:
//! `seed = sha256(utf8(secret))`, then the Ed25519 keypair is built from
//! that seed. The same passphrase always yields the same keypair.
//!
//! ## Identifiers
//!
//! Transaction ids, block ids and account addresses all use the same
//! construction: take `sha256(input)`, keep the first 8 bytes, reverse
//! them and read the result as an unsigned big-endian integer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{id_from_bytes, id_from_hash, sha256, Hash, Sha256Hasher};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
