//! Signing payloads.
//!
//! The primary signature and every multisignature cosignature cover the
//! transaction bytes without any signature. The second signature covers the
//! bytes including the primary signature.

use shared_crypto::{sha256, Ed25519KeyPair, Hash};
use shared_types::{PublicKey, Signature, Transaction};

/// Hash signed by the sender, a requester or a cosigner.
pub fn signing_hash(tx: &Transaction) -> Hash {
    sha256(&tx.to_bytes(true, true))
}

/// Hash signed with the second passphrase.
pub fn second_signing_hash(tx: &Transaction) -> Hash {
    sha256(&tx.to_bytes(false, true))
}

/// Primary signature.
pub fn sign(keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
    keypair.sign(&signing_hash(tx))
}

/// Second signature; `tx.signature` must already be set.
pub fn second_sign(keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
    keypair.sign(&second_signing_hash(tx))
}

/// Cosignature from a multisignature group member.
pub fn multisign(keypair: &Ed25519KeyPair, tx: &Transaction) -> Signature {
    keypair.sign(&signing_hash(tx))
}

/// Check a primary or cosignature.
pub fn verify_signature(tx: &Transaction, public_key: &PublicKey, signature: &Signature) -> bool {
    public_key.verify(&signing_hash(tx), signature).is_ok()
}

/// Check a second signature.
pub fn verify_second_signature(
    tx: &Transaction,
    public_key: &PublicKey,
    signature: &Signature,
) -> bool {
    public_key.verify(&second_signing_hash(tx), signature).is_ok()
}
