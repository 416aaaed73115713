//! # Identifiers
//!
//! All three identifiers are 64-bit integers derived with
//! [`shared_crypto::id_from_bytes`]. Addresses render with an `L` suffix,
//! transaction and block ids as bare decimal strings.

use crate::errors::LedgerError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_crypto::id_from_bytes;
use std::fmt;
use std::str::FromStr;

pub use shared_crypto::{Ed25519PublicKey as PublicKey, Ed25519Signature as Signature};

/// Account address: `sha256(public_key)` → 8-byte id, rendered `"<id>L"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    /// Wrap a numeric address.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Derive the address owned by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(id_from_bytes(public_key.as_bytes()))
    }

    /// Numeric part of the address.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}L", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}L", self.0)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    /// Case-insensitive on the suffix: `"123L"` and `"123l"` are the same.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let digits = upper
            .strip_suffix('L')
            .ok_or_else(|| LedgerError::InvalidAddress(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidAddress(s.to_string()));
        }
        digits
            .parse::<u64>()
            .map(Address)
            .map_err(|_| LedgerError::InvalidAddress(s.to_string()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

/// Block identifier. `BlockId::ZERO` marks an account no longer touched by
/// any block after a rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    /// Cleared back-reference.
    pub const ZERO: BlockId = BlockId(0);
}

macro_rules! decimal_id {
    ($name:ident) => {
        impl $name {
            /// Wrap a numeric id.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Derive from serialized bytes.
            pub fn from_bytes(bytes: &[u8]) -> Self {
                Self(id_from_bytes(bytes))
            }

            /// Numeric value.
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(LedgerError::InvalidId(s.to_string()));
                }
                s.parse::<u64>()
                    .map(Self)
                    .map_err(|_| LedgerError::InvalidId(s.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

decimal_id!(TransactionId);
decimal_id!(BlockId);

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Ed25519KeyPair;

    #[test]
    fn test_address_display_and_parse() {
        let address = Address::new(12345);
        assert_eq!(address.to_string(), "12345L");
        assert_eq!("12345L".parse::<Address>().unwrap(), address);
        assert_eq!("12345l".parse::<Address>().unwrap(), address);
        assert!("12345".parse::<Address>().is_err());
        assert!("L".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_derivation_is_stable() {
        let key = Ed25519KeyPair::from_secret("address derivation").unwrap();
        let a = Address::from_public_key(&key.public_key());
        let b = Address::from_public_key(&key.public_key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_render_decimal() {
        assert_eq!(TransactionId::new(42).to_string(), "42");
        assert_eq!("42".parse::<BlockId>().unwrap(), BlockId::new(42));
        assert!("4e2".parse::<BlockId>().is_err());
    }
}
