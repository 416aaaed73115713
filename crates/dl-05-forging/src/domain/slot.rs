//! Slot ownership.

use super::Keyring;
use dl_02_slots::SlotClock;
use shared_crypto::Ed25519KeyPair;
use shared_types::PublicKey;

/// A slot this node may forge in.
#[derive(Clone, Debug)]
pub struct SlotData {
    pub slot: u64,
    /// Epoch time at which the slot starts.
    pub time: u64,
    pub keypair: Ed25519KeyPair,
}

/// First slot from `current_slot` up to one round ahead whose owner in
/// `ranking` is enabled in `keyring`.
///
/// Slot `s` belongs to `ranking[s % delegates]`, with `delegates` taken at
/// `height`.
pub fn find_slot(
    clock: &SlotClock,
    ranking: &[PublicKey],
    keyring: &Keyring,
    current_slot: u64,
    height: u64,
) -> Option<SlotData> {
    let delegates = clock.num_delegates(Some(height));
    let last_slot = clock.last_slot_of(current_slot, Some(height));

    (current_slot..last_slot).find_map(|slot| {
        let position = usize::try_from(slot % delegates).ok()?;
        let owner = ranking.get(position)?;
        if !keyring.is_enabled(owner) {
            return None;
        }
        keyring.keypair(owner).map(|keypair| SlotData {
            slot,
            time: clock.slot_time(slot),
            keypair: keypair.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_02_slots::{SlotConfig, TimeSource};
    use std::sync::Arc;

    struct Epoch;

    impl TimeSource for Epoch {
        fn now(&self) -> u64 {
            SlotConfig::default().epoch_time
        }
    }

    fn clock(delegates: u64) -> SlotClock {
        let config = SlotConfig {
            active_delegates: delegates,
            ..SlotConfig::default()
        };
        SlotClock::new(config, Arc::new(Epoch)).unwrap()
    }

    fn ranking(keys: &[&Ed25519KeyPair], size: usize) -> Vec<PublicKey> {
        (0..size)
            .map(|i| {
                keys.get(i)
                    .map(|k| k.public_key())
                    .unwrap_or_else(|| PublicKey::new([u8::try_from(i).unwrap(); 32]))
            })
            .collect()
    }

    #[test]
    fn test_owner_of_current_slot() {
        let mine = Ed25519KeyPair::from_secret("mine").unwrap();
        let mut keyring = Keyring::new();
        keyring.enable(Some(mine.clone()));
        let clock = clock(5);

        // slot 10 -> position 0
        let data = find_slot(&clock, &ranking(&[&mine], 5), &keyring, 10, 42).unwrap();
        assert_eq!(data.slot, 10);
        assert_eq!(data.time, 100);
        assert_eq!(data.keypair.public_key(), mine.public_key());
    }

    #[test]
    fn test_scans_ahead_within_round() {
        let mine = Ed25519KeyPair::from_secret("mine").unwrap();
        let mut keyring = Keyring::new();
        keyring.enable(Some(mine.clone()));
        let clock = clock(5);

        // position 0 next comes up at slot 15
        let data = find_slot(&clock, &ranking(&[&mine], 5), &keyring, 12, 42).unwrap();
        assert_eq!(data.slot, 15);
    }

    #[test]
    fn test_disabled_or_unranked_key_finds_nothing() {
        let mine = Ed25519KeyPair::from_secret("mine").unwrap();
        let other = Ed25519KeyPair::from_secret("other").unwrap();
        let mut keyring = Keyring::new();
        keyring.enable(Some(mine.clone()));
        let clock = clock(5);

        assert!(find_slot(&clock, &ranking(&[&other], 5), &keyring, 10, 42).is_none());

        keyring.disable(Some(&mine.public_key()));
        assert!(find_slot(&clock, &ranking(&[&mine], 5), &keyring, 10, 42).is_none());
    }
}
