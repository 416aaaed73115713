//! Per-round delegate shuffle.

use shared_crypto::sha256;
use shared_types::PublicKey;

/// Order `delegates` for `round`.
///
/// The seed is the SHA-256 of the round number in decimal. Each pass swaps
/// four consecutive positions with positions picked by the first four seed
/// bytes, then rehashes the seed. The outer step also advances the cursor,
/// so every fifth position is left where it was. Every node must reproduce
/// this exactly.
pub fn shuffle_for_round(round: u64, mut delegates: Vec<PublicKey>) -> Vec<PublicKey> {
    let count = delegates.len();
    if count < 2 {
        return delegates;
    }

    let mut seed = sha256(round.to_string().as_bytes());
    let mut i = 0;
    while i < count {
        let mut x = 0;
        while x < 4 && i < count {
            let target = usize::from(seed[x]) % count;
            delegates.swap(i, target);
            i += 1;
            x += 1;
        }
        seed = sha256(&seed);
        i += 1;
    }
    delegates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: u8) -> Vec<PublicKey> {
        (0..n).map(|i| PublicKey::new([i; 32])).collect()
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        assert_eq!(shuffle_for_round(7, keys(101)), shuffle_for_round(7, keys(101)));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut shuffled = shuffle_for_round(12, keys(101));
        shuffled.sort();
        assert_eq!(shuffled, keys(101));
    }

    #[test]
    fn test_rounds_differ() {
        assert_ne!(shuffle_for_round(1, keys(101)), shuffle_for_round(2, keys(101)));
    }

    #[test]
    fn test_matches_reference_walk() {
        let input = keys(11);
        let mut expected = input.clone();
        let mut seed = sha256(b"3");
        for start in [0usize, 5, 10] {
            for (x, i) in (start..(start + 4).min(11)).enumerate() {
                expected.swap(i, usize::from(seed[x]) % 11);
            }
            seed = sha256(&seed);
        }
        assert_eq!(shuffle_for_round(3, input), expected);
    }

    #[test]
    fn test_tiny_lists_unchanged() {
        assert!(shuffle_for_round(1, Vec::new()).is_empty());
        assert_eq!(shuffle_for_round(1, keys(1)), keys(1));
    }
}
