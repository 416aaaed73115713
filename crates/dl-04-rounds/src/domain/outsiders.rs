//! Delegates that were scheduled in a round but forged no block.

use shared_types::{Address, PublicKey};
use std::collections::HashSet;

/// Addresses of every delegate in `ranking` that is absent from
/// `forged`, in ranking order.
pub fn compute_outsiders(ranking: &[PublicKey], forged: &[PublicKey]) -> Vec<Address> {
    let forged: HashSet<&PublicKey> = forged.iter().collect();
    ranking
        .iter()
        .filter(|key| !forged.contains(key))
        .map(Address::from_public_key)
        .collect()
}
