//! Balance sufficiency.

use shared_types::{Account, Amount, BalanceTrack, BlockId, Transaction};

/// Outcome of a sufficiency check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceCheck {
    pub exceeded: bool,
    /// Human-readable reason when exceeded.
    pub error: Option<String>,
}

/// Check that `track` of `sender` covers `amount`.
///
/// Transactions included in the genesis block are exempt.
pub fn check_balance(
    amount: Amount,
    track: BalanceTrack,
    tx: &Transaction,
    sender: &Account,
    genesis_block: Option<BlockId>,
) -> BalanceCheck {
    let in_genesis = genesis_block.is_some() && tx.block_id == genesis_block;
    let balance = track.of(sender);
    let exceeded = !in_genesis && balance < amount;

    BalanceCheck {
        exceeded,
        error: exceeded.then(|| {
            format!(
                "Account does not have enough funds: {} balance: {}",
                sender.address,
                balance.to_human()
            )
        }),
    }
}
