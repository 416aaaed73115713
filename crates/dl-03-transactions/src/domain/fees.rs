//! Height-keyed fee schedule.

use serde::Deserialize;
use shared_types::constants::fees;
use shared_types::{Amount, TransactionType};

/// Base fee of every transaction kind.
///
/// The multisignature entry is charged once per keysgroup member plus one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeTable {
    pub send: Amount,
    pub second_signature: Amount,
    pub delegate: Amount,
    pub vote: Amount,
    pub multisignature: Amount,
    pub in_transfer: Amount,
    pub out_transfer: Amount,
}

impl Default for FeeTable {
    fn default() -> Self {
        Self {
            send: Amount::new(fees::SEND),
            second_signature: Amount::new(fees::SECOND_SIGNATURE),
            delegate: Amount::new(fees::DELEGATE),
            vote: Amount::new(fees::VOTE),
            multisignature: Amount::new(fees::MULTISIGNATURE),
            in_transfer: Amount::new(fees::IN_TRANSFER),
            out_transfer: Amount::new(fees::OUT_TRANSFER),
        }
    }
}

impl FeeTable {
    /// Base fee for `kind`.
    pub fn base(&self, kind: TransactionType) -> Amount {
        match kind {
            TransactionType::Send => self.send,
            TransactionType::SecondSignature => self.second_signature,
            TransactionType::Delegate => self.delegate,
            TransactionType::Vote => self.vote,
            TransactionType::Multisignature => self.multisignature,
            TransactionType::InTransfer => self.in_transfer,
            TransactionType::OutTransfer => self.out_transfer,
        }
    }
}

/// Fee table in effect from `height` onwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeChange {
    pub height: u64,
    pub fees: FeeTable,
}

/// Fee tables by height.
#[derive(Clone, Debug, Default)]
pub struct FeeSchedule {
    base: FeeTable,
    changes: Vec<FeeChange>,
}

impl FeeSchedule {
    pub fn new(base: FeeTable, mut changes: Vec<FeeChange>) -> Self {
        changes.sort_by_key(|c| c.height);
        Self { base, changes }
    }

    /// Table in effect at `height`.
    pub fn at(&self, height: u64) -> &FeeTable {
        self.changes
            .iter()
            .rev()
            .find(|change| change.height <= height)
            .map_or(&self.base, |change| &change.fees)
    }
}
