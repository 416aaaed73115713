//! # Accounts and Merge Diffs
//!
//! Every account field has a confirmed value and, where the pool needs one,
//! an unconfirmed (`u_`) mirror. The two tracks only meet at block
//! confirmation.
//!
//! Accounts are never written field by field. A change is expressed as an
//! [`AccountDiff`], planned against the current account with
//! [`plan_merge`] (pure: computes the next account and the storage ops) and
//! then committed with [`MergePlan::apply`], which mutates the in-memory
//! account and hands back the ops for durable persistence. Because both come
//! from the same plan, the in-memory view and the persisted log cannot
//! diverge.

use crate::amount::Amount;
use crate::errors::{LedgerError, LedgerResult};
use crate::ids::{Address, BlockId, PublicKey};
use crate::ops::{LedgerOp, RoundVote};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `+key` / `-key` entry, used for votes and multisignature keysgroups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyChange {
    /// Add the key.
    Add(PublicKey),
    /// Remove the key.
    Remove(PublicKey),
}

impl KeyChange {
    /// The key being added or removed.
    pub fn key(&self) -> &PublicKey {
        match self {
            KeyChange::Add(k) | KeyChange::Remove(k) => k,
        }
    }

    /// `true` for `+key`.
    pub fn is_add(&self) -> bool {
        matches!(self, KeyChange::Add(_))
    }

    /// The change that undoes this one.
    pub fn inverted(&self) -> KeyChange {
        match *self {
            KeyChange::Add(k) => KeyChange::Remove(k),
            KeyChange::Remove(k) => KeyChange::Add(k),
        }
    }
}

impl fmt::Display for KeyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyChange::Add(k) => write!(f, "+{}", k),
            KeyChange::Remove(k) => write!(f, "-{}", k),
        }
    }
}

impl FromStr for KeyChange {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidChange(s.to_string());
        let (sign, hex) = s.split_at_checked(1).ok_or_else(invalid)?;
        if hex.len() != 64 {
            return Err(invalid());
        }
        let key: PublicKey = hex.parse().map_err(|_| invalid())?;
        match sign {
            "+" => Ok(KeyChange::Add(key)),
            "-" => Ok(KeyChange::Remove(key)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for KeyChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Ledger account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: Address,
    /// Set on the first outgoing transaction.
    pub public_key: Option<PublicKey>,
    pub balance: Amount,
    pub u_balance: Amount,
    pub second_signature: bool,
    pub u_second_signature: bool,
    pub second_public_key: Option<PublicKey>,
    pub is_delegate: bool,
    pub u_is_delegate: bool,
    pub username: Option<String>,
    pub u_username: Option<String>,
    /// Vote weight received (delegates only): sum of voter balances.
    pub vote: i64,
    /// Delegates this account votes for.
    pub delegates: Vec<PublicKey>,
    pub u_delegates: Vec<PublicKey>,
    pub multisignatures: Vec<PublicKey>,
    pub u_multisignatures: Vec<PublicKey>,
    pub multimin: u8,
    pub u_multimin: u8,
    pub multilifetime: u8,
    pub u_multilifetime: u8,
    pub produced_blocks: u64,
    pub missed_blocks: u64,
    pub fees: Amount,
    pub rewards: Amount,
    /// Last block that touched this account.
    pub block_id: Option<BlockId>,
}

impl Account {
    /// Fresh account with every field zeroed.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            public_key: None,
            balance: Amount::ZERO,
            u_balance: Amount::ZERO,
            second_signature: false,
            u_second_signature: false,
            second_public_key: None,
            is_delegate: false,
            u_is_delegate: false,
            username: None,
            u_username: None,
            vote: 0,
            delegates: Vec::new(),
            u_delegates: Vec::new(),
            multisignatures: Vec::new(),
            u_multisignatures: Vec::new(),
            multimin: 0,
            u_multimin: 0,
            multilifetime: 0,
            u_multilifetime: 0,
            produced_blocks: 0,
            missed_blocks: 0,
            fees: Amount::ZERO,
            rewards: Amount::ZERO,
            block_id: None,
        }
    }

    /// Fresh account owned by `public_key`.
    pub fn with_public_key(public_key: PublicKey) -> Self {
        let mut account = Self::new(Address::from_public_key(&public_key));
        account.public_key = Some(public_key);
        account
    }

    /// `true` when confirmed multisignature keys are registered.
    pub fn is_multisig(&self) -> bool {
        !self.multisignatures.is_empty()
    }
}

/// Which balance track a check or merge refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceTrack {
    /// Chain-committed balance.
    Confirmed,
    /// Pool-pending balance.
    Unconfirmed,
}

impl BalanceTrack {
    /// Current value of this track on `account`.
    pub fn of(self, account: &Account) -> Amount {
        match self {
            BalanceTrack::Confirmed => account.balance,
            BalanceTrack::Unconfirmed => account.u_balance,
        }
    }

    /// Diff moving this track by `delta`.
    pub fn diff(self, delta: i64) -> AccountDiff {
        match self {
            BalanceTrack::Confirmed => AccountDiff {
                balance: delta,
                ..AccountDiff::default()
            },
            BalanceTrack::Unconfirmed => AccountDiff {
                u_balance: delta,
                ..AccountDiff::default()
            },
        }
    }
}

/// Description of a change to one account.
///
/// Numeric fields are deltas (zero = untouched); `Option` fields are
/// assignments (`None` = untouched). `second_public_key`, `username` and
/// `u_username` use a nested `Option` so that clearing is expressible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDiff {
    pub public_key: Option<PublicKey>,
    pub balance: i64,
    pub u_balance: i64,
    pub is_delegate: Option<bool>,
    pub u_is_delegate: Option<bool>,
    pub second_signature: Option<bool>,
    pub u_second_signature: Option<bool>,
    pub second_public_key: Option<Option<PublicKey>>,
    pub username: Option<Option<String>>,
    pub u_username: Option<Option<String>>,
    pub vote: i64,
    pub delegates: Vec<KeyChange>,
    pub u_delegates: Vec<KeyChange>,
    pub multisignatures: Vec<KeyChange>,
    pub u_multisignatures: Vec<KeyChange>,
    pub multimin: i16,
    pub u_multimin: i16,
    pub multilifetime: i16,
    pub u_multilifetime: i16,
    pub produced_blocks: i64,
    pub missed_blocks: i64,
    pub fees: i64,
    pub rewards: i64,
    pub block_id: Option<BlockId>,
    /// Round the change belongs to; required for vote-weight bookkeeping.
    pub round: Option<u64>,
}

impl AccountDiff {
    /// Tag the diff with the block and round that caused it.
    pub fn in_block(mut self, block_id: BlockId, round: u64) -> Self {
        self.block_id = Some(block_id);
        self.round = Some(round);
        self
    }

    /// `true` when the diff changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &AccountDiff::default()
    }
}

/// Result of planning a merge: the next account state and the ops that
/// describe the change for storage.
#[derive(Clone, Debug)]
#[must_use = "a merge plan does nothing until applied"]
pub struct MergePlan {
    next: Account,
    ops: Vec<LedgerOp>,
}

impl MergePlan {
    /// The account as it will look after the merge.
    pub fn next(&self) -> &Account {
        &self.next
    }

    /// Ops the merge will emit.
    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    /// Commit the plan to `account` and return the storage ops.
    pub fn apply(self, account: &mut Account) -> Vec<LedgerOp> {
        *account = self.next;
        self.ops
    }
}

/// Plan `diff` against `account` without mutating it.
///
/// Fails when the result would break an account invariant: negative balance
/// on either track, negative counters, a conflicting public key, or a key
/// change that adds an existing key / removes a missing one.
pub fn plan_merge(account: &Account, diff: &AccountDiff) -> LedgerResult<MergePlan> {
    let address = account.address;
    let mut next = account.clone();
    let mut ops = vec![LedgerOp::MergeAccount {
        address,
        diff: diff.clone(),
    }];

    if let Some(key) = diff.public_key {
        match account.public_key {
            Some(existing) if existing != key => {
                return Err(LedgerError::MergeConflict {
                    address,
                    reason: format!("public key {} already set to {}", key, existing),
                })
            }
            _ => next.public_key = Some(key),
        }
    }

    next.balance = apply_balance(address, "balance", account.balance, diff.balance)?;
    next.u_balance = apply_balance(address, "u_balance", account.u_balance, diff.u_balance)?;

    // Every confirmed balance change moves the vote weight of the delegates
    // this account currently votes for.
    if let Some(round) = diff.round {
        if diff.balance != 0 {
            for delegate in &account.delegates {
                ops.push(LedgerOp::RecordRoundVote(RoundVote {
                    address,
                    amount: diff.balance,
                    delegate: *delegate,
                    block_id: diff.block_id,
                    round,
                }));
            }
        }
    }

    assign(&mut next.is_delegate, diff.is_delegate);
    assign(&mut next.u_is_delegate, diff.u_is_delegate);
    assign(&mut next.second_signature, diff.second_signature);
    assign(&mut next.u_second_signature, diff.u_second_signature);
    assign(&mut next.second_public_key, diff.second_public_key);
    assign(&mut next.username, diff.username.clone());
    assign(&mut next.u_username, diff.u_username.clone());

    next.vote = account
        .vote
        .checked_add(diff.vote)
        .ok_or_else(|| LedgerError::Overflow(format!("vote of {}", address)))?;

    apply_key_changes(address, "delegates", &mut next.delegates, &diff.delegates)?;
    apply_key_changes(address, "u_delegates", &mut next.u_delegates, &diff.u_delegates)?;
    apply_key_changes(
        address,
        "multisignatures",
        &mut next.multisignatures,
        &diff.multisignatures,
    )?;
    apply_key_changes(
        address,
        "u_multisignatures",
        &mut next.u_multisignatures,
        &diff.u_multisignatures,
    )?;

    if let Some(round) = diff.round {
        let weight = next.balance.as_delta()?;
        for change in &diff.delegates {
            ops.push(LedgerOp::RecordRoundVote(RoundVote {
                address,
                amount: if change.is_add() { weight } else { -weight },
                delegate: *change.key(),
                block_id: diff.block_id,
                round,
            }));
        }
    }

    next.multimin = apply_small(address, "multimin", account.multimin, diff.multimin)?;
    next.u_multimin = apply_small(address, "u_multimin", account.u_multimin, diff.u_multimin)?;
    next.multilifetime = apply_small(
        address,
        "multilifetime",
        account.multilifetime,
        diff.multilifetime,
    )?;
    next.u_multilifetime = apply_small(
        address,
        "u_multilifetime",
        account.u_multilifetime,
        diff.u_multilifetime,
    )?;

    next.produced_blocks = apply_counter(
        address,
        "produced_blocks",
        account.produced_blocks,
        diff.produced_blocks,
    )?;
    next.missed_blocks = apply_counter(
        address,
        "missed_blocks",
        account.missed_blocks,
        diff.missed_blocks,
    )?;
    next.fees = account
        .fees
        .checked_apply(diff.fees)
        .ok_or(LedgerError::NegativeCounter {
            address,
            field: "fees",
        })?;
    next.rewards = account
        .rewards
        .checked_apply(diff.rewards)
        .ok_or(LedgerError::NegativeCounter {
            address,
            field: "rewards",
        })?;

    if diff.block_id.is_some() {
        next.block_id = diff.block_id;
    }

    Ok(MergePlan { next, ops })
}

fn assign<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

fn apply_balance(
    address: Address,
    field: &'static str,
    current: Amount,
    delta: i64,
) -> LedgerResult<Amount> {
    current
        .checked_apply(delta)
        .ok_or(LedgerError::NegativeBalance {
            address,
            field,
            current: current.units(),
            delta,
        })
}

fn apply_counter(
    address: Address,
    field: &'static str,
    current: u64,
    delta: i64,
) -> LedgerResult<u64> {
    current
        .checked_add_signed(delta)
        .ok_or(LedgerError::NegativeCounter { address, field })
}

fn apply_small(address: Address, field: &'static str, current: u8, delta: i16) -> LedgerResult<u8> {
    u8::try_from(i16::from(current) + delta)
        .map_err(|_| LedgerError::NegativeCounter { address, field })
}

fn apply_key_changes(
    address: Address,
    field: &'static str,
    keys: &mut Vec<PublicKey>,
    changes: &[KeyChange],
) -> LedgerResult<()> {
    for change in changes {
        match change {
            KeyChange::Add(key) => {
                if keys.contains(key) {
                    return Err(LedgerError::MergeConflict {
                        address,
                        reason: format!("{} already contains {}", field, key),
                    });
                }
                keys.push(*key);
            }
            KeyChange::Remove(key) => {
                let position = keys.iter().position(|k| k == key).ok_or_else(|| {
                    LedgerError::MergeConflict {
                        address,
                        reason: format!("{} does not contain {}", field, key),
                    }
                })?;
                keys.remove(position);
            }
        }
    }
    Ok(())
}
