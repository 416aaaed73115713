//! # Shared Types Crate
//!
//! Ledger entities shared by every subsystem.
//!
//! ## Design Principles
//!
//! - **Exact money**: every balance, fee and reward is an [`Amount`] in base
//!   units. Arithmetic is checked; there is no floating point.
//! - **Diff-driven state**: accounts change only through [`AccountDiff`]
//!   merges, which yield the [`LedgerOp`]s storage must persist.
//! - **Closed transaction set**: [`TransactionAsset`] enumerates every
//!   supported kind; unknown type tags fail at decode time.

pub mod account;
pub mod amount;
pub mod block;
pub mod constants;
pub mod errors;
pub mod ids;
pub mod ops;
pub mod transaction;

pub use account::{plan_merge, Account, AccountDiff, BalanceTrack, KeyChange, MergePlan};
pub use amount::{Amount, FIXED_POINT, TOTAL_AMOUNT};
pub use block::{Block, ChainTip};
pub use constants::{round_for, RewardSchedule};
pub use errors::{LedgerError, LedgerResult};
pub use ids::{Address, BlockId, PublicKey, Signature, TransactionId};
pub use ops::{LedgerOp, OpBatch, OpEntity, OpGroup, OpKind, RoundVote};
pub use transaction::{
    DelegateAsset, InTransferAsset, MultisignatureAsset, OutTransferAsset, SecondSignatureAsset,
    Transaction, TransactionAsset, TransactionType, WireTransaction,
};
