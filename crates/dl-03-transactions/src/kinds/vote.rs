use super::{joined, record, KindContext};
use crate::domain::{BlockTag, Result, TransactionError};
use dl_01_state::{tables, AccountFilter};
use serde_json::json;
use shared_types::constants::{MAX_VOTES, MAX_VOTES_PER_TRANSACTION};
use shared_types::{Account, AccountDiff, KeyChange, LedgerOp, PublicKey, Transaction, TransactionId};
use std::collections::HashSet;

pub(super) async fn verify(
    cx: &KindContext<'_>,
    tx: &Transaction,
    votes: &[KeyChange],
    sender: &Account,
) -> Result<()> {
    if tx.recipient_id != Some(sender.address) {
        return Err(TransactionError::InvalidRecipient(
            "votes must be sent to the voter's own address".into(),
        ));
    }
    if votes.is_empty() {
        return Err(TransactionError::InvalidVote("Must not be empty".into()));
    }
    if votes.len() > MAX_VOTES_PER_TRANSACTION {
        return Err(TransactionError::InvalidVote(format!(
            "Voting limit exceeded. Maximum is {} votes per transaction",
            MAX_VOTES_PER_TRANSACTION
        )));
    }

    reject_duplicates(votes)?;

    for vote in votes {
        let delegate = cx
            .ports
            .accounts
            .get(&AccountFilter::PublicKey(*vote.key()))
            .await?;
        if !delegate.is_some_and(|account| account.is_delegate) {
            return Err(TransactionError::DelegateNotFound(*vote.key()));
        }
    }

    check_delegates(&sender.delegates, votes)
}

pub(super) async fn apply(
    cx: &KindContext<'_>,
    votes: &[KeyChange],
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    check_delegates(&sender.delegates, votes)?;
    let diff = AccountDiff {
        delegates: votes.to_vec(),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn undo(
    cx: &KindContext<'_>,
    votes: &[KeyChange],
    tag: BlockTag,
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        delegates: votes.iter().map(KeyChange::inverted).collect(),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, tag.apply(diff)).await
}

pub(super) async fn apply_unconfirmed(
    cx: &KindContext<'_>,
    votes: &[KeyChange],
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    check_delegates(&sender.u_delegates, votes)?;
    let diff = AccountDiff {
        u_delegates: votes.to_vec(),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) async fn undo_unconfirmed(
    cx: &KindContext<'_>,
    votes: &[KeyChange],
    sender: &Account,
) -> Result<Vec<LedgerOp>> {
    let diff = AccountDiff {
        u_delegates: votes.iter().map(KeyChange::inverted).collect(),
        ..AccountDiff::default()
    };
    cx.merge(sender.address, diff).await
}

pub(super) fn db_save(id: TransactionId, votes: &[KeyChange]) -> LedgerOp {
    record(tables::VOTES, id, json!({ "votes": joined(votes) }))
}

fn reject_duplicates(votes: &[KeyChange]) -> Result<()> {
    let mut seen = HashSet::with_capacity(votes.len());
    if !votes.iter().all(|vote| seen.insert(*vote.key())) {
        return Err(TransactionError::InvalidVote(
            "Multiple votes for same delegate are not allowed".into(),
        ));
    }
    Ok(())
}

/// Check `votes` against the delegates an account already votes for.
/// Also runs on the apply paths, which may see votes `verify` never did.
pub(crate) fn check_delegates(current: &[PublicKey], votes: &[KeyChange]) -> Result<()> {
    reject_duplicates(votes)?;

    let mut additions = 0usize;
    let mut removals = 0usize;

    for vote in votes {
        match vote {
            KeyChange::Add(key) => {
                if current.contains(key) {
                    return Err(TransactionError::InvalidVote(
                        "Failed to add vote, account has already voted for this delegate".into(),
                    ));
                }
                additions += 1;
            }
            KeyChange::Remove(key) => {
                if !current.contains(key) {
                    return Err(TransactionError::InvalidVote(
                        "Failed to remove vote, account has not voted for this delegate".into(),
                    ));
                }
                removals += 1;
            }
        }
    }

    if (current.len() + additions).saturating_sub(removals) > MAX_VOTES {
        return Err(TransactionError::VoteLimitExceeded(MAX_VOTES));
    }
    Ok(())
}
