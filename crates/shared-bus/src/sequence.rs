//! # Sequences
//!
//! A sequence is a FIFO queue of async units of work drained by a single
//! worker task, so at most one unit per sequence is in flight. Enqueueing
//! never blocks.
//!
//! Every unit runs inside a task-local chain holding the sequences it was
//! enqueued through: its own, plus the chain of the unit that enqueued it.
//! Enqueueing onto any sequence already in the chain would wait on work
//! queued behind a unit that is itself waiting, directly (A→A) or through
//! another sequence (A→B→A). `add` rejects such calls with
//! [`SequenceError::Reentrant`] instead of deadlocking.
//!
//! A panicking unit fails only its own caller with
//! [`SequenceError::Panicked`]; the worker moves on to the next unit.

use futures::FutureExt;
use serde::Deserialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static RUNNING_SEQUENCES: Vec<u64>;
}

/// Errors from sequence operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// A unit tried to enqueue onto a sequence it is running in, directly
    /// or through the units it waits on.
    #[error("Reentrant call into sequence '{0}'")]
    Reentrant(&'static str),

    /// The worker has stopped.
    #[error("Sequence '{0}' is closed")]
    Closed(&'static str),

    /// The unit was dropped before producing a result.
    #[error("Sequence '{0}' dropped a unit of work")]
    Dropped(&'static str),

    /// The unit panicked.
    #[error("Unit of work in sequence '{0}' panicked")]
    Panicked(&'static str),
}

/// Sequence tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceConfig {
    /// Pending-unit count above which a warning is logged.
    pub warning_limit: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self { warning_limit: 50 }
    }
}

/// Handle to a running sequence. Cheap to clone.
#[derive(Clone)]
pub struct Sequence {
    name: &'static str,
    id: u64,
    sender: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
    warning_limit: usize,
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Result of an enqueued unit.
#[must_use = "the unit runs regardless, but its result is lost unless awaited"]
pub struct PendingUnit<T> {
    name: &'static str,
    receiver: oneshot::Receiver<Result<T, SequenceError>>,
}

impl<T> PendingUnit<T> {
    /// Wait for the unit to run.
    pub async fn wait(self) -> Result<T, SequenceError> {
        self.receiver
            .await
            .map_err(|_| SequenceError::Dropped(self.name))?
    }
}

/// Sequences the current task is running in, innermost last.
fn current_chain() -> Vec<u64> {
    RUNNING_SEQUENCES
        .try_with(|chain| chain.clone())
        .unwrap_or_default()
}

impl Sequence {
    /// Start the worker for a new sequence. Must be called from within a
    /// Tokio runtime.
    pub fn spawn(name: &'static str, config: &SequenceConfig) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let id = NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::new(AtomicUsize::new(0));

        let worker_pending = pending.clone();
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                job.await;
                worker_pending.fetch_sub(1, Ordering::SeqCst);
            }
            debug!(sequence = name, "Sequence worker stopped");
        });

        Self {
            name,
            id,
            sender,
            pending,
            warning_limit: config.warning_limit,
        }
    }

    /// Sequence name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Units queued or running.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// `true` when called from inside a unit of this sequence, or from a
    /// unit on another sequence that one of its units enqueued.
    pub fn is_running_here(&self) -> bool {
        RUNNING_SEQUENCES
            .try_with(|chain| chain.contains(&self.id))
            .unwrap_or(false)
    }

    /// Enqueue `work` without waiting for it.
    pub fn add<F, T>(&self, work: F) -> Result<PendingUnit<T>, SequenceError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut chain = current_chain();
        if chain.contains(&self.id) {
            return Err(SequenceError::Reentrant(self.name));
        }
        chain.push(self.id);

        let name = self.name;
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(RUNNING_SEQUENCES.scope(chain, async move {
            let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(value) => Ok(value),
                Err(_) => {
                    error!(sequence = name, "Unit of work panicked");
                    Err(SequenceError::Panicked(name))
                }
            };
            let _ = tx.send(outcome);
        }));

        let queued = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if self.sender.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(SequenceError::Closed(self.name));
        }
        if queued > self.warning_limit {
            warn!(
                sequence = self.name,
                pending = queued,
                limit = self.warning_limit,
                "Sequence backlog above warning limit"
            );
        }

        Ok(PendingUnit {
            name: self.name,
            receiver: rx,
        })
    }

    /// Enqueue `work` and wait for its result.
    pub async fn run<F, T>(&self, work: F) -> Result<T, SequenceError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.add(work)?.wait().await
    }
}
