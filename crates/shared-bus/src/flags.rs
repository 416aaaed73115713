//! # Node State Flags
//!
//! Process-wide readiness flags shared by the forging scheduler and the
//! round controller. Owned by the runtime and injected as `Arc`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Readiness flags.
#[derive(Debug, Default)]
pub struct NodeStateFlags {
    syncing: AtomicBool,
    rounds_loaded: AtomicBool,
    rounds_ticking: AtomicBool,
    /// Zero means no snapshot round configured.
    snapshot_round: AtomicU64,
}

impl NodeStateFlags {
    /// All flags cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// `loader.isSyncing`
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub fn set_syncing(&self, value: bool) {
        self.syncing.store(value, Ordering::SeqCst);
    }

    /// `rounds.isLoaded`
    pub fn rounds_loaded(&self) -> bool {
        self.rounds_loaded.load(Ordering::SeqCst)
    }

    pub fn set_rounds_loaded(&self, value: bool) {
        self.rounds_loaded.store(value, Ordering::SeqCst);
    }

    /// `rounds.isTicking`
    pub fn rounds_ticking(&self) -> bool {
        self.rounds_ticking.load(Ordering::SeqCst)
    }

    pub fn set_rounds_ticking(&self, value: bool) {
        self.rounds_ticking.store(value, Ordering::SeqCst);
    }

    /// `rounds.snapshot`
    pub fn snapshot_round(&self) -> Option<u64> {
        match self.snapshot_round.load(Ordering::SeqCst) {
            0 => None,
            round => Some(round),
        }
    }

    pub fn set_snapshot_round(&self, round: Option<u64>) {
        self.snapshot_round
            .store(round.unwrap_or(0), Ordering::SeqCst);
    }

    /// Mark rounds as ticking until the guard is dropped.
    ///
    /// The flag is cleared on every exit path, including early returns and
    /// errors.
    pub fn ticking(&self) -> TickingGuard<'_> {
        self.set_rounds_ticking(true);
        debug!("Rounds ticking");
        TickingGuard { flags: self }
    }
}

/// Clears `rounds.isTicking` on drop.
#[must_use = "the ticking flag is cleared as soon as the guard is dropped"]
pub struct TickingGuard<'a> {
    flags: &'a NodeStateFlags,
}

impl Drop for TickingGuard<'_> {
    fn drop(&mut self) {
        self.flags.set_rounds_ticking(false);
    }
}
