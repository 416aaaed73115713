//! Forging loop: ticks the scheduler on an interval and serves key
//! management commands between ticks.

use super::scheduler::{ForgingScheduler, ForgingStatus};
use crate::domain::{ForgeAbort, ForgingError, Result};
use shared_crypto::Ed25519KeyPair;
use shared_types::PublicKey;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Requests served by a running forging loop.
#[derive(Debug)]
pub enum ForgingCommand {
    /// Enable one keypair, or every known key.
    Enable {
        keypair: Option<Ed25519KeyPair>,
        reply: oneshot::Sender<ForgingStatus>,
    },
    /// Disable one key, or every key.
    Disable {
        key: Option<PublicKey>,
        reply: oneshot::Sender<ForgingStatus>,
    },
    Status {
        key: Option<PublicKey>,
        reply: oneshot::Sender<ForgingStatus>,
    },
}

/// Cloneable client of a running forging loop.
#[derive(Clone, Debug)]
pub struct ForgingHandle {
    commands: mpsc::Sender<ForgingCommand>,
}

impl ForgingHandle {
    /// A handle and the receiver to pass to [`ForgingScheduler::run`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ForgingCommand>) {
        let (commands, receiver) = mpsc::channel(capacity);
        (Self { commands }, receiver)
    }

    pub async fn enable(&self, keypair: Option<Ed25519KeyPair>) -> Result<ForgingStatus> {
        self.request(|reply| ForgingCommand::Enable { keypair, reply })
            .await
    }

    pub async fn disable(&self, key: Option<PublicKey>) -> Result<ForgingStatus> {
        self.request(|reply| ForgingCommand::Disable { key, reply })
            .await
    }

    pub async fn status(&self, key: Option<PublicKey>) -> Result<ForgingStatus> {
        self.request(|reply| ForgingCommand::Status { key, reply })
            .await
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<ForgingStatus>) -> ForgingCommand,
    ) -> Result<ForgingStatus> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ForgingError::LoopStopped)?;
        response.await.map_err(|_| ForgingError::LoopStopped)
    }
}

impl ForgingScheduler {
    /// Tick every poll interval until `shutdown` turns true or its sender
    /// is dropped.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ForgingCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.config.poll_interval_ms,
            "Forging loop started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(command) = commands.recv() => self.handle(command),
                _ = interval.tick() => {
                    if let Err(ForgeAbort::Skipped(reason)) = self.tick().await {
                        debug!(%reason, "Forging tick skipped");
                    }
                }
            }
        }

        info!("Forging loop stopped");
    }

    fn handle(&mut self, command: ForgingCommand) {
        match command {
            ForgingCommand::Enable { keypair, reply } => {
                let key = keypair.as_ref().map(Ed25519KeyPair::public_key);
                self.keyring_mut().enable(keypair);
                info!(key = ?key, "Forging enabled");
                let _ = reply.send(self.forging_status(key.as_ref()));
            }
            ForgingCommand::Disable { key, reply } => {
                self.keyring_mut().disable(key.as_ref());
                info!(key = ?key, "Forging disabled");
                let _ = reply.send(self.forging_status(key.as_ref()));
            }
            ForgingCommand::Status { key, reply } => {
                let _ = reply.send(self.forging_status(key.as_ref()));
            }
        }
    }
}
