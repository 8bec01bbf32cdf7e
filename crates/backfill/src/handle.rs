//! External API surface: [`BackfillHandle`] and the [`spawn`] entry point.
//!
//! Mirrors `reth_network::NetworkHandle`: a small, cheaply-cloneable struct
//! that only knows how to send commands to the task that owns the real
//! state.

use crate::{
    pipeline::{BackfillManager, Command},
    subscriber::PeerEvent,
};
use backfill_types::{BackfillConfig, Hash, NodeStore, PeerId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};

/// Cloneable handle to a running backfill engine.
#[derive(Debug, Clone)]
pub struct BackfillHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    cancel: Arc<Notify>,
}

impl BackfillHandle {
    /// Awaits the current queen peer, electing one from the waiting set if
    /// none is set yet.
    pub async fn get_queen_peer(&self) -> PeerId {
        let (tx, rx) = oneshot::channel();
        if self.command_tx.send(Command::GetQueen(tx)).is_err() {
            // engine task is gone; caller is racing shutdown.
            return std::future::pending().await;
        }
        match rx.await {
            Ok(peer) => peer,
            // engine shut down before electing a queen for us.
            Err(_) => std::future::pending().await,
        }
    }

    /// Demotes `peer` from queen, if it currently is one.
    pub fn penalize_queen(&self, peer: PeerId) {
        let _ = self.command_tx.send(Command::PenalizeQueen(peer));
    }

    /// Enqueues a new walk root. No-op if the stack already has a full
    /// request's worth of pending entries.
    pub fn set_root_hash(&self, hash: Hash) {
        let _ = self.command_tx.send(Command::SetRootHash(hash));
    }

    /// Signals the engine's task to shut down. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.notify_one();
    }
}

/// Builds a [`BackfillManager`] and spawns its run loop, returning a handle
/// to it plus the sender side of the peer-event channel it listens on.
pub fn spawn(
    config: BackfillConfig,
    store: Arc<dyn NodeStore>,
) -> (BackfillHandle, mpsc::Sender<PeerEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (peer_tx, peer_rx) = mpsc::channel(config.peer_event_backlog);
    let cancel = Arc::new(Notify::new());

    let manager = BackfillManager::new(config, store, peer_rx, command_rx, command_tx.clone());
    let run_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(err) = manager.run(run_cancel).await {
            tracing::error!(target: "backfill::pipeline", %err, "backfill engine exited fatally");
        }
    });

    (BackfillHandle { command_tx, cancel }, peer_tx)
}
