//! C6 — Request Pipeline.
//!
//! Owns every piece of mutable engine state (`HashStack`, `MissingSet`,
//! `WaitingPeers`, `QueenSlot`, `PerfTrackerMap`, counters) behind one task.
//! External callers never touch this state directly; they go through
//! [`crate::handle::BackfillHandle`], which serializes requests onto
//! `command_rx` the same way `reth_network::NetworkManager` serializes
//! `NetworkHandle` calls onto its own command channel.

use crate::{
    decode, heap::WaitingPeers, metrics::BackfillMetrics, perf::PerfTrackerMap, queen,
    queen::QueenSlot, reporter, reporter::Counters, subscriber::PeerEvent, walker,
};
use backfill_types::{
    BackfillConfig, Hash, NodeStore, PeerHandle, PeerId, PeerRequestError, StoreError,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot, Notify};

/// A request the pipeline accepts from outside its own task.
#[derive(Debug)]
pub enum Command {
    /// Await the current queen, replying once one is elected.
    GetQueen(oneshot::Sender<PeerId>),
    /// Demote `peer` from queen, if it currently is one.
    PenalizeQueen(PeerId),
    /// Enqueue a new walk root.
    SetRootHash(Hash),
    /// Re-offer a peer to the waiting set after a cool-down elapsed.
    ReinsertPeer(PeerId),
}

/// Result of one `make_request` task, reported back to the owning task.
#[derive(Debug)]
struct RequestOutcome {
    peer: PeerId,
    hashes: Vec<Hash>,
    elapsed: Duration,
    result: Result<Vec<(Hash, bytes::Bytes)>, PeerRequestError>,
}

/// The single task that owns the backfill engine's state.
///
/// Mirrors the split between `reth_network::NetworkManager` (owns state, runs
/// the event loop) and `NetworkHandle` (cloneable, talks to it over a channel).
pub struct BackfillManager {
    config: BackfillConfig,
    store: Arc<dyn NodeStore>,
    metrics: BackfillMetrics,

    peers: HashMap<PeerId, PeerHandle>,
    waiting: WaitingPeers,
    ready: Arc<Notify>,
    queen: QueenSlot,
    perf: PerfTrackerMap,

    hash_stack: walker::HashStack,
    missing: walker::MissingSet,
    counters: Counters,
    requests_by_peer: HashMap<PeerId, u64>,

    queen_waiters: Vec<oneshot::Sender<PeerId>>,

    command_rx: mpsc::UnboundedReceiver<Command>,
    command_tx: mpsc::UnboundedSender<Command>,
    peer_events_rx: mpsc::Receiver<PeerEvent>,
    outcome_tx: mpsc::UnboundedSender<RequestOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<RequestOutcome>,
}

impl std::fmt::Debug for BackfillManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackfillManager")
            .field("peers", &self.peers.len())
            .field("hash_stack", &self.hash_stack.len())
            .field("queen", &self.queen.current())
            .finish_non_exhaustive()
    }
}

impl BackfillManager {
    pub fn new(
        config: BackfillConfig,
        store: Arc<dyn NodeStore>,
        peer_events_rx: mpsc::Receiver<PeerEvent>,
        command_rx: mpsc::UnboundedReceiver<Command>,
        command_tx: mpsc::UnboundedSender<Command>,
    ) -> Self {
        let ready = Arc::new(Notify::new());
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            config,
            store,
            metrics: BackfillMetrics::default(),
            peers: HashMap::new(),
            waiting: WaitingPeers::new(ready.clone()),
            ready,
            queen: QueenSlot::default(),
            perf: PerfTrackerMap::default(),
            hash_stack: walker::HashStack::new(),
            missing: walker::MissingSet::default(),
            counters: Counters::default(),
            requests_by_peer: HashMap::new(),
            queen_waiters: Vec::new(),
            command_rx,
            command_tx,
            peer_events_rx,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Runs the engine until `cancel` fires, or a store failure occurs.
    ///
    /// Store failures are fatal (§7): the loop returns `Err` immediately
    /// rather than continuing to spin against a broken store. Consumes
    /// `self`; restarting after a fatal error is the embedder's call.
    pub async fn run(mut self, cancel: Arc<Notify>) -> Result<(), StoreError> {
        let mut report_tick = tokio::time::interval(self.config.report_interval);
        report_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.notified() => {
                    tracing::debug!(target: "backfill::pipeline", "cancellation observed, shutting down");
                    return Ok(());
                }
                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command);
                }
                Some(event) = self.peer_events_rx.recv() => {
                    self.handle_peer_event(event);
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    if let Err(err) = self.handle_outcome(outcome).await {
                        tracing::error!(target: "backfill::pipeline", %err, "fatal store error, shutting down backfill engine");
                        return Err(err);
                    }
                }
                _ = report_tick.tick() => {
                    reporter::report(
                        &mut self.counters,
                        &mut self.requests_by_peer,
                        self.queen.current(),
                        self.hash_stack.is_empty(),
                    );
                }
                result = self.try_dispatch_once() => {
                    if let Err(err) = result {
                        tracing::error!(target: "backfill::pipeline", %err, "fatal store error, shutting down backfill engine");
                        return Err(err);
                    }
                }
            }

            self.metrics.hash_stack_depth(self.hash_stack.len());
            self.metrics.waiting_peers(self.waiting.len());
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::GetQueen(reply) => {
                if let Some(queen) = self.queen.current() {
                    let _ = reply.send(queen);
                } else {
                    self.queen_waiters.push(reply);
                }
            }
            Command::PenalizeQueen(peer) => self.penalize_queen(peer),
            Command::SetRootHash(hash) => self.set_root_hash(hash),
            Command::ReinsertPeer(peer) => {
                if self.peers.contains_key(&peer) {
                    self.waiting.put(peer);
                }
            }
        }
    }

    fn penalize_queen(&mut self, peer: PeerId) {
        if !self.queen.is_queen(&peer) {
            return;
        }
        self.queen.clear();
        self.schedule_reinsert(peer, self.config.non_ideal_response_penalty);
    }

    fn set_root_hash(&mut self, hash: Hash) {
        if self.hash_stack.len() >= self.config.request_size {
            return;
        }
        self.hash_stack.push(hash);
    }

    fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Joined(peer) => {
                let id = peer.id();
                self.peers.insert(id, peer);
                self.waiting.put(id);
            }
            PeerEvent::Left(id) => {
                self.peers.remove(&id);
                self.waiting.remove(&id);
                self.perf.remove(&id);
                if self.queen.is_queen(&id) {
                    self.queen.clear();
                }
            }
        }
    }

    fn schedule_reinsert(&self, peer: PeerId, delay: Duration) {
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::ReinsertPeer(peer));
        });
    }

    fn crown_queen(&mut self, peer: PeerId) {
        for waiter in self.queen_waiters.drain(..) {
            let _ = waiter.send(peer);
        }
    }

    /// One pass of the outer loop described in §4.6: walk, pop a peer, elect
    /// or dispatch. Always makes progress in finite time — on an idle stack
    /// or an in-flight peer it reschedules and returns rather than blocking
    /// the task, so peer events and request outcomes are never starved.
    ///
    /// A store read failure is fatal (§7) and propagates to the caller
    /// instead of being logged and retried forever.
    async fn try_dispatch_once(&mut self) -> Result<(), StoreError> {
        walker::walk(&mut self.hash_stack, &mut self.missing, self.store.as_ref(), self.config.request_size)
            .await?;

        let peer = self.waiting.get_fastest(&self.perf).await;

        let Some(handle) = self.peers.get(&peer).cloned() else {
            // left the pool between being waited-on and being popped.
            return Ok(());
        };

        if !handle.is_operational() {
            self.peers.remove(&peer);
            self.perf.remove(&peer);
            if self.queen.is_queen(&peer) {
                self.queen.clear();
            }
            return Ok(());
        }

        match queen::elect(&mut self.queen, &self.perf, peer) {
            queen::Election::Crowned => {
                self.crown_queen(peer);
                return Ok(());
            }
            queen::Election::Switched { demoted } => {
                self.metrics.queen_switch();
                self.waiting.put(demoted);
                self.crown_queen(peer);
                return Ok(());
            }
            queen::Election::Drone => {}
        }

        if handle.is_requesting() {
            self.schedule_reinsert(peer, self.config.reentrancy_retry_delay);
            return Ok(());
        }

        let take_from = self.hash_stack.len().saturating_sub(self.config.request_size);
        let on_deck: Vec<Hash> = self.hash_stack.split_off(take_from);

        if on_deck.is_empty() {
            self.schedule_reinsert(peer, self.config.idle_retry_delay);
            return Ok(());
        }

        self.spawn_request(handle, peer, on_deck);
        Ok(())
    }

    fn spawn_request(&mut self, handle: PeerHandle, peer: PeerId, hashes: Vec<Hash>) {
        *self.requests_by_peer.entry(peer).or_insert(0) += 1;

        let outcome_tx = self.outcome_tx.clone();
        let requested = hashes.clone();
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let result = handle.get_node_data(requested.clone()).await;
            let elapsed = started.elapsed();
            let _ = outcome_tx.send(RequestOutcome { peer, hashes: requested, elapsed, result });
        });
    }

    /// A store write failure is fatal (§7) and propagates to the caller.
    /// It is never swallowed-and-continued: doing so would silently drop
    /// every hash in the batch, violating hash conservation (§8 invariant
    /// 3) since neither the write nor a re-enqueue would have happened.
    async fn handle_outcome(&mut self, outcome: RequestOutcome) -> Result<(), StoreError> {
        let RequestOutcome { peer, hashes, elapsed, result } = outcome;

        match result {
            Ok(returned) => {
                let items_len = returned.len();
                self.perf.record(peer, items_len, elapsed);

                let returned_hashes: std::collections::HashSet<Hash> =
                    returned.iter().map(|(hash, _)| *hash).collect();

                if !returned.is_empty() {
                    self.store.put_batch(returned.clone()).await?;
                    for (hash, bytes) in &returned {
                        self.missing.remove(hash);
                        self.counters.added += 1;
                        self.counters.total_processed += 1;
                        self.metrics.node_added();
                        for child in decode::child_hashes(bytes) {
                            self.hash_stack.push(child);
                        }
                    }
                }

                for hash in &hashes {
                    if !returned_hashes.contains(hash) {
                        self.counters.missed += 1;
                        self.metrics.node_missed();
                        self.hash_stack.push(*hash);
                    }
                }

                self.schedule_reinsert(peer, self.config.gap_between_tests);
            }
            Err(PeerRequestError::Timeout) => {
                self.metrics.request_timeout();
                self.hash_stack.extend(hashes);
                self.schedule_reinsert(peer, 2 * self.config.gap_between_tests);
            }
            Err(PeerRequestError::Gone) => {
                self.hash_stack.extend(hashes);
                self.peers.remove(&peer);
                self.perf.remove(&peer);
                self.waiting.remove(&peer);
                if self.queen.is_queen(&peer) {
                    self.queen.clear();
                }
            }
            Err(PeerRequestError::Other(reason)) => {
                tracing::debug!(target: "backfill::pipeline", %reason, ?peer, "request failed");
                self.metrics.request_error();
                self.hash_stack.extend(hashes);
                self.schedule_reinsert(peer, 2 * self.config.gap_between_tests);
            }
        }

        Ok(())
    }
}
