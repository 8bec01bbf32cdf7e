//! C3 — Waiting-Peer Heap.
//!
//! A priority "queue" of peers ordered by [`PerfTrackerMap`]'s sort key. The
//! key is read at pop time, not at insert time, so a peer that sped up while
//! waiting is picked up on its next comparison rather than its stale
//! insertion-time rank — which rules out a textbook binary heap: membership
//! is the invariant we maintain, ranking is recomputed fresh on every pop.

use crate::perf::PerfTrackerMap;
use backfill_types::PeerId;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::Notify;

/// Peers currently eligible for a background request.
///
/// Invariant: a peer appears at most once. The queen is never a member.
#[derive(Debug)]
pub struct WaitingPeers {
    order: Vec<PeerId>,
    present: HashSet<PeerId>,
    ready: Arc<Notify>,
}

impl WaitingPeers {
    pub fn new(ready: Arc<Notify>) -> Self {
        Self { order: Vec::new(), present: HashSet::new(), ready }
    }

    /// Non-blocking insert. A peer already present is a no-op.
    pub fn put(&mut self, peer: PeerId) {
        if self.present.insert(peer) {
            self.order.push(peer);
            self.ready.notify_one();
        }
    }

    /// Removes a peer by identity, e.g. on session close. Returns whether it
    /// was present.
    pub fn remove(&mut self, peer: &PeerId) -> bool {
        if self.present.remove(peer) {
            self.order.retain(|p| p != peer);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.present.contains(peer)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Removes and returns the peer with the lowest current sort key, or
    /// `None` if the set is empty. Ties are broken by earliest insertion,
    /// which is deterministic for a given sequence of `put` calls.
    pub fn try_pop_fastest(&mut self, perf: &PerfTrackerMap) -> Option<PeerId> {
        let (idx, _) = self
            .order
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                perf.sort_key(**a)
                    .partial_cmp(&perf.sort_key(**b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        let peer = self.order.remove(idx);
        self.present.remove(&peer);
        Some(peer)
    }

    /// Awaits until at least one peer is present, then pops the fastest one.
    pub async fn get_fastest(&mut self, perf: &PerfTrackerMap) -> PeerId {
        loop {
            if let Some(peer) = self.try_pop_fastest(perf) {
                return peer;
            }
            self.ready.notified().await;
        }
    }
}
