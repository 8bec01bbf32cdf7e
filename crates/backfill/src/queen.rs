//! C4 — Queen Election.
//!
//! Maintains the single fastest peer, reserved for latency-sensitive
//! foreground traffic and excluded from background backfill requests.

use crate::perf::PerfTrackerMap;
use backfill_types::PeerId;

/// Holds at most one peer. If set, that peer is never present in the
/// waiting set.
#[derive(Debug, Default)]
pub struct QueenSlot {
    current: Option<PeerId>,
}

impl QueenSlot {
    pub fn current(&self) -> Option<PeerId> {
        self.current
    }

    pub fn is_queen(&self, peer: &PeerId) -> bool {
        self.current.as_ref() == Some(peer)
    }

    pub fn clear(&mut self) -> Option<PeerId> {
        self.current.take()
    }

    fn set(&mut self, peer: PeerId) {
        self.current = Some(peer);
    }
}

/// Result of running a peer just popped from the waiting set through
/// election.
#[derive(Debug, PartialEq, Eq)]
pub enum Election {
    /// No queen existed; `peer` is now it. No request is issued this round.
    Crowned,
    /// `peer` was faster than the old queen, which is returned to the
    /// waiting set by the caller. No request is issued this round.
    Switched { demoted: PeerId },
    /// `peer` remains a drone and should proceed to request issuance.
    Drone,
}

/// Runs `peer` (just popped from the waiting set) through the queen
/// state machine described in §4.4.
pub fn elect(slot: &mut QueenSlot, perf: &PerfTrackerMap, peer: PeerId) -> Election {
    match slot.current {
        None => {
            slot.set(peer);
            Election::Crowned
        }
        Some(queen) if queen == peer => {
            // The queen is never in the waiting set; this would mean our
            // invariant broke upstream. Defensively treat it as already
            // being the queen rather than propagating the inconsistency.
            Election::Drone
        }
        Some(queen) => {
            if perf.sort_key(peer) < perf.sort_key(queen) {
                slot.set(peer);
                Election::Switched { demoted: queen }
            } else {
                Election::Drone
            }
        }
    }
}
