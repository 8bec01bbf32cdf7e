//! C7 — Peer Pool Subscriber.
//!
//! Listens for peer join/leave events and registers peers with the waiting
//! set and queen slot. Declares zero interest in any other peer-pool
//! message — membership is all it needs.

use backfill_types::{PeerHandle, PeerId};

/// A membership event from the peer pool.
#[derive(Debug)]
pub enum PeerEvent {
    Joined(PeerHandle),
    Left(PeerId),
}
