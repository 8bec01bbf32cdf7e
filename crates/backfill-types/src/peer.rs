use crate::hash::{Hash, PeerId};
use std::sync::Arc;

/// A connected remote peer, as seen by the backfill engine.
///
/// This is intentionally narrow: the engine never needs to know about
/// sessions, capabilities negotiation or wire framing. Implementations are
/// owned by the peer pool; the engine only ever holds a non-owning
/// [`PeerHandle`] and must tolerate the peer disappearing between calls.
#[async_trait::async_trait]
pub trait Peer: Send + Sync + std::fmt::Debug {
    /// Stable identity of this peer.
    fn id(&self) -> PeerId;

    /// Whether the session backing this peer can still accept requests.
    ///
    /// Checked at the moment a peer is popped from the waiting set; the
    /// engine does not otherwise track session liveness itself.
    fn is_operational(&self) -> bool;

    /// Whether a `get_node_data` request to this peer is already in flight.
    ///
    /// Used as the reentrancy guard: at most one outstanding request per peer.
    fn is_requesting(&self) -> bool;

    /// Requests the raw bytes for a batch of trie-node hashes.
    ///
    /// Returns only the hashes the peer actually had, in arbitrary order. The
    /// caller does not verify that returned bytes hash to the requested key —
    /// that is this method's contract, owned by the transport layer.
    async fn get_node_data(
        &self,
        hashes: Vec<Hash>,
    ) -> Result<Vec<(Hash, bytes::Bytes)>, PeerRequestError>;

    /// Disconnects the peer. Used when the peer is found to be misbehaving.
    fn disconnect(&self);
}

/// Non-owning, shareable reference to a connected peer.
pub type PeerHandle = Arc<dyn Peer>;

/// Outcome taxonomy for a `get_node_data` request, as classified by the
/// transport layer. Every request resolves into one of these; there is no
/// generic "request failed" bucket left unclassified.
#[derive(Debug, thiserror::Error)]
pub enum PeerRequestError {
    /// The transport-level timeout elapsed before a response arrived.
    #[error("peer request timed out")]
    Timeout,
    /// The peer disconnected, or the request was cancelled because it did.
    #[error("peer is gone")]
    Gone,
    /// Any other transport or protocol-level failure.
    #[error("peer request failed: {0}")]
    Other(String),
}
