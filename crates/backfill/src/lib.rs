//! Background state-trie backfill engine for a beam-syncing client.
//!
//! While foreground sync fetches state nodes on demand to execute recent
//! blocks, this engine walks the historical trie depth-first, requesting
//! missing nodes from connected peers and persisting them locally, without
//! starving the latency-sensitive foreground path. A single fastest "queen"
//! peer is reserved for that foreground path; every other connected peer
//! ("drone") serves this engine's requests.
//!
//! Entry point: [`spawn`] builds the engine against a [`backfill_types::NodeStore`]
//! and returns a [`BackfillHandle`] plus the sender side of the peer-event
//! channel.

mod decode;
mod heap;
mod metrics;
mod perf;
mod pipeline;
mod queen;
mod reporter;
mod walker;

pub mod handle;
pub mod launch;
pub mod subscriber;

#[cfg(test)]
mod test_util;

pub use backfill_types::{
    BackfillConfig, Hash, NodeStore, Peer, PeerHandle, PeerId, PeerRequestError, StoreError,
};
pub use handle::{spawn, BackfillHandle};
pub use subscriber::PeerEvent;
