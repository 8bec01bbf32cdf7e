/// 32-byte content identifier of a trie node.
pub type Hash = alloy_primitives::B256;

/// Opaque identity of a connected peer.
///
/// Equality and hashing are stable for the peer's lifetime; a new connection
/// from the same remote address is a distinct [`PeerId`]. The underlying
/// representation mirrors the devp2p node id (a secp256k1 public key) the way
/// upstream peer-to-peer stacks address connections, but this crate never
/// inspects the bytes — it only needs `Eq + Hash + Copy`.
pub type PeerId = alloy_primitives::B512;
