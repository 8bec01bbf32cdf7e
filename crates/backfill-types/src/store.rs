use crate::hash::Hash;

/// Content-addressed, hash-indexed byte store.
///
/// Keys are 32-byte hashes; values are opaque bytes, a few KiB at most in
/// practice. The backfill engine never verifies that a stored value hashes to
/// its key — that invariant belongs to whoever writes through this trait.
#[async_trait::async_trait]
pub trait NodeStore: Send + Sync {
    /// Point lookup. `Ok(None)` means "not present", not an error.
    async fn get(&self, hash: Hash) -> Result<Option<bytes::Bytes>, StoreError>;

    /// Writes a batch of nodes atomically: readers never observe a partial
    /// batch.
    async fn put_batch(&self, items: Vec<(Hash, bytes::Bytes)>) -> Result<(), StoreError>;
}

/// A store failure. Unlike peer or decode failures, these are fatal to the
/// engine — the enclosing supervisor decides whether to restart.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store read failed: {0}")]
    Read(String),
    #[error("store write failed: {0}")]
    Write(String),
}
