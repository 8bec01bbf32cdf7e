//! C5 — Depth-First Walker.
//!
//! Expands locally-known trie nodes into their children so that the tail of
//! the hash stack always holds a request's worth of confirmed-missing
//! entries before the pipeline bothers asking a peer for anything.

use crate::decode;
use backfill_types::{Hash, NodeStore, StoreError};
use std::collections::HashSet;

/// Ordered sequence of hashes scheduled for evaluation. The tail (last
/// element) is the top of the stack. Duplicates are tolerated —
/// deduplication against [`MissingSet`] is opportunistic, not enforced.
pub type HashStack = Vec<Hash>;

/// Cache of hashes already confirmed absent from the local store, valid for
/// the lifetime of one engine run. Entries are removed only when the
/// corresponding node is successfully persisted.
pub type MissingSet = HashSet<Hash>;

fn tail_is_full_of_missing(stack: &HashStack, missing: &MissingSet, request_size: usize) -> bool {
    stack.len() >= request_size
        && stack[stack.len() - request_size..].iter().all(|h| missing.contains(h))
}

/// Expands the stack until its tail holds `request_size` confirmed-missing
/// entries, or nothing more can be expanded.
///
/// Yields cooperatively after every store access (hit or miss) so that
/// request completions and peer events aren't starved by a long walk.
pub async fn walk(
    stack: &mut HashStack,
    missing: &mut MissingSet,
    store: &dyn NodeStore,
    request_size: usize,
) -> Result<(), StoreError> {
    loop {
        if tail_is_full_of_missing(stack, missing, request_size) {
            return Ok(());
        }

        let mut found_hit = false;
        let mut idx = stack.len();
        while idx > 0 {
            idx -= 1;
            let hash = stack[idx];
            if missing.contains(&hash) {
                continue;
            }

            match store.get(hash).await? {
                Some(bytes) => {
                    stack.remove(idx);
                    for child in decode::child_hashes(&bytes) {
                        stack.push(child);
                    }
                    found_hit = true;
                    tokio::task::yield_now().await;
                    break;
                }
                None => {
                    missing.insert(hash);
                    tokio::task::yield_now().await;
                }
            }
        }

        if !found_hit {
            // Scanned all the way to the bottom without a hit: nothing more
            // to expand right now.
            return Ok(());
        }
    }
}
