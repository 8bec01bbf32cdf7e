//! C1 — Trie Node Decoder.
//!
//! Given the raw bytes of a persisted trie node, yields the set of 32-byte
//! child hashes to enqueue. Never fails the caller: undecodable input (most
//! commonly contract bytecode addressed by its own hash in the same store)
//! simply yields an empty set.

use alloy_rlp::Header;
use backfill_types::Hash;
use std::collections::HashSet;

/// One element of a decoded RLP list, as a slice into the original buffer.
struct Item<'a> {
    is_list: bool,
    bytes: &'a [u8],
}

#[derive(Debug, thiserror::Error)]
enum DecodeError {
    #[error("rlp decode error: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    #[error("node blob is not an rlp list")]
    NotAList,
}

/// Decodes `buf` as a single top-level RLP list and returns its elements.
fn decode_items(mut buf: &[u8]) -> Result<Vec<Item<'_>>, DecodeError> {
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(DecodeError::NotAList);
    }
    let mut payload = &buf[..header.payload_length];
    let mut items = Vec::new();
    while !payload.is_empty() {
        let item_header = Header::decode(&mut payload)?;
        let content = &payload[..item_header.payload_length];
        payload = &payload[item_header.payload_length..];
        items.push(Item { is_list: item_header.list, bytes: content });
    }
    Ok(items)
}

/// Returns the set of child hashes to explore from a node's raw bytes.
///
/// Rules (§4.1):
/// - A 17-element list (branch node): every element among the first 16 whose
///   byte length is exactly 32 is a child hash.
/// - A 2-element list whose second element is 32 bytes (extension node):
///   that element is the single child hash.
/// - Anything else (leaf with an inlined value, or an unrecognised shape, or
///   input that doesn't even parse as RLP): no children.
pub fn child_hashes(bytes: &[u8]) -> HashSet<Hash> {
    let Ok(items) = decode_items(bytes) else {
        return HashSet::new();
    };

    match items.len() {
        17 => items[..16]
            .iter()
            .filter(|item| !item.is_list && item.bytes.len() == 32)
            .map(|item| Hash::from_slice(item.bytes))
            .collect(),
        2 if !items[1].is_list && items[1].bytes.len() == 32 => {
            HashSet::from([Hash::from_slice(items[1].bytes)])
        }
        _ => HashSet::new(),
    }
}
