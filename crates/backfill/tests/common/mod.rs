use backfill::{Hash, NodeStore, Peer, PeerHandle, PeerId, PeerRequestError, StoreError};
use alloy_rlp::Encodable;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

#[derive(Debug, Default, Clone)]
pub struct MapStore {
    inner: Arc<Mutex<HashMap<Hash, bytes::Bytes>>>,
}

impl MapStore {
    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.lock().unwrap().contains_key(hash)
    }
}

#[async_trait::async_trait]
impl NodeStore for MapStore {
    async fn get(&self, hash: Hash) -> Result<Option<bytes::Bytes>, StoreError> {
        Ok(self.inner.lock().unwrap().get(&hash).cloned())
    }

    async fn put_batch(&self, items: Vec<(Hash, bytes::Bytes)>) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().unwrap();
        for (hash, bytes) in items {
            guard.insert(hash, bytes);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Return(Vec<(Hash, bytes::Bytes)>),
    #[allow(dead_code)]
    Timeout,
    #[allow(dead_code)]
    Gone,
    #[allow(dead_code)]
    Error,
}

#[derive(Debug)]
pub struct MockPeer {
    id: PeerId,
    operational: AtomicBool,
    script: Mutex<Vec<ScriptedResponse>>,
}

impl MockPeer {
    pub fn new(id: PeerId, script: Vec<ScriptedResponse>) -> PeerHandle {
        Arc::new(Self { id, operational: AtomicBool::new(true), script: Mutex::new(script) })
    }
}

#[async_trait::async_trait]
impl Peer for MockPeer {
    fn id(&self) -> PeerId {
        self.id
    }

    fn is_operational(&self) -> bool {
        self.operational.load(Ordering::SeqCst)
    }

    fn is_requesting(&self) -> bool {
        false
    }

    async fn get_node_data(
        &self,
        hashes: Vec<Hash>,
    ) -> Result<Vec<(Hash, bytes::Bytes)>, PeerRequestError> {
        let next = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() { ScriptedResponse::Return(Vec::new()) } else { script.remove(0) }
        };
        match next {
            ScriptedResponse::Return(mut items) => {
                items.retain(|(hash, _)| hashes.contains(hash));
                Ok(items)
            }
            ScriptedResponse::Timeout => Err(PeerRequestError::Timeout),
            ScriptedResponse::Gone => Err(PeerRequestError::Gone),
            ScriptedResponse::Error => Err(PeerRequestError::Other("mock error".into())),
        }
    }

    fn disconnect(&self) {
        self.operational.store(false, Ordering::SeqCst);
    }
}

pub fn leaf_blob(value: &[u8]) -> bytes::Bytes {
    let mut payload = Vec::new();
    (&[0x20u8][..]).encode(&mut payload);
    value.encode(&mut payload);
    let mut out = Vec::new();
    alloy_rlp::Header { list: true, payload_length: payload.len() }.encode(&mut out);
    out.extend_from_slice(&payload);
    out.into()
}

pub fn branch_blob(children: &[Hash]) -> bytes::Bytes {
    let mut payload = Vec::new();
    for child in children {
        child.as_slice().encode(&mut payload);
    }
    for _ in children.len()..16 {
        (&[][..]).encode(&mut payload);
    }
    (&[][..]).encode(&mut payload);
    let mut out = Vec::new();
    alloy_rlp::Header { list: true, payload_length: payload.len() }.encode(&mut out);
    out.extend_from_slice(&payload);
    out.into()
}

/// Builds a root branching into `a` (leaf) and `b` (branch with leaf child `c`).
#[allow(clippy::type_complexity)]
pub fn three_level_branch() -> (Hash, Hash, Hash, Hash, HashMap<Hash, (Hash, bytes::Bytes)>) {
    let a = Hash::repeat_byte(2);
    let b = Hash::repeat_byte(3);
    let c = Hash::repeat_byte(4);
    let root = Hash::repeat_byte(1);

    let mut blobs = HashMap::new();
    blobs.insert(root, (root, branch_blob(&[a, b])));
    blobs.insert(a, (a, leaf_blob(b"a")));
    blobs.insert(b, (b, branch_blob(&[c])));
    blobs.insert(c, (c, leaf_blob(b"c")));

    (root, a, b, c, blobs)
}
