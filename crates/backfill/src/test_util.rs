//! In-memory test doubles for [`NodeStore`] and [`Peer`], analogous to
//! `reth_provider::test_utils`.

use backfill_types::{Hash, NodeStore, Peer, PeerId, PeerRequestError, StoreError};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

/// A [`NodeStore`] backed by a plain `HashMap`, guarded by a blocking mutex
/// since test scenarios never contend on it across real parallelism.
#[derive(Debug, Default, Clone)]
pub struct MapStore {
    inner: Arc<Mutex<HashMap<Hash, bytes::Bytes>>>,
}

impl MapStore {
    pub fn from_iter(items: impl IntoIterator<Item = (Hash, bytes::Bytes)>) -> Self {
        Self { inner: Arc::new(Mutex::new(items.into_iter().collect())) }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.lock().unwrap().contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
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

/// Scripted response for one `get_node_data` call.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Return(Vec<(Hash, bytes::Bytes)>),
    Timeout,
    Gone,
    Error,
}

/// A [`Peer`] whose `get_node_data` responses are scripted in advance, one
/// per call, in order. Exhausting the script returns an empty success.
#[derive(Debug)]
pub struct MockPeer {
    id: PeerId,
    operational: AtomicBool,
    requesting: AtomicBool,
    script: Mutex<Vec<ScriptedResponse>>,
}

impl MockPeer {
    pub fn new(id: PeerId, script: Vec<ScriptedResponse>) -> Arc<Self> {
        Arc::new(Self {
            id,
            operational: AtomicBool::new(true),
            requesting: AtomicBool::new(false),
            script: Mutex::new(script),
        })
    }

    pub fn set_operational(&self, value: bool) {
        self.operational.store(value, Ordering::SeqCst);
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
        self.requesting.load(Ordering::SeqCst)
    }

    async fn get_node_data(
        &self,
        hashes: Vec<Hash>,
    ) -> Result<Vec<(Hash, bytes::Bytes)>, PeerRequestError> {
        self.requesting.store(true, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() { ScriptedResponse::Return(Vec::new()) } else { script.remove(0) }
        };
        let result = match next {
            ScriptedResponse::Return(mut items) => {
                items.retain(|(hash, _)| hashes.contains(hash));
                Ok(items)
            }
            ScriptedResponse::Timeout => Err(PeerRequestError::Timeout),
            ScriptedResponse::Gone => Err(PeerRequestError::Gone),
            ScriptedResponse::Error => Err(PeerRequestError::Other("mock error".into())),
        };
        self.requesting.store(false, Ordering::SeqCst);
        result
    }

    fn disconnect(&self) {
        self.operational.store(false, Ordering::SeqCst);
    }
}
