//! In-Memory Store Module
//!
//! A process-local store client with TTL expiration, used for tests and
//! local development. Supports injecting status codes to exercise failure
//! paths of the adapters.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::store::{
    Bins, Record, StoreClient, StoreConnector, StoreKey, StoreResult, StoreStatus, StoredRecord,
};

// == Memory Store ==
/// Shared in-memory record storage. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    /// Record storage
    records: RwLock<HashMap<StoreKey, StoredRecord>>,
    /// Statuses returned by the next operations, in order
    faults: Mutex<VecDeque<StoreStatus>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Fault Injection ==
    /// Makes the next operation (of any kind) fail with the given status.
    pub async fn fail_next(&self, status: StoreStatus) {
        self.inner.faults.lock().await.push_back(status);
    }

    async fn take_fault(&self) -> StoreResult<()> {
        match self.inner.faults.lock().await.pop_front() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    // == Inspection ==
    /// Returns the stored record for a key, expired or not.
    pub async fn peek(&self, key: &StoreKey) -> Option<StoredRecord> {
        self.inner.records.read().await.get(key).cloned()
    }

    /// Returns the keys of all stored records.
    pub async fn keys(&self) -> Vec<StoreKey> {
        self.inner.records.read().await.keys().cloned().collect()
    }

    /// Returns the current number of records, including expired ones not yet read.
    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn read_live(&self, key: &StoreKey) -> Option<Record> {
        let mut records = self.inner.records.write().await;
        match records.get(key) {
            Some(stored) if stored.is_expired() => {
                records.remove(key);
                None
            }
            Some(stored) => Some(Record::new(key.clone(), stored.bins.clone())),
            None => None,
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &StoreKey) -> StoreResult<Option<Record>> {
        self.take_fault().await?;
        match self.read_live(key).await {
            Some(record) => Ok(Some(record)),
            None => Err(StoreStatus::not_found()),
        }
    }

    async fn put(&self, key: &StoreKey, bins: Bins, ttl: u64) -> StoreResult<()> {
        self.take_fault().await?;
        debug!(key = %key, ttl, "memory store put");
        self.inner
            .records
            .write()
            .await
            .insert(key.clone(), StoredRecord::new(bins, ttl));
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> StoreResult<()> {
        self.take_fault().await?;
        match self.inner.records.write().await.remove(key) {
            Some(stored) if !stored.is_expired() => Ok(()),
            _ => Err(StoreStatus::not_found()),
        }
    }

    async fn get_many(&self, keys: &[StoreKey]) -> StoreResult<Vec<Option<Record>>> {
        self.take_fault().await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            records.push(self.read_live(key).await);
        }
        Ok(records)
    }
}

// == Memory Connector ==
/// Hands out clients backed by one shared [`MemoryStore`].
#[derive(Debug, Default)]
pub struct MemoryConnector {
    store: MemoryStore,
    /// Statuses returned by the next connect attempts, in order
    connect_faults: Mutex<VecDeque<StoreStatus>>,
    /// Number of successful connects
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            connect_faults: Mutex::new(VecDeque::new()),
            connects: AtomicUsize::new(0),
        }
    }

    /// Makes the next connect attempt fail with the given status.
    pub async fn fail_next_connect(&self, status: StoreStatus) {
        self.connect_faults.lock().await.push_back(status);
    }

    /// Number of clients created so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    type Client = MemoryStore;

    async fn connect(&self, config: &ConnectionConfig) -> StoreResult<MemoryStore> {
        if let Some(status) = self.connect_faults.lock().await.pop_front() {
            return Err(status);
        }
        if config.hosts.is_empty() {
            return Err(StoreStatus::new(-1, "no hosts configured"));
        }
        // Simulate the network handshake so concurrent first-use can interleave
        tokio::task::yield_now().await;
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.clone())
    }
}
