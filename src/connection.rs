//! Store Connection Module
//!
//! Owns the lazily-created store client shared by the adapters.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{AdapterError, Result};
use crate::store::{Bins, Record, StoreClient, StoreConnector, StoreKey};

// == Store Connection ==
/// A store connection whose client is created on first use.
///
/// Concurrent first use is serialized: one creation attempt runs and every
/// caller receives the same client. A failed attempt leaves nothing cached,
/// so the next call tries again.
pub struct StoreConnection<C: StoreConnector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    client: OnceCell<Arc<C::Client>>,
}

impl<C: StoreConnector> StoreConnection<C> {
    // == Constructors ==
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        Self::with_connector(Arc::new(connector), config)
    }

    /// Creates a connection using a connector shared with other connections.
    pub fn with_connector(connector: Arc<C>, config: ConnectionConfig) -> Self {
        Self {
            connector,
            config,
            client: OnceCell::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn set(&self) -> &str {
        &self.config.set
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether a client has been created.
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    // == Connect ==
    /// Returns the client, creating it on first call.
    pub async fn connect(&self) -> Result<Arc<C::Client>> {
        self.client
            .get_or_try_init(|| async {
                match self.connector.connect(&self.config).await {
                    Ok(client) => {
                        info!(
                            hosts = ?self.config.hosts,
                            namespace = %self.config.namespace,
                            set = %self.config.set,
                            persistent = self.config.persistent,
                            "Store connection opened"
                        );
                        Ok(Arc::new(client))
                    }
                    Err(status) => {
                        warn!(
                            code = status.code,
                            "Failed to open store connection: {}", status.message
                        );
                        Err(AdapterError::connection(status))
                    }
                }
            })
            .await
            .map(Arc::clone)
    }

    // == Delegated Operations ==
    /// Reads a record; "record not found" is reported as `None`.
    pub async fn get(&self, key: &StoreKey) -> Result<Option<Record>> {
        let client = self.connect().await?;
        match client.get(key).await {
            Ok(record) => Ok(record),
            Err(status) if status.is_not_found() => Ok(None),
            Err(status) => Err(AdapterError::store(status)),
        }
    }

    pub async fn put(&self, key: &StoreKey, bins: Bins, ttl: u64) -> Result<()> {
        let client = self.connect().await?;
        client.put(key, bins, ttl).await.map_err(AdapterError::store)
    }

    pub async fn remove(&self, key: &StoreKey) -> Result<()> {
        let client = self.connect().await?;
        client.remove(key).await.map_err(AdapterError::store)
    }

    pub async fn get_many(&self, keys: &[StoreKey]) -> Result<Vec<Option<Record>>> {
        let client = self.connect().await?;
        client.get_many(keys).await.map_err(AdapterError::store)
    }
}

// == Status Acknowledgement ==
/// Maps a write outcome onto the boolean contract of the adapters: a store
/// status becomes `false`, connection failures still propagate.
pub(crate) fn acknowledged(outcome: Result<()>, operation: &str, key: &StoreKey) -> Result<bool> {
    match outcome {
        Ok(()) => {
            debug!(key = %key, "{} acknowledged", operation);
            Ok(true)
        }
        Err(AdapterError::Store { code, message }) => {
            warn!(key = %key, code, "{} rejected by store: {}", operation, message);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryConnector, MemoryStore, StoreStatus, Value};

    fn connection() -> StoreConnection<MemoryConnector> {
        StoreConnection::new(
            MemoryConnector::new(MemoryStore::new()),
            ConnectionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_connect_is_lazy_and_idempotent() {
        let conn = connection();
        assert!(!conn.is_connected());

        let first = conn.connect().await.unwrap();
        let second = conn.connect().await.unwrap();

        assert!(conn.is_connected());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(conn.connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_is_surfaced_and_retried() {
        let conn = connection();
        conn.connector
            .fail_next_connect(StoreStatus::new(-1, "connection refused"))
            .await;

        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, AdapterError::Connection { code: -1, .. }));
        assert!(!conn.is_connected());

        assert!(conn.connect().await.is_ok());
        assert_eq!(conn.connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_creates_one_client() {
        let conn = Arc::new(connection());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let conn = conn.clone();
                tokio::spawn(async move { conn.connect().await.unwrap() })
            })
            .collect();

        let mut clients = Vec::new();
        for handle in handles {
            clients.push(handle.await.unwrap());
        }

        assert_eq!(conn.connector.connect_count(), 1);
        assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
    }

    #[tokio::test]
    async fn test_get_maps_not_found_to_none() {
        let conn = connection();
        let key = StoreKey::new("test", "test", "missing");

        assert!(conn.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_operation_status_becomes_store_error() {
        let conn = connection();
        let key = StoreKey::new("test", "test", "k");
        conn.connector
            .store()
            .fail_next(StoreStatus::new(1, "server error"))
            .await;

        let err = conn.get(&key).await.unwrap_err();
        assert!(matches!(err, AdapterError::Store { code: 1, .. }));
    }

    #[tokio::test]
    async fn test_acknowledged_maps_status_to_false() {
        let key = StoreKey::new("test", "test", "k");

        assert!(acknowledged(Ok(()), "put", &key).unwrap());
        let rejected = Err(AdapterError::store(StoreStatus::new(13, "record too big")));
        assert!(!acknowledged(rejected, "put", &key).unwrap());
        let broken = Err(AdapterError::connection(StoreStatus::new(-1, "down")));
        assert!(acknowledged(broken, "put", &key).is_err());
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let conn = connection();
        let key = StoreKey::new("test", "test", "k");
        let bins = Bins::from([("value".to_string(), Value::from(1))]);

        conn.put(&key, bins.clone(), 0).await.unwrap();
        let record = conn.get(&key).await.unwrap().unwrap();

        assert_eq!(record.bins, bins);
    }
}
