//! Cache Adapter Module
//!
//! General-purpose cache operations over a shared store connection.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::{RecordCodec, ValueCodec};
use crate::config::CacheConfig;
use crate::connection::{acknowledged, StoreConnection};
use crate::error::{AdapterError, Result};
use crate::key::{CacheKey, KeyBuilder};
use crate::registry::{ConnectionRef, ConnectionRegistry};
use crate::store::{StoreConnector, StoreKey, Value};

// == Mset Report ==
/// Outcome of a batch write. Entries are written independently, so a batch
/// can be partially applied.
#[derive(Debug, Default)]
pub struct MsetReport {
    /// Keys whose write was acknowledged
    pub written: Vec<CacheKey>,
    /// Keys whose write was rejected or failed
    pub failed: Vec<CacheKey>,
}

impl MsetReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// == Cache Adapter ==
/// Cache keyed by [`CacheKey`] storing [`Value`]s in the `value` bin.
///
/// Values are written without transformation. No local caching happens:
/// every call reaches the store.
pub struct CacheAdapter<C: StoreConnector> {
    connection: Arc<StoreConnection<C>>,
    keys: KeyBuilder,
    codec: ValueCodec,
}

impl<C: StoreConnector> CacheAdapter<C> {
    // == Constructors ==
    pub fn new(connection: Arc<StoreConnection<C>>, config: CacheConfig) -> Self {
        let keys = KeyBuilder::new(connection.namespace(), connection.set(), config.key_prefix);
        Self {
            connection,
            keys,
            codec: ValueCodec,
        }
    }

    /// Resolves the connection reference against a registry.
    ///
    /// Fails with [`AdapterError::Configuration`] if the reference does not
    /// lead to a usable connection.
    pub fn from_ref(
        reference: ConnectionRef<C>,
        registry: &ConnectionRegistry<C>,
        config: CacheConfig,
    ) -> Result<Self> {
        Ok(Self::new(registry.resolve(reference)?, config))
    }

    pub fn connection(&self) -> &Arc<StoreConnection<C>> {
        &self.connection
    }

    pub fn key_prefix(&self) -> &str {
        self.keys.prefix()
    }

    // == Build Key ==
    /// Returns the store key an application key maps to.
    pub async fn build_key(&self, key: &CacheKey) -> Result<StoreKey> {
        let client = self.connection.connect().await?;
        Ok(self.keys.build(client.as_ref(), key))
    }

    // == Get ==
    /// Retrieves a value. `None` means nothing is stored under the key.
    pub async fn get(&self, key: impl Into<CacheKey>) -> Result<Option<Value>> {
        let store_key = self.build_key(&key.into()).await?;
        let record = self.connection.get(&store_key).await?;
        let value = self.codec.decode(record)?;

        debug!(key = %store_key, hit = value.is_some(), "cache get");
        Ok(value)
    }

    // == Set ==
    /// Stores a value with a TTL in seconds (0 = store default).
    ///
    /// Returns whether the store acknowledged the write.
    pub async fn set(&self, key: impl Into<CacheKey>, value: Value, ttl: u64) -> Result<bool> {
        let store_key = self.build_key(&key.into()).await?;
        let outcome = self
            .connection
            .put(&store_key, self.codec.encode(value), ttl)
            .await;
        acknowledged(outcome, "cache set", &store_key)
    }

    // == Add ==
    /// Stores a value. An existing value under the key is overwritten, the
    /// same as [`CacheAdapter::set`].
    pub async fn add(&self, key: impl Into<CacheKey>, value: Value, ttl: u64) -> Result<bool> {
        self.set(key, value, ttl).await
    }

    // == Delete ==
    /// Removes a key. Returns false if the store rejected the removal,
    /// including when nothing was stored under the key.
    pub async fn delete(&self, key: impl Into<CacheKey>) -> Result<bool> {
        let store_key = self.build_key(&key.into()).await?;
        let outcome = self.connection.remove(&store_key).await;
        acknowledged(outcome, "cache delete", &store_key)
    }

    // == Mset ==
    /// Stores every entry independently. Failures do not stop the batch and
    /// are not raised; they are listed in the returned report.
    pub async fn mset<K, I>(&self, items: I, ttl: u64) -> MsetReport
    where
        K: Into<CacheKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut report = MsetReport::default();
        for (key, value) in items {
            let key = key.into();
            match self.set(key.clone(), value, ttl).await {
                Ok(true) => report.written.push(key),
                Ok(false) => report.failed.push(key),
                Err(err) => {
                    warn!(key = %key, "cache mset entry failed: {}", err);
                    report.failed.push(key);
                }
            }
        }
        report
    }

    // == Mget ==
    /// Retrieves several keys in one round trip.
    ///
    /// The result is keyed by the keys as given; keys with nothing stored
    /// map to `None`.
    pub async fn mget<K, I>(&self, keys: I) -> Result<HashMap<CacheKey, Option<Value>>>
    where
        K: Into<CacheKey>,
        I: IntoIterator<Item = K>,
    {
        let client = self.connection.connect().await?;

        let mut result = HashMap::new();
        // Several caller keys can build the same store key ("42" and 42)
        let mut aliases: HashMap<StoreKey, Vec<CacheKey>> = HashMap::new();
        let mut store_keys = Vec::new();
        for key in keys {
            let key = key.into();
            let store_key = self.keys.build(client.as_ref(), &key);
            let entry = aliases.entry(store_key.clone()).or_default();
            if entry.is_empty() {
                store_keys.push(store_key);
            }
            if !entry.contains(&key) {
                entry.push(key.clone());
            }
            result.insert(key, None);
        }
        if store_keys.is_empty() {
            return Ok(result);
        }

        let records = self.connection.get_many(&store_keys).await?;
        for (requested, record) in store_keys.iter().zip(records) {
            let Some(record) = record else { continue };
            let originals = aliases
                .get(&record.key)
                .or_else(|| aliases.get(requested))
                .ok_or_else(|| {
                    AdapterError::MalformedRecord(format!(
                        "batch returned unrequested record {}",
                        record.key
                    ))
                })?;
            let value = self.codec.decode(Some(record))?;
            for original in originals {
                result.insert(original.clone(), value.clone());
            }
        }

        debug!(
            requested = store_keys.len(),
            hits = result.values().filter(|v| v.is_some()).count(),
            "cache mget"
        );
        Ok(result)
    }

    // == Flush ==
    /// Always fails: the store has no primitive for clearing everything.
    pub async fn flush(&self) -> Result<()> {
        Err(AdapterError::Unsupported(
            "flush is not supported by the store connection".to_string(),
        ))
    }
}
