//! Session Adapter Module
//!
//! HTTP session storage: read/write/destroy of raw session payloads keyed by
//! session id.

use std::sync::Arc;

use tracing::debug;

use crate::codec::{RecordCodec, SessionCodec};
use crate::config::SessionConfig;
use crate::connection::{acknowledged, StoreConnection};
use crate::error::Result;
use crate::key::{app_prefix, session_key, KeyBuilder};
use crate::registry::{ConnectionRef, ConnectionRegistry};
use crate::store::{StoreConnector, StoreKey};

// == Session Adapter ==
/// Session store on top of a shared store connection.
///
/// Session ids are digested together with a type discriminator, so session
/// records never share keys with cache records. The key prefix, derived from
/// the application id unless configured, keeps applications sharing a store
/// apart. Payloads are kept base64-encoded.
pub struct SessionAdapter<C: StoreConnector> {
    connection: Arc<StoreConnection<C>>,
    keys: KeyBuilder,
    codec: SessionCodec,
    timeout: u64,
}

impl<C: StoreConnector> SessionAdapter<C> {
    pub fn new(connection: Arc<StoreConnection<C>>, config: SessionConfig) -> Self {
        let prefix = config
            .key_prefix
            .unwrap_or_else(|| app_prefix(&config.app_id));
        let keys = KeyBuilder::new(connection.namespace(), connection.set(), prefix);
        Self {
            connection,
            keys,
            codec: SessionCodec,
            timeout: config.timeout,
        }
    }

    /// Resolves the connection reference against a registry.
    pub fn from_ref(
        reference: ConnectionRef<C>,
        registry: &ConnectionRegistry<C>,
        config: SessionConfig,
    ) -> Result<Self> {
        Ok(Self::new(registry.resolve(reference)?, config))
    }

    pub fn key_prefix(&self) -> &str {
        self.keys.prefix()
    }

    /// Session lifetime in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    /// Returns the store key a session id maps to.
    pub async fn build_key(&self, id: &str) -> Result<StoreKey> {
        let client = self.connection.connect().await?;
        Ok(self.keys.build(client.as_ref(), &session_key(id)))
    }

    /// Reads session data. An unknown session reads as empty.
    pub async fn read(&self, id: &str) -> Result<Vec<u8>> {
        let store_key = self.build_key(id).await?;
        let record = self.connection.get(&store_key).await?;
        let data = self.codec.decode(record)?;

        debug!(key = %store_key, found = data.is_some(), "session read");
        Ok(data.unwrap_or_default())
    }

    /// Writes session data with the session timeout as TTL.
    pub async fn write(&self, id: &str, data: &[u8]) -> Result<bool> {
        let store_key = self.build_key(id).await?;
        let outcome = self
            .connection
            .put(&store_key, self.codec.encode(data.to_vec()), self.timeout)
            .await;
        acknowledged(outcome, "session write", &store_key)
    }

    /// Removes session data.
    pub async fn destroy(&self, id: &str) -> Result<bool> {
        let store_key = self.build_key(id).await?;
        let outcome = self.connection.remove(&store_key).await;
        acknowledged(outcome, "session destroy", &store_key)
    }
}
