//! Connection Registry Module
//!
//! Resolves the connection an adapter is configured with. Adapters receive
//! either a shared connection directly, the name of a connection registered
//! here, or an inline configuration to build a dedicated connection from.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::StoreConnection;
use crate::error::{AdapterError, Result};
use crate::store::StoreConnector;

// == Connection Reference ==
/// How an adapter names its connection.
pub enum ConnectionRef<C: StoreConnector> {
    /// An existing shared connection
    Shared(Arc<StoreConnection<C>>),
    /// A connection registered under this name
    Named(String),
    /// A dedicated connection built from this configuration
    Inline(ConnectionConfig),
}

impl<C: StoreConnector> From<Arc<StoreConnection<C>>> for ConnectionRef<C> {
    fn from(connection: Arc<StoreConnection<C>>) -> Self {
        ConnectionRef::Shared(connection)
    }
}

impl<C: StoreConnector> From<&str> for ConnectionRef<C> {
    fn from(name: &str) -> Self {
        ConnectionRef::Named(name.to_string())
    }
}

impl<C: StoreConnector> From<ConnectionConfig> for ConnectionRef<C> {
    fn from(config: ConnectionConfig) -> Self {
        ConnectionRef::Inline(config)
    }
}

// == Connection Registry ==
/// Named connections sharing one connector.
pub struct ConnectionRegistry<C: StoreConnector> {
    connector: Arc<C>,
    connections: HashMap<String, Arc<StoreConnection<C>>>,
}

impl<C: StoreConnector> ConnectionRegistry<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            connections: HashMap::new(),
        }
    }

    pub fn connector(&self) -> &Arc<C> {
        &self.connector
    }

    /// Registers a connection under a name, replacing any previous one.
    ///
    /// The client is not created until the connection is first used.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: ConnectionConfig,
    ) -> Result<Arc<StoreConnection<C>>> {
        config.validate()?;
        let name = name.into();
        let connection = Arc::new(StoreConnection::with_connector(
            self.connector.clone(),
            config,
        ));
        debug!(name = %name, "registered store connection");
        self.connections.insert(name, connection.clone());
        Ok(connection)
    }

    pub fn get(&self, name: &str) -> Option<Arc<StoreConnection<C>>> {
        self.connections.get(name).cloned()
    }

    /// Turns a reference into a connection.
    pub fn resolve(&self, reference: ConnectionRef<C>) -> Result<Arc<StoreConnection<C>>> {
        match reference {
            ConnectionRef::Shared(connection) => Ok(connection),
            ConnectionRef::Named(name) => self.get(&name).ok_or_else(|| {
                AdapterError::Configuration(format!(
                    "'{}' does not name a registered store connection",
                    name
                ))
            }),
            ConnectionRef::Inline(config) => {
                config.validate()?;
                Ok(Arc::new(StoreConnection::with_connector(
                    self.connector.clone(),
                    config,
                )))
            }
        }
    }
}
