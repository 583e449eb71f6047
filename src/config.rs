//! Configuration Module
//!
//! Handles loading connection, cache, and session configuration from
//! environment variables.

use std::collections::BTreeMap;
use std::env;

use crate::error::{AdapterError, Result};

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_TIMEOUT: u64 = 1440;

/// Store connection parameters.
///
/// Everything except `namespace` and `set` is handed to the store driver as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Seed hosts as `host:port`
    pub hosts: Vec<String>,
    /// Optional credentials
    pub user: Option<String>,
    pub password: Option<String>,
    /// Namespace records are stored in
    pub namespace: String,
    /// Set records are stored in
    pub set: String,
    /// Whether the driver should reuse the connection across requests
    pub persistent: bool,
    /// Driver-specific options
    pub options: BTreeMap<String, String>,
}

impl ConnectionConfig {
    /// Creates a ConnectionConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BINSTORE_HOSTS` - Comma-separated `host:port` list (default: 127.0.0.1:3000)
    /// - `BINSTORE_USER` / `BINSTORE_PASSWORD` - Credentials (default: none)
    /// - `BINSTORE_NAMESPACE` - Namespace (default: test)
    /// - `BINSTORE_SET` - Set name (default: test)
    /// - `BINSTORE_PERSISTENT` - Persistent connection flag (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hosts: env::var("BINSTORE_HOSTS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.hosts),
            user: env::var("BINSTORE_USER").ok(),
            password: env::var("BINSTORE_PASSWORD").ok(),
            namespace: env::var("BINSTORE_NAMESPACE").unwrap_or(defaults.namespace),
            set: env::var("BINSTORE_SET").unwrap_or(defaults.set),
            persistent: env::var("BINSTORE_PERSISTENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.persistent),
            options: defaults.options,
        }
    }

    /// Checks that the configuration can address records at all.
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(AdapterError::Configuration(
                "connection requires at least one host".to_string(),
            ));
        }
        if self.namespace.is_empty() || self.set.is_empty() {
            return Err(AdapterError::Configuration(
                "connection requires a namespace and a set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:3000".to_string()],
            user: None,
            password: None,
            namespace: "test".to_string(),
            set: "test".to_string(),
            persistent: true,
            options: BTreeMap::new(),
        }
    }
}

/// Cache adapter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prepended to every key component
    pub key_prefix: String,
}

impl CacheConfig {
    /// Loads `BINSTORE_CACHE_PREFIX` (default: empty).
    pub fn from_env() -> Self {
        Self {
            key_prefix: env::var("BINSTORE_CACHE_PREFIX").unwrap_or_default(),
        }
    }
}

/// Session adapter parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Identifier of the owning application, used to derive the default prefix
    pub app_id: String,
    /// Explicit key prefix; derived from `app_id` when None
    pub key_prefix: Option<String>,
    /// Session lifetime in seconds, used as the record TTL
    pub timeout: u64,
}

impl SessionConfig {
    /// Creates a SessionConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BINSTORE_APP_ID` - Application identifier (default: app)
    /// - `BINSTORE_SESSION_PREFIX` - Key prefix (default: derived from app id)
    /// - `BINSTORE_SESSION_TIMEOUT` - Timeout in seconds (default: 1440)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_id: env::var("BINSTORE_APP_ID").unwrap_or(defaults.app_id),
            key_prefix: env::var("BINSTORE_SESSION_PREFIX").ok(),
            timeout: env::var("BINSTORE_SESSION_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_id: "app".to_string(),
            key_prefix: None,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}
