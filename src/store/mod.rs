//! Store Module
//!
//! The capability surface consumed from the underlying key-value store:
//! namespaced keys, bin records, status codes, and the client/connector
//! traits a driver implements.

mod entry;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConnectionConfig;

pub use entry::StoredRecord;
pub use memory::{MemoryConnector, MemoryStore};

// == Status Codes ==
/// Status reported by the store when the addressed record does not exist.
pub const STATUS_RECORD_NOT_FOUND: i32 = 2;

// == Store Status ==
/// A non-zero status code reported by the store, with its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("status {code}: {message}")]
pub struct StoreStatus {
    pub code: i32,
    pub message: String,
}

impl StoreStatus {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(STATUS_RECORD_NOT_FOUND, "record not found")
    }

    pub fn is_not_found(&self) -> bool {
        self.code == STATUS_RECORD_NOT_FOUND
    }
}

/// Result of a raw store operation.
pub type StoreResult<T> = std::result::Result<T, StoreStatus>;

// == Store Key ==
/// Store-native composite key addressing a single record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    pub namespace: String,
    pub set: String,
    pub key: String,
}

impl StoreKey {
    pub fn new(namespace: impl Into<String>, set: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            set: set.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.set, self.key)
    }
}

// == Value ==
/// A bin value in one of the store's native types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Named fields of a record.
pub type Bins = BTreeMap<String, Value>;

// == Record ==
/// A record as returned by the store: the key it was read under and its bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: StoreKey,
    pub bins: Bins,
}

impl Record {
    pub fn new(key: StoreKey, bins: Bins) -> Self {
        Self { key, bins }
    }
}

// == Store Client ==
/// Operations exposed by a connected store client.
///
/// Implementations must be safe for concurrent use; the adapters never lock
/// around these calls.
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    /// Composes a store-native key from its parts.
    fn init_key(&self, namespace: &str, set: &str, key: &str) -> StoreKey {
        StoreKey::new(namespace, set, key)
    }

    /// Reads a record. Missing records report `STATUS_RECORD_NOT_FOUND`.
    async fn get(&self, key: &StoreKey) -> StoreResult<Option<Record>>;

    /// Writes the bins of a record with a TTL in seconds (0 = store default).
    async fn put(&self, key: &StoreKey, bins: Bins, ttl: u64) -> StoreResult<()>;

    /// Removes a record.
    async fn remove(&self, key: &StoreKey) -> StoreResult<()>;

    /// Reads several records in one round trip. The result is positional:
    /// slot `i` holds the record for `keys[i]`, or `None` if absent.
    async fn get_many(&self, keys: &[StoreKey]) -> StoreResult<Vec<Option<Record>>>;
}

// == Store Connector ==
/// Creates store clients from connection configuration.
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Client: StoreClient;

    async fn connect(&self, config: &ConnectionConfig) -> StoreResult<Self::Client>;
}
