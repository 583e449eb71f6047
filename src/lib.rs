//! Binstore - cache and session adapters for a bin-oriented key-value store
//!
//! Maps application keys and values onto namespaced single-bin records,
//! behind a lazily connected, shared store client.

pub mod cache;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod key;
pub mod registry;
pub mod session;
pub mod store;
pub mod telemetry;

pub use cache::{CacheAdapter, MsetReport};
pub use config::{CacheConfig, ConnectionConfig, SessionConfig};
pub use connection::StoreConnection;
pub use error::{AdapterError, Result};
pub use key::CacheKey;
pub use registry::{ConnectionRef, ConnectionRegistry};
pub use session::SessionAdapter;
pub use store::{StoreClient, StoreConnector, StoreKey, Value};
