//! Error types for the store adapters
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::store::StoreStatus;

// == Adapter Error Enum ==
/// Unified error type for the cache and session adapters.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Connection reference did not resolve to a usable connection
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Store client creation reported a non-zero status
    #[error("Failed to open store connection ({code}): {message}")]
    Connection { code: i32, message: String },

    /// A store operation reported a non-zero status
    #[error("Store operation failed ({code}): {message}")]
    Store { code: i32, message: String },

    /// Record exists but does not have the expected shape
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Operation has no store-native equivalent
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Key could not be canonically serialized
    #[error("Key serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session payload was not valid base64
    #[error("Session payload decode failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl AdapterError {
    // == Status Conversions ==
    /// Wraps a failed client creation status.
    pub fn connection(status: StoreStatus) -> Self {
        AdapterError::Connection {
            code: status.code,
            message: status.message,
        }
    }

    /// Wraps a failed operation status.
    pub fn store(status: StoreStatus) -> Self {
        AdapterError::Store {
            code: status.code,
            message: status.message,
        }
    }

    /// Returns the store status code carried by this error, if any.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            AdapterError::Connection { code, .. } | AdapterError::Store { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the adapters.
pub type Result<T> = std::result::Result<T, AdapterError>;
