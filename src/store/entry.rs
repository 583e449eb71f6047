//! Stored Record Module
//!
//! Defines how the in-memory store keeps a record's bins with TTL metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::Bins;

// == Stored Record ==
/// Bins held by the in-memory store plus expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// The stored bins
    pub bins: Bins,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoredRecord {
    // == Constructor ==
    /// Creates a stored record. A TTL of 0, or one whose expiry time does not
    /// fit in a millisecond timestamp, means the record never expires.
    ///
    /// # Arguments
    /// * `bins` - The bins to store
    /// * `ttl_seconds` - TTL in seconds
    pub fn new(bins: Bins, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        let expires_at = match ttl_seconds {
            0 => None,
            ttl => ttl.checked_mul(1000).and_then(|ms| now.checked_add(ms)),
        };

        Self {
            bins,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()) / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;
    use std::thread::sleep;
    use std::time::Duration;

    fn bins() -> Bins {
        Bins::from([("value".to_string(), Value::from("v"))])
    }

    #[test]
    fn test_record_without_ttl_never_expires() {
        let record = StoredRecord::new(bins(), 0);

        assert!(record.expires_at.is_none());
        assert!(!record.is_expired());
        assert!(record.ttl_remaining().is_none());
    }

    #[test]
    fn test_record_with_ttl() {
        let record = StoredRecord::new(bins(), 10);

        let remaining = record.ttl_remaining().unwrap();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
        assert!(!record.is_expired());
    }

    #[test]
    fn test_record_with_huge_ttl_never_expires() {
        let record = StoredRecord::new(bins(), u64::MAX);

        assert!(record.expires_at.is_none());
        assert!(!record.is_expired());
    }

    #[test]
    fn test_record_with_ttl_near_overflow_never_expires() {
        let record = StoredRecord::new(bins(), u64::MAX / 1000);

        assert!(record.expires_at.is_none());
    }

    #[test]
    fn test_record_expiration() {
        let record = StoredRecord::new(bins(), 1);

        sleep(Duration::from_millis(1100));

        assert!(record.is_expired());
        assert_eq!(record.ttl_remaining(), Some(0));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let record = StoredRecord {
            bins: bins(),
            created_at: now,
            expires_at: Some(now),
        };

        assert!(record.is_expired(), "Record should be expired at boundary");
    }
}
