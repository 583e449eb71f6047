//! Key Construction Module
//!
//! Maps application keys onto store-native keys. String and integer keys are
//! used verbatim; any other serializable value is reduced to a SHA-256 digest
//! of its canonical JSON form.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::store::{StoreClient, StoreKey};

/// Number of digest characters used for a derived session prefix.
pub const APP_PREFIX_LEN: usize = 5;

/// Type discriminator mixed into every session key.
pub const SESSION_KEY_DISCRIMINATOR: &str = "binstore::session::SessionAdapter";

// == Cache Key ==
/// An application-level key.
///
/// Structured keys hold their canonical serialization, so two keys are equal
/// exactly when their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Str(String),
    Int(i64),
    /// Integers above `i64::MAX`; smaller ones are always [`CacheKey::Int`]
    UInt(u64),
    Structured(String),
}

impl CacheKey {
    /// Builds a key from any serializable value.
    ///
    /// JSON strings and integers collapse to [`CacheKey::Str`],
    /// [`CacheKey::Int`] or [`CacheKey::UInt`]; everything else is kept in
    /// canonical form. Object members are ordered by name, so field and
    /// insertion order do not affect the key.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        if let serde_json::Value::Number(n) = &value {
            if let Some(i) = n.as_i64() {
                return Ok(CacheKey::Int(i));
            }
            if let Some(u) = n.as_u64() {
                return Ok(CacheKey::UInt(u));
            }
        }
        Ok(match value {
            serde_json::Value::String(s) => CacheKey::Str(s),
            other => CacheKey::Structured(serde_json::to_string(&other)?),
        })
    }

    /// The key component before prefixing.
    pub fn component(&self) -> String {
        match self {
            CacheKey::Str(s) => s.clone(),
            CacheKey::Int(i) => i.to_string(),
            CacheKey::UInt(u) => u.to_string(),
            CacheKey::Structured(canonical) => digest_hex(canonical),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Str(s) => write!(f, "{}", s),
            CacheKey::Int(i) => write!(f, "{}", i),
            CacheKey::UInt(u) => write!(f, "{}", u),
            CacheKey::Structured(canonical) => write!(f, "{}", canonical),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        CacheKey::Str(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        CacheKey::Str(s)
    }
}

impl From<&String> for CacheKey {
    fn from(s: &String) -> Self {
        CacheKey::Str(s.clone())
    }
}

impl From<i64> for CacheKey {
    fn from(i: i64) -> Self {
        CacheKey::Int(i)
    }
}

impl From<i32> for CacheKey {
    fn from(i: i32) -> Self {
        CacheKey::Int(i.into())
    }
}

impl From<u32> for CacheKey {
    fn from(i: u32) -> Self {
        CacheKey::Int(i.into())
    }
}

impl From<u64> for CacheKey {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(CacheKey::UInt(u), CacheKey::Int)
    }
}

// == Key Builder ==
/// Composes store keys within one namespace/set under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    namespace: String,
    set: String,
    prefix: String,
}

impl KeyBuilder {
    pub fn new(
        namespace: impl Into<String>,
        set: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            set: set.into(),
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the store key for an application key.
    pub fn build<S: StoreClient + ?Sized>(&self, client: &S, key: &CacheKey) -> StoreKey {
        let component = format!("{}{}", self.prefix, key.component());
        client.init_key(&self.namespace, &self.set, &component)
    }
}

// == Digests ==
/// Lowercase hex SHA-256 of a string.
pub fn digest_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Default session key prefix for an application.
pub fn app_prefix(app_id: &str) -> String {
    digest_hex(app_id)[..APP_PREFIX_LEN].to_string()
}

/// The application key a session id is stored under.
pub fn session_key(id: &str) -> CacheKey {
    CacheKey::Structured(
        serde_json::json!([SESSION_KEY_DISCRIMINATOR, id]).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Query {
        page: u32,
        sort: &'static str,
    }

    #[derive(Serialize)]
    struct QueryReordered {
        sort: &'static str,
        page: u32,
    }

    #[test]
    fn test_string_and_int_keys_pass_through() {
        let builder = KeyBuilder::new("ns", "set", "");
        let client = MemoryStore::new();

        assert_eq!(builder.build(&client, &"user:1".into()).key, "user:1");
        assert_eq!(builder.build(&client, &42i64.into()).key, "42");
        assert_eq!(builder.build(&client, &(-7).into()).key, "-7");
    }

    #[test]
    fn test_prefix_and_namespace_applied() {
        let builder = KeyBuilder::new("ns", "set", "app1_");
        let key = builder.build(&MemoryStore::new(), &"k".into());

        assert_eq!(key, StoreKey::new("ns", "set", "app1_k"));
    }

    #[test]
    fn test_structured_key_is_digested() {
        let key = CacheKey::structured(&Query { page: 2, sort: "asc" }).unwrap();
        let component = key.component();

        assert_eq!(component.len(), 64);
        assert!(component.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(component, digest_hex(r#"{"page":2,"sort":"asc"}"#));
    }

    #[test]
    fn test_structured_key_ignores_field_order() {
        let a = CacheKey::structured(&Query { page: 1, sort: "desc" }).unwrap();
        let b = CacheKey::structured(&QueryReordered { sort: "desc", page: 1 }).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.component(), b.component());
    }

    #[test]
    fn test_structured_map_key_is_order_independent() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..20 {
            first.insert(format!("k{}", i), i);
        }
        for i in (0..20).rev() {
            second.insert(format!("k{}", i), i);
        }

        assert_eq!(
            CacheKey::structured(&first).unwrap(),
            CacheKey::structured(&second).unwrap()
        );
    }

    #[test]
    fn test_structured_scalars_collapse() {
        assert_eq!(CacheKey::structured("abc").unwrap(), CacheKey::Str("abc".into()));
        assert_eq!(CacheKey::structured(&5u8).unwrap(), CacheKey::Int(5));
        assert!(matches!(
            CacheKey::structured(&[1, 2]).unwrap(),
            CacheKey::Structured(_)
        ));
    }

    #[test]
    fn test_u64_keys_pass_through() {
        let builder = KeyBuilder::new("ns", "set", "");
        let client = MemoryStore::new();

        assert_eq!(CacheKey::from(5u64), CacheKey::Int(5));
        assert_eq!(CacheKey::from(u64::MAX), CacheKey::UInt(u64::MAX));
        assert_eq!(CacheKey::structured(&u64::MAX).unwrap(), CacheKey::UInt(u64::MAX));
        assert_eq!(CacheKey::structured(&7u64).unwrap(), CacheKey::Int(7));
        assert_eq!(
            builder.build(&client, &u64::MAX.into()).key,
            "18446744073709551615"
        );
    }

    #[test]
    fn test_different_structured_keys_differ() {
        let a = CacheKey::structured(&[1, 2]).unwrap();
        let b = CacheKey::structured(&[2, 1]).unwrap();

        assert_ne!(a.component(), b.component());
    }

    #[test]
    fn test_app_prefix() {
        let prefix = app_prefix("shop");

        assert_eq!(prefix.len(), APP_PREFIX_LEN);
        assert_eq!(prefix, &digest_hex("shop")[..APP_PREFIX_LEN]);
        assert_ne!(prefix, app_prefix("blog"));
    }

    #[test]
    fn test_session_key_differs_from_plain_id() {
        let key = session_key("abc");

        assert_ne!(key, CacheKey::from("abc"));
        assert_eq!(key, session_key("abc"));
        assert_ne!(key.component(), session_key("abd").component());
    }
}
