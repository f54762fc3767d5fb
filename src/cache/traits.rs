//! Session cache trait and JSON helpers
//!
//! The cache stores opaque byte payloads under `<prefix>:<key>`. Serialization is owned
//! by the caller; [`put_json`] and [`get_json`] cover the common case.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CacheError;

/// Separator between prefix and key in stored keys
pub const KEY_SEPARATOR: char = ':';

/// Full stored key for a `(prefix, key)` pair
pub fn full_key(prefix: &str, key: &str) -> String {
    format!("{}{}{}", prefix, KEY_SEPARATOR, key)
}

/// Trait for session cache backends
///
/// Presence of an entry is meaningful: the token lifecycle treats a present marker as
/// "still valid" and absence as revoked or expired.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Returns the name of this cache backend
    fn name(&self) -> &str;

    /// Stores `value` under `prefix:key`, expiring after `ttl`
    ///
    /// If an entry with the same key exists, it will be overwritten.
    async fn set(&self, prefix: &str, key: &str, ttl: Duration, value: Bytes)
        -> Result<(), CacheError>;

    /// Retrieves the value under `prefix:key`
    ///
    /// Returns `Ok(None)` if absent or expired.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Whether a live entry exists under `prefix:key`
    async fn exists(&self, prefix: &str, key: &str) -> Result<bool, CacheError>;

    /// Deletes the entry under `prefix:key`
    ///
    /// Returns `Ok(())` even if the entry doesn't exist.
    async fn evict(&self, prefix: &str, key: &str) -> Result<(), CacheError>;

    /// Deletes every entry whose key starts with `prefix:` and returns the count
    ///
    /// Not atomic: entries written while the eviction runs may survive.
    async fn evict_by_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// Serialize `value` as JSON and store it
pub async fn put_json<T: Serialize + ?Sized>(
    cache: &dyn SessionCache,
    prefix: &str,
    key: &str,
    ttl: Duration,
    value: &T,
) -> Result<(), CacheError> {
    let data = serde_json::to_vec(value)?;
    cache.set(prefix, key, ttl, Bytes::from(data)).await
}

/// Fetch and decode a JSON value
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn SessionCache,
    prefix: &str,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match cache.get(prefix, key).await? {
        Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    // Test 1: full key joins with a colon
    #[test]
    fn test_full_key() {
        assert_eq!(full_key("client", "s3cret"), "client:s3cret");
        assert_eq!(full_key("uat:u1:WEB", "jti"), "uat:u1:WEB:jti");
    }

    // Test 2: put_json serializes before storing
    #[tokio::test]
    async fn test_put_json() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_set()
            .with(
                eq("user"),
                eq("u1"),
                eq(Duration::from_secs(5)),
                eq(Bytes::from_static(br#"{"a":1}"#)),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let value = serde_json::json!({ "a": 1 });
        put_json(&cache, "user", "u1", Duration::from_secs(5), &value)
            .await
            .unwrap();
    }

    // Test 3: get_json decodes hits and passes misses through
    #[tokio::test]
    async fn test_get_json() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_get()
            .with(eq("user"), eq("hit"))
            .returning(|_, _| Ok(Some(Bytes::from_static(b"[1,2]"))));
        cache
            .expect_get()
            .with(eq("user"), eq("miss"))
            .returning(|_, _| Ok(None));

        let hit: Option<Vec<u32>> = get_json(&cache, "user", "hit").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2]));

        let miss: Option<Vec<u32>> = get_json(&cache, "user", "miss").await.unwrap();
        assert!(miss.is_none());
    }

    // Test 4: undecodable payloads are serialization errors
    #[tokio::test]
    async fn test_get_json_corrupt() {
        let mut cache = MockSessionCache::new();
        cache
            .expect_get()
            .returning(|_, _| Ok(Some(Bytes::from_static(b"not json"))));

        let result: Result<Option<Vec<u32>>, _> = get_json(&cache, "user", "u1").await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
