//! Redis-backed session cache
//!
//! Shares token presence markers and lookup caches across instances. Keys are stored
//! as `<namespace>:<prefix>:<key>` and expire through Redis `PX`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info};

use crate::error::CacheError;

use super::traits::{full_key, SessionCache};

/// Keys fetched per `SCAN` round trip during prefix eviction
const SCAN_BATCH: usize = 100;

/// Configuration for the Redis cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisCacheConfig {
    /// Redis connection URL
    pub url: String,
    /// Namespace prepended to every key, empty for none
    pub namespace: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            namespace: "session-kernel".to_string(),
        }
    }
}

/// Redis session cache
pub struct RedisSessionCache {
    config: RedisCacheConfig,
    conn: MultiplexedConnection,
}

impl RedisSessionCache {
    /// Connects to Redis and returns a ready cache
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str()).map_err(backend_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)?;

        info!(namespace = %config.namespace, "Connected to Redis session cache");

        Ok(Self { config, conn })
    }

    /// Returns the configured Redis URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn make_key(&self, prefix: &str, key: &str) -> String {
        namespaced(&self.config.namespace, &full_key(prefix, key))
    }
}

fn backend_error(err: redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

fn namespaced(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", namespace, key)
    }
}

/// Escape Redis glob metacharacters so a literal prefix can be used with `MATCH`
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '^') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `MATCH` pattern covering every key under `prefix:` in `namespace`
fn prefix_pattern(namespace: &str, prefix: &str) -> String {
    format!("{}:*", escape_glob(&namespaced(namespace, prefix)))
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn set(
        &self,
        prefix: &str,
        key: &str,
        ttl: Duration,
        value: Bytes,
    ) -> Result<(), CacheError> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut conn = self.conn.clone();

        let _: () = redis::cmd("SET")
            .arg(self.make_key(prefix, key))
            .arg(value.as_ref())
            .arg("PX")
            .arg(millis)
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.conn.clone();

        let data: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.make_key(prefix, key))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        Ok(data.map(Bytes::from))
    }

    async fn exists(&self, prefix: &str, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();

        let count: u64 = redis::cmd("EXISTS")
            .arg(self.make_key(prefix, key))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        Ok(count > 0)
    }

    async fn evict(&self, prefix: &str, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        let _: u64 = redis::cmd("DEL")
            .arg(self.make_key(prefix, key))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn evict_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = prefix_pattern(&self.config.namespace, prefix);
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;

            if !keys.is_empty() {
                let removed: u64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(backend_error)?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern = %pattern, deleted, "Evicted keys by prefix");
        Ok(deleted)
    }
}
