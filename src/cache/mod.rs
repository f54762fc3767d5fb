//! Session cache backends
//!
//! The session cache holds token presence markers plus short-lived client and user
//! lookups. The in-memory backend is the default; Redis is used when revocation must be
//! shared between instances.

pub mod traits;

mod memory;
mod redis;

use std::sync::Arc;

pub use traits::{full_key, get_json, put_json, SessionCache, KEY_SEPARATOR};

#[cfg(test)]
pub use traits::MockSessionCache;

pub use memory::MemorySessionCache;
pub use redis::{RedisCacheConfig, RedisSessionCache};

use crate::clock::Clock;
use crate::config::{CacheBackend, CacheConfig};
use crate::error::CacheError;

/// Build the configured cache backend
pub async fn from_config(
    config: &CacheConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn SessionCache>, CacheError> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemorySessionCache::new(clock))),
        CacheBackend::Redis => {
            let redis = config.redis.as_ref().ok_or_else(|| {
                CacheError::Backend("redis backend selected without a redis section".to_string())
            })?;
            let cache = RedisSessionCache::connect(RedisCacheConfig {
                url: redis.url.clone(),
                namespace: redis.namespace.clone(),
            })
            .await?;
            Ok(Arc::new(cache))
        }
    }
}
