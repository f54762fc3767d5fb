//! In-process session cache
//!
//! Backed by a map behind an async `RwLock`, with expiry read through the injected
//! [`Clock`]. Suitable for single-instance deployments and tests; multi-instance
//! deployments should use the Redis backend so revocation is shared.
//!
//! Reads drop expired entries lazily. Entries that are never read again are removed by
//! [`MemorySessionCache::spawn_purger`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;

use super::traits::{full_key, SessionCache, KEY_SEPARATOR};

/// A stored value with its expiry
#[derive(Debug, Clone)]
struct MemoryEntry {
    data: Bytes,
    expires_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Same boundary as token validation: still live at exactly `expires_at`
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// In-memory session cache
pub struct MemorySessionCache {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionCache {
    /// Creates a new cache driven by the given clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Deletes all expired entries and returns the count of deleted entries
    pub async fn purge_expired(&self) -> u64 {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        (before - entries.len()) as u64
    }

    /// Run [`purge_expired`](Self::purge_expired) every `period` until `shutdown` fires
    pub fn spawn_purger(
        self: Arc<Self>,
        period: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = period.as_secs(), "Starting session cache purge");

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        debug!("Session cache purge shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = self.purge_expired().await;
                        if purged > 0 {
                            debug!(purged, "Purged expired session cache entries");
                        }
                    }
                }
            }
        })
    }
}

impl Default for MemorySessionCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    fn name(&self) -> &str {
        "memory"
    }

    async fn set(
        &self,
        prefix: &str,
        key: &str,
        ttl: Duration,
        value: Bytes,
    ) -> Result<(), CacheError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Backend(format!("ttl out of range: {}", e)))?;
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| CacheError::Backend("ttl out of range".to_string()))?;

        let mut entries = self.entries.write().await;
        entries.insert(
            full_key(prefix, key),
            MemoryEntry {
                data: value,
                expires_at,
            },
        );

        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<Bytes>, CacheError> {
        let full = full_key(prefix, key);
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        match entries.get(&full) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(&full);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data.clone())),
            None => Ok(None),
        }
    }

    async fn exists(&self, prefix: &str, key: &str) -> Result<bool, CacheError> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(&full_key(prefix, key))
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn evict(&self, prefix: &str, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(&full_key(prefix, key));
        Ok(())
    }

    async fn evict_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = format!("{}{}", prefix, KEY_SEPARATOR);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&pattern));
        Ok((before - entries.len()) as u64)
    }
}
