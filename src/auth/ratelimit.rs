//! Per-key token bucket rate limiter
//!
//! Each key (typically a client IP or client secret) owns a bucket of `capacity` tokens
//! refilled continuously at `refill_rate` tokens per second. Refill is computed lazily
//! on access; only the idle sweep runs on a timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};

/// Configuration for the rate limiter
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum burst size per key
    pub capacity: f64,

    /// Tokens added per second
    pub refill_rate: f64,

    /// Keys untouched for longer than this are evicted by the sweep
    pub idle_timeout: Duration,

    /// How often the background sweep runs
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 20.0,
            refill_rate: 5.0,
            idle_timeout: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Bucket state for a single key
#[derive(Debug, Clone)]
struct BucketState {
    /// Current token count, within `[0, capacity]`
    tokens: f64,

    /// Last time the bucket was refilled
    last_refill: DateTime<Utc>,
}

/// Token bucket rate limiter
///
/// Per-key state lives in a sharded concurrent map, so calls for the same key are
/// serialized on that key's entry while unrelated keys proceed in parallel.
pub struct TokenBucketLimiter {
    config: RateLimitConfig,
    buckets: DashMap<String, BucketState>,
    clock: Arc<dyn Clock>,
}

impl TokenBucketLimiter {
    /// Create a new rate limiter driven by the given clock
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Create a new rate limiter with default configuration and the system clock
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default(), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Try to take one token for `key`
    ///
    /// Returns `true` if the request is admitted.
    pub fn allow(&self, key: &str) -> bool {
        let now = self.clock.now();
        let capacity = self.config.capacity;

        // The guard holds the shard lock for the whole refill+consume step. Known keys
        // are looked up by reference; only a first sighting allocates the owned key.
        let mut bucket = match self.buckets.get_mut(key) {
            Some(bucket) => bucket,
            None => self
                .buckets
                .entry(key.to_string())
                .or_insert_with(|| BucketState {
                    tokens: capacity,
                    last_refill: now,
                }),
        };

        let elapsed = (now - bucket.last_refill)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.config.refill_rate).min(capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            debug!(key = key, "Rate limit exceeded");
            false
        }
    }

    /// Current token count for `key`, as of its last refill
    pub fn tokens(&self, key: &str) -> Option<f64> {
        self.buckets.get(key).map(|b| b.tokens)
    }

    /// Evict keys idle for longer than the configured timeout
    ///
    /// Returns the number of evicted keys.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.buckets.len();

        self.buckets.retain(|_, bucket| {
            let idle = (now - bucket.last_refill)
                .to_std()
                .unwrap_or(Duration::ZERO);
            idle <= self.config.idle_timeout
        });

        before.saturating_sub(self.buckets.len())
    }

    /// Get current number of tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` until `shutdown` fires
    pub fn spawn_sweeper(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let period = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = period.as_secs(), "Starting rate limiter sweep");

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        debug!("Rate limiter sweep shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = self.sweep();
                        if evicted > 0 {
                            debug!(evicted, remaining = self.tracked_keys(), "Evicted idle rate limit keys");
                        }
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("config", &self.config)
            .field("tracked_keys", &self.buckets.len())
            .finish()
    }
}
