//! Self-refreshing response cache.
//!
//! [`ResponseCache`] maps a request fingerprint to the last successful raw
//! payload, the instant it was fetched and the [`RequestDescriptor`] that
//! produced it. Keeping the descriptor is what lets the refresh loop replay
//! the exact same call later without the caller's help.
//!
//! # Expiry
//!
//! There is no sweeper task. An entry older than the configured TTL is
//! treated as absent by [`get()`](ResponseCache::get) and removed as a side
//! effect of that read.
//!
//! # Eviction
//!
//! Inserting a *new* key while the cache is full first evicts the entry with
//! the oldest `fetched_at`. Reads do not renew an entry; only a `put` does.
//! This is oldest-by-freshness (FIFO over insert/refresh), not LRU.
//!
//! # Concurrency
//!
//! Entries live in a sharded [`DashMap`]; there is no lock over the whole
//! map. Replacing one entry is atomic, but evict-then-insert is not atomic
//! with respect to a concurrent insert of another new key, so the entry
//! count may transiently overshoot capacity by a small amount before the
//! next insert brings it back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;
use crate::types::RequestDescriptor;
use crate::{Result, VedrfolnirError};

/// Configuration for the response cache.
///
/// ```rust
/// # use vedrfolnir::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 100.
    pub max_entries: usize,
    /// Maximum age of an entry before it is treated as absent. Default: 10 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(VedrfolnirError::InvalidValue(
                "cache max_entries must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Stored value. Replaced on every `put`, never mutated in place.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    fetched_at: Instant,
    /// Insertion order; breaks ties between entries fetched at the same instant.
    seq: u64,
    descriptor: RequestDescriptor,
}

impl CacheEntry {
    fn age_key(&self) -> (Instant, u64) {
        (self.fetched_at, self.seq)
    }
}

/// In-memory TTL + capacity bounded cache of raw API payloads.
///
/// See module docs for the expiry, eviction and concurrency model.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    capacity: usize,
    ttl: Duration,
    next_seq: AtomicU64,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    ///
    /// Fails if `max_entries` is zero.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: DashMap::new(),
            capacity: config.max_entries,
            ttl: config.ttl,
            next_seq: AtomicU64::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh payload.
    ///
    /// Returns `None` on a miss or when the entry is older than the TTL; an
    /// expired entry is removed before returning.
    pub fn get(&self, fingerprint: &str) -> Option<String> {
        let expired_seq = {
            let entry = self.entries.get(fingerprint)?;
            if entry.fetched_at.elapsed() <= self.ttl {
                return Some(entry.payload.clone());
            }
            entry.seq
        };
        // The shard guard is released above; only drop the entry we judged
        // expired, not one a concurrent put just replaced it with.
        if self
            .entries
            .remove_if(fingerprint, |_, e| e.seq == expired_seq)
            .is_some()
        {
            debug!(fingerprint, "removed expired cache entry");
        }
        None
    }

    /// Insert or replace the payload for `fingerprint`.
    ///
    /// Replacing an existing key never evicts. Inserting a new key at
    /// capacity first evicts the entry with the oldest `fetched_at` (more than
    /// one if concurrent inserts pushed the count past capacity).
    pub fn put(
        &self,
        fingerprint: impl Into<String>,
        payload: impl Into<String>,
        descriptor: RequestDescriptor,
    ) {
        let fingerprint = fingerprint.into();
        if !self.entries.contains_key(&fingerprint) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let entry = CacheEntry {
            payload: payload.into(),
            fetched_at: Instant::now(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            descriptor,
        };
        debug!(fingerprint = %fingerprint, "cache put");
        self.entries.insert(fingerprint, entry);
    }

    /// Remove one entry unconditionally.
    pub fn remove(&self, fingerprint: &str) {
        if self.entries.remove(fingerprint).is_some() {
            debug!(fingerprint, "cache remove");
        }
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Fingerprints currently stored, expired or not.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Independent copy of every tracked fingerprint and its descriptor.
    ///
    /// Iterates shard by shard without holding a global lock, so entries
    /// inserted or removed during the scan may or may not appear.
    pub fn snapshot(&self) -> HashMap<String, RequestDescriptor> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().descriptor.clone()))
            .collect()
    }

    /// Whether `fingerprint` is stored (expired entries included).
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `false` only when there was nothing to evict.
    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().age_key())
            .map(|e| (e.key().clone(), e.value().seq));

        let Some((key, seq)) = oldest else {
            return false;
        };
        // Skip if it was refreshed between the scan and now.
        if self.entries.remove_if(&key, |_, e| e.seq == seq).is_some() {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(1);
            debug!(fingerprint = %key, "evicted oldest cache entry");
        }
        true
    }
}
