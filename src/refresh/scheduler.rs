//! One refresh cycle over every tracked request.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::ResponseCache;
use crate::fetch::Fetcher;
use crate::telemetry;

/// Re-fetches every request the cache currently tracks.
///
/// Holds no registry of its own: each cycle works from a fresh
/// [`ResponseCache::snapshot()`].
pub struct RefreshScheduler {
    cache: Arc<ResponseCache>,
    fetcher: Arc<dyn Fetcher>,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<ResponseCache>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Run one refresh cycle.
    ///
    /// Entries are refreshed one after another. A failing entry is logged
    /// and skipped; its previous payload stays in the cache untouched and
    /// nothing propagates out of the cycle.
    pub async fn run_once(&self) {
        metrics::counter!(telemetry::REFRESH_CYCLES_TOTAL).increment(1);

        let snapshot = self.cache.snapshot();
        if snapshot.is_empty() {
            debug!("refresh: no cached entries to refresh");
            return;
        }

        debug!(entries = snapshot.len(), "refresh: refreshing cached entries");
        for (fingerprint, descriptor) in snapshot {
            match self.fetcher.fetch(&descriptor).await {
                Ok(payload) => self.cache.put(fingerprint, payload, descriptor),
                Err(e) => {
                    metrics::counter!(telemetry::REFRESH_FAILURES_TOTAL).increment(1);
                    error!(fingerprint = %fingerprint, error = %e, "refresh: failed to refresh entry");
                }
            }
        }
        debug!("refresh: finished refresh cycle");
    }
}
