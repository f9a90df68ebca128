//! Cache-first request resolution.

use std::sync::Arc;

use tracing::debug;

use crate::cache::ResponseCache;
use crate::fetch::Fetcher;
use crate::telemetry;
use crate::types::{OperatingMode, RequestDescriptor};
use crate::{Result, VedrfolnirError};

/// Per-call decision point: serve a fresh cached payload, or fetch and store.
///
/// The algorithm is identical in both operating modes; the mode only changes
/// log wording and metric labels.
pub struct RequestResolver {
    cache: Arc<ResponseCache>,
    fetcher: Arc<dyn Fetcher>,
}

impl RequestResolver {
    pub fn new(cache: Arc<ResponseCache>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Return the payload for `descriptor`.
    ///
    /// On a miss the payload is fetched, stored under the descriptor's
    /// fingerprint (with a copy of the descriptor) and returned. A failed
    /// fetch caches nothing and surfaces a typed error.
    pub async fn resolve(
        &self,
        descriptor: &RequestDescriptor,
        mode: OperatingMode,
    ) -> Result<String> {
        let fingerprint = descriptor.fingerprint();

        if let Some(payload) = self.cache.get(&fingerprint) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "mode" => mode.as_str()).increment(1);
            debug!(fingerprint = %fingerprint, %mode, "cache hit");
            return Ok(payload);
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "mode" => mode.as_str()).increment(1);
        match mode {
            OperatingMode::OnDemand => {
                debug!(fingerprint = %fingerprint, "cache miss (on-demand), fetching from API")
            }
            OperatingMode::Polling => debug!(
                fingerprint = %fingerprint,
                "cache miss (polling), poller hasn't populated yet, fetching synchronously"
            ),
        }

        let payload = self
            .fetcher
            .fetch(descriptor)
            .await
            .map_err(|e| into_typed(e, &fingerprint))?;
        self.cache
            .put(fingerprint, payload.clone(), descriptor.clone());
        Ok(payload)
    }
}

/// Tag foreign failures with the fingerprint; typed kinds pass through.
fn into_typed(err: VedrfolnirError, fingerprint: &str) -> VedrfolnirError {
    match err {
        VedrfolnirError::Other(source) => VedrfolnirError::Unexpected {
            fingerprint: fingerprint.to_string(),
            source,
        },
        typed => typed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_errors_are_tagged() {
        let err = into_typed(VedrfolnirError::Other("boom".into()), "appid=k&q=Oslo");
        match err {
            VedrfolnirError::Unexpected {
                fingerprint,
                source,
            } => {
                assert_eq!(fingerprint, "appid=k&q=Oslo");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn typed_errors_pass_through() {
        let err = into_typed(VedrfolnirError::Timeout, "q=Oslo");
        assert!(matches!(err, VedrfolnirError::Timeout));
    }
}
