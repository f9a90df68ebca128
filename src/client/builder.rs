//! Builder for configuring client instances

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::info;

use super::WeatherClient;
use crate::cache::{CacheConfig, ResponseCache};
use crate::fetch::{CancellationSignal, Fetcher, HttpFetcher, RetryStrategy};
use crate::fetch::http::DEFAULT_TIMEOUT;
use crate::refresh::{DEFAULT_SHUTDOWN_TIMEOUT, Poller, RefreshScheduler};
use crate::resolver::RequestResolver;
use crate::types::OperatingMode;
use crate::{Result, VedrfolnirError};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Default refresh interval in polling mode.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shorter polling intervals are raised to this.
pub const MIN_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Builder for configuring client instances.
pub struct WeatherClientBuilder {
    api_key: Option<String>,
    mode: OperatingMode,
    base_url: String,
    timeout: Duration,
    retry: RetryStrategy,
    cache: CacheConfig,
    polling_interval: Duration,
    shutdown_timeout: Duration,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl WeatherClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            mode: OperatingMode::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryStrategy::default(),
            cache: CacheConfig::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            fetcher: None,
        }
    }

    /// Set the OpenWeatherMap API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the operating mode (default: on-demand).
    pub fn mode(mut self, mode: OperatingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the API root (e.g. to point at a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request HTTP timeout (default: 10s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry strategy (default: no retry).
    pub fn retry(mut self, strategy: RetryStrategy) -> Self {
        self.retry = strategy;
        self
    }

    /// Set cache capacity and TTL.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the refresh interval used in polling mode.
    ///
    /// Values below [`MIN_POLLING_INTERVAL`] are raised to it.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Bound on how long shutdown waits for a running refresh cycle (default: 5s).
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Replace the HTTP fetcher with a custom implementation.
    ///
    /// The custom fetcher owns its own retry policy; `timeout` and `retry`
    /// are ignored.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the client.
    ///
    /// In polling mode this spawns the refresh loop, which requires a tokio
    /// runtime; building outside one is a configuration error.
    pub fn build(self) -> Result<WeatherClient> {
        let api_key = match self.api_key {
            None => {
                return Err(VedrfolnirError::InvalidValue("API key is required".into()));
            }
            Some(key) if key.trim().is_empty() => {
                return Err(VedrfolnirError::InvalidValue(
                    "API key must not be empty or blank".into(),
                ));
            }
            Some(key) => key,
        };
        self.retry.validate()?;

        let cache = Arc::new(ResponseCache::new(&self.cache)?);
        let cancel = CancellationSignal::new();
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(
                self.timeout,
                self.retry,
                cancel.clone(),
            )?),
        };

        let resolver = RequestResolver::new(cache.clone(), fetcher.clone());
        let scheduler = Arc::new(RefreshScheduler::new(cache.clone(), fetcher));

        let poller = match self.mode {
            OperatingMode::OnDemand => None,
            OperatingMode::Polling => {
                if tokio::runtime::Handle::try_current().is_err() {
                    return Err(VedrfolnirError::Configuration(
                        "polling mode requires a tokio runtime".into(),
                    ));
                }
                let interval = self.polling_interval.max(MIN_POLLING_INTERVAL);
                Some(Poller::spawn(scheduler.clone(), interval))
            }
        };

        info!(mode = %self.mode, base_url = %self.base_url, "created weather client");

        Ok(WeatherClient {
            api_key,
            base_url: self.base_url,
            mode: self.mode,
            cache,
            resolver,
            scheduler,
            poller: Mutex::new(poller),
            cancel,
            shutdown_timeout: self.shutdown_timeout,
        })
    }
}

impl Default for WeatherClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
