//! The weather client: wires cache, fetcher, resolver and refresh loop
//! together for one API key.

mod builder;
mod query;

pub use builder::{
    DEFAULT_BASE_URL, DEFAULT_POLLING_INTERVAL, MIN_POLLING_INTERVAL, WeatherClientBuilder,
};
pub use query::{LocationQuery, WeatherQuery};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::info;

use crate::Result;
use crate::cache::ResponseCache;
use crate::fetch::CancellationSignal;
use crate::refresh::{Poller, RefreshScheduler};
use crate::resolver::RequestResolver;
use crate::types::{OperatingMode, RequestDescriptor};

/// Client for one OpenWeatherMap API key.
///
/// ```rust,no_run
/// use vedrfolnir::{OperatingMode, UnitSystem, WeatherClient};
///
/// #[tokio::main]
/// async fn main() -> vedrfolnir::Result<()> {
///     let client = WeatherClient::builder()
///         .api_key("your-api-key")
///         .mode(OperatingMode::Polling)
///         .build()?;
///
///     let weather = client
///         .current_weather()
///         .by_city_name("London")
///         .unit_system(UnitSystem::Metric)
///         .as_weather()
///         .await?;
///
///     println!("{:?}", weather.temperature);
///     client.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    mode: OperatingMode,
    cache: Arc<ResponseCache>,
    resolver: RequestResolver,
    scheduler: Arc<RefreshScheduler>,
    poller: Mutex<Option<Poller>>,
    cancel: CancellationSignal,
    shutdown_timeout: Duration,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> WeatherClientBuilder {
        WeatherClientBuilder::new()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// The response cache, for diagnostics and manual invalidation.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Start a current-weather query (`{base_url}/weather`).
    pub fn current_weather(&self) -> LocationQuery<'_> {
        let mut descriptor =
            RequestDescriptor::new(self.base_url.as_str()).with_api_key(self.api_key.as_str());
        descriptor.append_path("/weather");
        LocationQuery::new(self, descriptor)
    }

    /// Resolve a prepared descriptor: cached payload if fresh, otherwise fetch and store.
    pub async fn resolve(&self, descriptor: &RequestDescriptor) -> Result<String> {
        self.resolver.resolve(descriptor, self.mode).await
    }

    /// Run one refresh cycle now, independent of the background loop.
    pub async fn refresh_now(&self) {
        self.scheduler.run_once().await;
    }

    /// Whether the background refresh loop is running.
    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.is_finished())
    }

    /// Tear the client down: cancel in-flight attempts, stop the refresh
    /// loop (bounded wait, then abort) and clear the cache.
    ///
    /// Idempotent. Requests resolved after shutdown fail with `Cancelled`
    /// unless served from an entry inserted afterwards.
    pub async fn shutdown(&self) {
        info!(mode = %self.mode, "shutting down weather client");
        self.cancel.cancel();
        if let Some(poller) = self.poller.lock().await.take() {
            poller.shutdown(self.shutdown_timeout).await;
        }
        self.cache.clear();
        info!("weather client shut down");
    }
}
