//! Vedrfolnir - OpenWeatherMap client with a self-refreshing response cache
//!
//! Every request is resolved cache first: a fresh cached payload is returned
//! without touching the network, otherwise the payload is fetched (under the
//! configured retry strategy), stored and returned. In polling mode a
//! background task re-fetches every cached request on a fixed interval so
//! callers keep hitting warm entries.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use vedrfolnir::{CacheConfig, RetryStrategy, UnitSystem, WeatherClient};
//!
//! #[tokio::main]
//! async fn main() -> vedrfolnir::Result<()> {
//!     let client = WeatherClient::builder()
//!         .api_key("your-api-key")
//!         .retry(RetryStrategy::exponential())
//!         .cache(CacheConfig::new().ttl(Duration::from_secs(300)))
//!         .build()?;
//!
//!     let json = client
//!         .current_weather()
//!         .by_city_name("Reykjavik")
//!         .unit_system(UnitSystem::Metric)
//!         .as_json()
//!         .await?;
//!
//!     println!("{json}");
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Several API keys
//!
//! ```rust,no_run
//! use vedrfolnir::{ClientConfig, ClientRegistry};
//!
//! #[tokio::main]
//! async fn main() -> vedrfolnir::Result<()> {
//!     let registry = ClientRegistry::new();
//!     let config = ClientConfig::load(None)?;
//!     let client = registry.get_or_create(&config)?;
//!     let again = registry.get_or_create(&config)?;
//!     assert!(std::sync::Arc::ptr_eq(&client, &again));
//!     registry.shutdown_all().await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod refresh;
pub mod registry;
pub mod resolver;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use client::{LocationQuery, WeatherClient, WeatherClientBuilder, WeatherQuery};
pub use config::ClientConfig;
pub use error::{Result, VedrfolnirError};
pub use fetch::{CancellationSignal, Fetcher, HttpFetcher, RetryConfig, RetryKind, RetryStrategy};
pub use refresh::{Poller, RefreshScheduler};
pub use registry::ClientRegistry;
pub use resolver::RequestResolver;

pub use types::{
    AtmosphericPressure, Clouds, Coordinate, Humidity, Language, Location, OperatingMode,
    Precipitation, RequestDescriptor, ResponseFormat, Temperature, UnitSystem, Weather,
    WeatherState, Wind,
};
