//! HTTP fetch executor for the OpenWeatherMap REST API.
//!
//! One attempt is one GET. Failures are classified into the crate's typed
//! transport errors; retries are left entirely to the configured
//! [`RetryStrategy`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

use super::cancel::CancellationSignal;
use super::retry::RetryStrategy;
use super::traits::Fetcher;
use crate::telemetry;
use crate::types::RequestDescriptor;
use crate::{Result, VedrfolnirError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetcher backed by a reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    timeout: Duration,
    retry: RetryStrategy,
    cancel: CancellationSignal,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and retry strategy.
    pub fn new(timeout: Duration, retry: RetryStrategy, cancel: CancellationSignal) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                VedrfolnirError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            timeout,
            retry,
            cancel,
        })
    }

    /// A single network attempt, no retry.
    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<String> {
        if self.cancel.is_cancelled() {
            return Err(VedrfolnirError::Cancelled);
        }

        let url = descriptor.url()?;
        // The query carries the API key, so only the path is logged.
        info!(path = url.path(), "HTTP request");

        let exchange = async {
            let response = self.http.get(url).timeout(self.timeout).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                error!("execution cancelled");
                return Err(VedrfolnirError::Cancelled);
            }
            result = exchange => match result {
                Ok(ok) => ok,
                Err(e) => {
                    metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "error").increment(1);
                    let err = classify_transport_error(&e);
                    error!(error = %e, "{err}");
                    return Err(err);
                }
            },
        };

        if status.is_success() {
            metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "ok").increment(1);
            return Ok(body);
        }

        metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "error").increment(1);
        warn!(status = status.as_u16(), "unexpected HTTP status from API");
        Err(VedrfolnirError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

/// Map a reqwest failure onto the transport error kinds.
fn classify_transport_error(e: &reqwest::Error) -> VedrfolnirError {
    if e.is_timeout() {
        VedrfolnirError::Timeout
    } else if e.is_connect() {
        VedrfolnirError::NetworkUnavailable(e.to_string())
    } else {
        VedrfolnirError::Network(e.to_string())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<String> {
        self.retry.run(|| self.attempt(descriptor)).await
    }
}
