//! Retry strategies wrapped around every fetch attempt.
//!
//! A closed set of variants behind one entry point,
//! [`RetryStrategy::run()`]. The HTTP fetcher performs no retry bookkeeping
//! of its own; it hands each single attempt to the configured strategy.
//!
//! Strategies do not classify failures. Timeouts, connectivity errors and
//! non-2xx responses are all simply failures; the one exception is
//! `Cancelled`, which the backoff strategy never retries past.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::telemetry;
use crate::{Result, VedrfolnirError};

/// Configuration for the exponential backoff strategy.
///
/// ```rust
/// # use vedrfolnir::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200))
///     .max_delay(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request). Default: 3.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after every failure. Default: 500ms.
    pub initial_delay: Duration,
    /// Optional cap on the doubled delay. Default: uncapped.
    pub max_delay: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: None,
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Cap exponential growth at `delay`.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    ///
    /// `initial_delay * 2^(attempt - 1)`, capped at `max_delay` if set.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(exponent));
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(VedrfolnirError::InvalidValue(
                "retry max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Selector for a strategy, as written in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryKind {
    #[default]
    None,
    ExponentialBackoff,
}

/// How a failed attempt is handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Invoke once; any failure becomes `RetryDisabled` carrying the cause.
    #[default]
    NoRetry,
    /// Retry with a doubling delay until `max_attempts` is reached, then
    /// fail with `RetryExhausted`.
    ExponentialBackoff(RetryConfig),
}

impl RetryStrategy {
    /// Backoff strategy with the default config (3 attempts, 500ms).
    pub fn exponential() -> Self {
        Self::ExponentialBackoff(RetryConfig::default())
    }

    /// Build a strategy from its configuration-file selector.
    pub fn from_kind(kind: RetryKind, config: RetryConfig) -> Self {
        match kind {
            RetryKind::None => Self::NoRetry,
            RetryKind::ExponentialBackoff => Self::ExponentialBackoff(config),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::NoRetry => Ok(()),
            Self::ExponentialBackoff(config) => config.validate(),
        }
    }

    /// Run `operation` under this strategy.
    ///
    /// The wait between attempts is awaited on the calling task, so the
    /// caller (or the refresh loop) is held up for the whole backoff.
    pub async fn run<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self {
            Self::NoRetry => run_once(operation).await,
            Self::ExponentialBackoff(config) => run_with_backoff(config, operation).await,
        }
    }
}

async fn run_once<F, Fut, T>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    operation()
        .await
        .map_err(|e| VedrfolnirError::RetryDisabled {
            source: Box::new(e),
        })
}

async fn run_with_backoff<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!(attempt, "executing attempt");
        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if matches!(err, VedrfolnirError::Cancelled) {
            warn!(attempt, "attempt cancelled, not retrying");
            return Err(err);
        }

        if attempt >= max_attempts {
            error!(attempts = attempt, error = %err, "all retry attempts failed");
            return Err(VedrfolnirError::RetryExhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = config.delay_for_attempt(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "operation failed, retrying"
        );
        metrics::counter!(telemetry::RETRIES_TOTAL).increment(1);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
