//! Vedrfolnir error types

use std::error::Error as StdError;

/// Boxed foreign error, used by custom [`Fetcher`](crate::fetch::Fetcher)
/// implementations and the resolver's catch-all.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Vedrfolnir error types
#[derive(Debug, thiserror::Error)]
pub enum VedrfolnirError {
    // Transport errors (single attempt)
    #[error("HTTP timeout")]
    Timeout,

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("I/O error during HTTP request: {0}")]
    Network(String),

    #[error("HTTP {status} from API: {body}")]
    Api { status: u16, body: String },

    /// The client's cancellation signal fired while an attempt was in flight.
    #[error("execution cancelled")]
    Cancelled,

    // Retry wrappers
    #[error("operation failed with retries disabled")]
    RetryDisabled {
        #[source]
        source: Box<VedrfolnirError>,
    },

    #[error("retry attempts exceeded ({attempts} attempts)")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<VedrfolnirError>,
    },

    // Resolver catch-all
    #[error("unexpected error while getting weather for key: {fingerprint}")]
    Unexpected {
        fingerprint: String,
        #[source]
        source: BoxError,
    },

    /// Failure raised by a custom fetcher that is not one of the typed kinds.
    #[error("{0}")]
    Other(BoxError),

    // Data errors
    #[error("unable to map payload to weather: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl VedrfolnirError {
    /// Whether the failure is plausibly temporary (timeouts, connectivity,
    /// rate limiting and server-side errors).
    ///
    /// Informational only: retry strategies do not consult it, every failure
    /// is a failure to them.
    pub fn is_transient(&self) -> bool {
        match self.root_cause() {
            Self::Timeout | Self::NetworkUnavailable(_) | Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Unwrap `RetryDisabled` / `RetryExhausted` down to the failure of the
    /// last attempt.
    pub fn root_cause(&self) -> &VedrfolnirError {
        match self {
            Self::RetryDisabled { source } | Self::RetryExhausted { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// HTTP status of an API error, looking through retry wrappers.
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure (or the attempt it wraps) was a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), Self::Cancelled)
    }
}

/// Result type alias for Vedrfolnir operations
pub type Result<T> = std::result::Result<T, VedrfolnirError>;
