//! The fetch seam shared by the resolver and the refresh loop.
//!
//! Both consumers hold an `Arc<dyn Fetcher>`, which enables:
//! - Swapping the HTTP implementation for test doubles
//! - Custom transports (proxies, recorded fixtures) without touching the cache
//!
//! # Error contract
//!
//! Implementations should fail with one of the typed kinds
//! (`Timeout`, `NetworkUnavailable`, `Network`, `Api`, `Cancelled`, or the
//! retry wrappers). Anything else goes in `VedrfolnirError::Other`; the
//! resolver re-tags it as `Unexpected` with the request fingerprint.

use async_trait::async_trait;

use crate::Result;
use crate::types::RequestDescriptor;

/// Performs the outbound call for one request descriptor.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw payload for `descriptor`, retrying per the
    /// implementation's policy.
    async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<String>;
}
