//! Caching subsystem.
//!
//! A single cache, [`ResponseCache`], keyed on request fingerprints. It is
//! the only registry of "which requests are being kept warm": the
//! [`RefreshScheduler`](crate::refresh::RefreshScheduler) discovers what to
//! refresh purely from its contents, and both the on-demand path and the
//! refresh loop write through the same [`ResponseCache::put()`].

pub mod response;

pub use response::{CacheConfig, ResponseCache};
