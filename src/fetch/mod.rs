//! Network layer: the [`Fetcher`] seam, the reqwest-backed
//! [`HttpFetcher`], and the [`RetryStrategy`] every attempt runs under.

mod cancel;
pub mod http;
pub mod retry;
pub mod traits;

pub use cancel::CancellationSignal;
pub use http::HttpFetcher;
pub use retry::{RetryConfig, RetryKind, RetryStrategy};
pub use traits::Fetcher;
