//! Background refresh of cached requests.
//!
//! - [`RefreshScheduler`]: one refresh cycle over a cache snapshot, with
//!   per-entry failure isolation.
//! - [`Poller`]: the single background task that runs cycles on a fixed
//!   interval and can be shut down with a bounded wait.
//!
//! Freshness is best effort: an entry that keeps failing to refresh is still
//! served while within TTL, and once it expires the resolve path falls back
//! to a synchronous fetch.

mod poller;
mod scheduler;

pub use poller::{DEFAULT_SHUTDOWN_TIMEOUT, Poller};
pub use scheduler::RefreshScheduler;
