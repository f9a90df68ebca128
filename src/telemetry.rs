//! Telemetry metric name constants.
//!
//! Centralised metric names for vedrfolnir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! Log output works the same way: the crate emits `tracing` events and
//! never installs a subscriber.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `vedrfolnir_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `mode`: operating mode of the resolving client: "on_demand" or "polling"
//! - `status`: outcome: "ok" or "error"

/// Total outbound HTTP attempts.
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "vedrfolnir_requests_total";

/// Total retry attempts (not counting the initial request).
pub const RETRIES_TOTAL: &str = "vedrfolnir_retries_total";

/// Total cache hits on the resolve path.
///
/// Labels: `mode`.
pub const CACHE_HITS_TOTAL: &str = "vedrfolnir_cache_hits_total";

/// Total cache misses on the resolve path.
///
/// Labels: `mode`.
pub const CACHE_MISSES_TOTAL: &str = "vedrfolnir_cache_misses_total";

/// Total entries evicted to make room for a new key.
pub const CACHE_EVICTIONS_TOTAL: &str = "vedrfolnir_cache_evictions_total";

/// Total background refresh cycles run.
pub const REFRESH_CYCLES_TOTAL: &str = "vedrfolnir_refresh_cycles_total";

/// Total entries that failed to refresh in a background cycle.
pub const REFRESH_FAILURES_TOTAL: &str = "vedrfolnir_refresh_failures_total";
