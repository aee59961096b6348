//! Loader metrics.
//!
//! Counters are recorded through the `metrics` facade. Nothing is exported
//! unless the embedding application installs a recorder.
//!
//! - `shiki_loader_dispatches_total` - Batched requests sent to the backend
//! - `shiki_loader_transport_failures_total` - Batched requests that failed
//! - `shiki_loader_cache_hits_total` - Lookups answered from cache
//! - `shiki_loader_unresolved_total` - Keys given up after repeated omission

use metrics::describe_counter;

pub const DISPATCHES_TOTAL: &str = "shiki_loader_dispatches_total";
pub const TRANSPORT_FAILURES_TOTAL: &str = "shiki_loader_transport_failures_total";
pub const CACHE_HITS_TOTAL: &str = "shiki_loader_cache_hits_total";
pub const UNRESOLVED_TOTAL: &str = "shiki_loader_unresolved_total";

/// Registers descriptions for the loader counters with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(DISPATCHES_TOTAL, "Batched lookup requests sent to the backend");
    describe_counter!(
        TRANSPORT_FAILURES_TOTAL,
        "Batched lookup requests that failed to reach the backend"
    );
    describe_counter!(CACHE_HITS_TOTAL, "Lookups answered from the loader cache");
    describe_counter!(
        UNRESOLVED_TOTAL,
        "Lookups abandoned because the backend never answered them"
    );
}
