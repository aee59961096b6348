//! Runtime options of the loader.

use shiki_domain::{ScheduleConfig, DEFAULT_IDS_PER_REQUEST};
use url::Url;

/// Options of a [`ShikiLoader`](super::ShikiLoader).
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Base URL used to make resource URLs absolute.
    pub base_url: Url,
    /// Maximum number of ids per request, across all kinds.
    pub ids_per_request: usize,
    /// Debounce and throttle timing of dispatches.
    pub schedule: ScheduleConfig,
    /// Number of responses that may omit a requested key before its
    /// lookups fail with `Unresolved`.
    pub max_attempts: u32,
}

impl LoaderOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ids_per_request: DEFAULT_IDS_PER_REQUEST,
            schedule: ScheduleConfig::default(),
            max_attempts: 3,
        }
    }

    /// Sets the per-request id budget (at least one id).
    pub fn with_ids_per_request(mut self, ids_per_request: usize) -> Self {
        self.ids_per_request = ids_per_request.max(1);
        self
    }

    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the attempt limit for omitted keys (at least one attempt).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}
