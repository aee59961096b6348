//! Debounce and throttle policy for dispatching batched requests.
//!
//! Lookups tend to arrive in bursts (an editor mounting dozens of preview
//! nodes at once). The schedule merges a burst into one dispatch by waiting
//! for a quiet period (`debounce`) and never lets two round trips start
//! closer together than `throttle`.
//!
//! The schedule holds no timers. Every method takes the current instant, so
//! the owner decides which clock drives it.
//!
//! # Example
//!
//! ```rust
//! use shiki_domain::{DispatchSchedule, ScheduleConfig};
//! use std::time::{Duration, Instant};
//!
//! let mut schedule = DispatchSchedule::new(ScheduleConfig::default());
//! let start = Instant::now();
//!
//! schedule.request(start);
//! assert!(!schedule.is_due(start));
//! assert!(schedule.is_due(start + Duration::from_millis(50)));
//! ```

use std::time::{Duration, Instant};

/// Timing parameters of the dispatch schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Quiet period after the last request before dispatching.
    pub debounce: Duration,
    /// Minimum interval between the starts of two dispatches.
    pub throttle: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            throttle: Duration::from_millis(2000),
        }
    }
}

impl ScheduleConfig {
    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the throttle interval.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }
}

/// A "dispatch requested" flag armed by a debounce deadline and gated by
/// the throttle interval.
#[derive(Debug, Clone)]
pub struct DispatchSchedule {
    config: ScheduleConfig,
    debounce_until: Option<Instant>,
    last_dispatch: Option<Instant>,
}

impl DispatchSchedule {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            debounce_until: None,
            last_dispatch: None,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Requests a dispatch, restarting the debounce window.
    pub fn request(&mut self, now: Instant) {
        self.debounce_until = Some(now + self.config.debounce);
    }

    /// Requests a dispatch without waiting for the debounce window.
    ///
    /// The throttle still applies.
    pub fn request_immediate(&mut self, now: Instant) {
        self.debounce_until = Some(now);
    }

    pub fn is_requested(&self) -> bool {
        self.debounce_until.is_some()
    }

    /// When the requested dispatch may run, or `None` if nothing is requested.
    pub fn deadline(&self) -> Option<Instant> {
        let debounced = self.debounce_until?;
        let throttled = self.last_dispatch.map(|last| last + self.config.throttle);
        Some(throttled.map_or(debounced, |throttled| throttled.max(debounced)))
    }

    /// Whether a requested dispatch may run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Records that a dispatch started at `now` and clears the request.
    pub fn mark_dispatched(&mut self, now: Instant) {
        self.debounce_until = None;
        self.last_dispatch = Some(now);
    }

    /// Drops the pending request without counting a dispatch.
    ///
    /// Used when a tick is answered entirely from cache, which does not
    /// consume the throttle interval.
    pub fn clear_request(&mut self) {
        self.debounce_until = None;
    }
}

impl Default for DispatchSchedule {
    fn default() -> Self {
        Self::new(ScheduleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(50);
    const THROTTLE: Duration = Duration::from_millis(2000);

    fn schedule() -> DispatchSchedule {
        DispatchSchedule::new(
            ScheduleConfig::default()
                .with_debounce(DEBOUNCE)
                .with_throttle(THROTTLE),
        )
    }

    #[test]
    fn test_idle_schedule_has_no_deadline() {
        let schedule = schedule();
        assert!(!schedule.is_requested());
        assert_eq!(schedule.deadline(), None);
        assert!(!schedule.is_due(Instant::now()));
    }

    #[test]
    fn test_rapid_requests_extend_debounce() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.request(start);
        schedule.request(start + Duration::from_millis(30));
        schedule.request(start + Duration::from_millis(60));

        assert!(!schedule.is_due(start + Duration::from_millis(100)));
        assert_eq!(
            schedule.deadline(),
            Some(start + Duration::from_millis(110))
        );
        assert!(schedule.is_due(start + Duration::from_millis(110)));
    }

    #[test]
    fn test_first_dispatch_is_not_throttled() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.request(start);

        assert_eq!(schedule.deadline(), Some(start + DEBOUNCE));
    }

    #[test]
    fn test_throttle_delays_next_dispatch() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.request(start);
        schedule.mark_dispatched(start + DEBOUNCE);
        assert!(!schedule.is_requested());

        schedule.request(start + Duration::from_millis(100));

        assert_eq!(schedule.deadline(), Some(start + DEBOUNCE + THROTTLE));
        assert!(!schedule.is_due(start + Duration::from_millis(1000)));
        assert!(schedule.is_due(start + DEBOUNCE + THROTTLE));
    }

    #[test]
    fn test_debounce_applies_after_throttle_window() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.mark_dispatched(start);
        let late = start + Duration::from_secs(10);
        schedule.request(late);

        assert_eq!(schedule.deadline(), Some(late + DEBOUNCE));
    }

    #[test]
    fn test_clear_request_keeps_throttle_state() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.mark_dispatched(start);
        schedule.request(start);
        schedule.clear_request();
        assert_eq!(schedule.deadline(), None);

        schedule.request(start + DEBOUNCE);
        assert_eq!(schedule.deadline(), Some(start + THROTTLE));
    }

    #[test]
    fn test_immediate_request_skips_debounce_only() {
        let mut schedule = schedule();
        let start = Instant::now();

        schedule.request_immediate(start);
        assert!(schedule.is_due(start));

        schedule.mark_dispatched(start);
        schedule.request_immediate(start + Duration::from_millis(10));
        assert_eq!(schedule.deadline(), Some(start + THROTTLE));
    }
}
