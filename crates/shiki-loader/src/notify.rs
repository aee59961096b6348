//! User-facing notices for failed dispatches.
//!
//! A failed round trip produces exactly one notice, however many lookups
//! were waiting on it. Found and missing resources are never announced.

use tracing::warn;

use crate::backend::TransportError;

/// Message shown to users when a batch could not be fetched.
pub const PLEASE_TRY_AGAIN_LATER: &str = "Please try again later";

/// Receives one call per failed dispatch.
pub trait Notifier: Send + Sync {
    fn transport_failed(&self, error: &TransportError);
}

/// Reports failures through `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn transport_failed(&self, error: &TransportError) {
        warn!(error = %error, "{}", PLEASE_TRY_AGAIN_LATER);
    }
}

impl<F> Notifier for F
where
    F: Fn(&TransportError) + Send + Sync,
{
    fn transport_failed(&self, error: &TransportError) {
        self(error)
    }
}
