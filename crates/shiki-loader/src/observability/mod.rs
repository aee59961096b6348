//! Observability infrastructure for the loader.
//!
//! This module provides:
//! - Structured logging configuration
//! - Loader counters

mod logging;
pub mod metrics;

pub use logging::{create_json_layer, init_logging, parse_log_level, LoggingConfig};
pub use self::metrics::describe_metrics;
