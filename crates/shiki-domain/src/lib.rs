//! shiki-domain: Resource resolution model for the shiki loader
//!
//! This crate contains the runtime-free parts of the loader:
//! - Resource kinds, ids and kind normalization
//! - Resource metadata and URL fixing
//! - The waiter queue and the result cache
//! - Batch planning under a per-request id budget
//! - The debounce/throttle dispatch policy
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                shiki-domain                  │
//! ├─────────────────────────────────────────────┤
//! │  kind.rs     - Kinds, ids, normalization    │
//! │  resource.rs - Metadata & URL fixing        │
//! │  queue/      - Pending waiters per key      │
//! │  cache/      - Resolved lookups per key     │
//! │  batch/      - Budgeted request planning    │
//! │  schedule/   - Debounce + throttle policy   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod batch;
pub mod cache;
pub mod error;
pub mod kind;
mod kind_proptest;
pub mod queue;
pub mod resource;
pub mod schedule;

// Re-export commonly used types at the crate root
pub use batch::{BatchPlan, DEFAULT_IDS_PER_REQUEST};
pub use cache::ResourceCache;
pub use error::{LoaderError, LoaderResult};
pub use kind::{ResourceId, ResourceKey, ResourceKind};
pub use queue::RequestQueue;
pub use resource::{fix_url, Lookup, Resource};
pub use schedule::{DispatchSchedule, ScheduleConfig};
