//! shiki-loader: Batching resolver for editor resource previews
//!
//! This crate runs the lookups described by `shiki-domain`:
//! - The `ShikiLoader` handle and its dispatch worker
//! - The backend trait and its HTTP implementation
//! - Failure notification
//! - Configuration management
//! - Logging and metrics setup
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                shiki-loader                  │
//! ├─────────────────────────────────────────────┤
//! │  config.rs      - Configuration management  │
//! │  loader/        - Handle + dispatch worker  │
//! │  backend/       - Batched HTTP lookups      │
//! │  notify.rs      - Transport failure notices │
//! │  observability/ - Logging & metrics         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shiki_loader::{LoaderConfig, ShikiLoader};
//!
//! let config = LoaderConfig::from_env()?;
//! let loader = ShikiLoader::from_settings(&config.loader)?;
//!
//! match loader.fetch("video", "42").await? {
//!     Some(video) => println!("{:?}", video.url()),
//!     None => println!("video does not exist"),
//! }
//! ```

pub mod backend;
pub mod config;
pub mod loader;
pub mod notify;
pub mod observability;

// Re-exports for convenience
pub use backend::{BatchResponse, HttpBackend, ResourceBackend, TransportError};
pub use config::{ConfigLoadError, LoaderConfig, LoaderSettings};
pub use loader::{LoaderOptions, LoaderStats, ShikiLoader};
pub use notify::{Notifier, TracingNotifier};
pub use shiki_domain::{
    LoaderError, LoaderResult, Lookup, Resource, ResourceId, ResourceKey, ResourceKind,
};
