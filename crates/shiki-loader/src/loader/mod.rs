//! The loader handle.
//!
//! A [`ShikiLoader`] is a cheap, cloneable handle to a dispatch worker
//! running on the tokio runtime. The worker owns the waiter queue and the
//! result cache; handles only send it commands, so every mutation happens
//! on one task in arrival order.
//!
//! # Lookup lifecycle
//!
//! ```text
//! fetch ──► queue[kind][id] ──(debounce, throttle)──► dispatch tick
//!                                                       │
//!              cache hit ◄── resolve from cache ◄───────┤
//!                                                       ▼
//!                                     GET api/shiki_editor?kind=ids
//!                                                       │
//!          transport error: notify, keep queued ◄───────┤
//!                                                       ▼
//!                  cache (first write wins) ──► deliver to all waiters
//! ```

mod options;
mod worker;


pub use options::LoaderOptions;

use std::sync::Arc;

use shiki_domain::{LoaderError, LoaderResult, Lookup, ResourceId, ResourceKey};
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::backend::{HttpBackend, ResourceBackend};
use crate::config::LoaderSettings;
use crate::notify::{Notifier, TracingNotifier};

use worker::{Command, Worker};

/// Snapshot of the worker state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Distinct keys waiting for an answer.
    pub queued_keys: usize,
    /// Pending `fetch` calls across all keys.
    pub waiters: usize,
    /// Cached answers, missing markers included.
    pub cached: usize,
    /// Whether a request is currently in flight.
    pub in_flight: bool,
}

/// Handle to a batching, deduplicating, caching resource resolver.
#[derive(Clone)]
pub struct ShikiLoader {
    commands: mpsc::UnboundedSender<Command>,
    base_url: Arc<Url>,
}

impl std::fmt::Debug for ShikiLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShikiLoader")
            .field("base_url", &self.base_url.as_str())
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl ShikiLoader {
    /// Starts a loader over `backend`, reporting failures through `tracing`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(backend: Arc<dyn ResourceBackend>, options: LoaderOptions) -> Self {
        Self::with_notifier(backend, options, Arc::new(TracingNotifier))
    }

    /// Starts a loader with a custom failure notifier.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_notifier(
        backend: Arc<dyn ResourceBackend>,
        options: LoaderOptions,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let base_url = Arc::new(options.base_url.clone());
        tokio::spawn(Worker::new(backend, notifier, options, receiver).run());
        Self { commands, base_url }
    }

    /// Starts a loader talking HTTP to the configured backend.
    pub fn from_settings(settings: &LoaderSettings) -> LoaderResult<Self> {
        let options = settings.options()?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| LoaderError::BackendInit {
                message: err.to_string(),
            })?;
        let backend = HttpBackend::new(client, &options.base_url, &settings.api_path)?;
        Ok(Self::new(Arc::new(backend), options))
    }

    /// Looks up one resource.
    ///
    /// `kind` is normalized first, so `ranobe` and `manga` share lookups.
    /// Concurrent calls for the same key share one backend answer. Resolves
    /// to `Ok(None)` when the backend reports the resource as missing.
    pub async fn fetch(&self, kind: &str, id: impl Into<ResourceId>) -> LoaderResult<Lookup> {
        self.fetch_key(ResourceKey::new(kind, id)).await
    }

    /// Looks up one resource by key.
    pub async fn fetch_key(&self, key: ResourceKey) -> LoaderResult<Lookup> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::Fetch { key, reply })?;
        answer.await.map_err(|_| LoaderError::Closed)?
    }

    /// Forgets that a resource was reported missing, so the next lookup asks
    /// the backend again.
    ///
    /// Found resources stay cached. Returns whether a missing marker was
    /// dropped.
    pub async fn reset_cache(&self, kind: &str, id: impl Into<ResourceId>) -> LoaderResult<bool> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::ResetCache {
            key: ResourceKey::new(kind, id),
            reply,
        })?;
        answer.await.map_err(|_| LoaderError::Closed)
    }

    /// Alias of [`reset_cache`](Self::reset_cache).
    pub async fn invalidate(&self, kind: &str, id: impl Into<ResourceId>) -> LoaderResult<bool> {
        self.reset_cache(kind, id).await
    }

    /// Asks for a dispatch without waiting for the debounce window.
    ///
    /// Lookups left queued by a failed request are retried this way; the
    /// throttle interval still applies.
    pub fn flush(&self) {
        let _ = self.send(Command::Flush);
    }

    pub async fn stats(&self) -> LoaderResult<LoaderStats> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::Stats { reply })?;
        answer.await.map_err(|_| LoaderError::Closed)
    }

    /// Stops the worker. Pending lookups fail with [`LoaderError::Closed`].
    pub fn shutdown(&self) {
        let _ = self.send(Command::Shutdown);
    }

    /// Base URL of the backend, e.g. for fallback asset links.
    pub fn origin(&self) -> &Url {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> LoaderResult<()> {
        self.commands.send(command).map_err(|_| LoaderError::Closed)
    }
}
