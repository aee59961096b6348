//! Dispatch worker: the single owner of the queue and the cache.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use shiki_domain::{
    BatchPlan, DispatchSchedule, LoaderError, LoaderResult, Lookup, RequestQueue, ResourceCache,
    ResourceKey,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

use super::{LoaderOptions, LoaderStats};
use crate::backend::{BatchResponse, ResourceBackend, TransportError};
use crate::notify::Notifier;
use crate::observability::metrics::{
    CACHE_HITS_TOTAL, DISPATCHES_TOTAL, TRANSPORT_FAILURES_TOTAL, UNRESOLVED_TOTAL,
};

/// Completion handle of one `fetch` call.
pub(crate) type Waiter = oneshot::Sender<LoaderResult<Lookup>>;

/// Requests sent from loader handles to the worker.
pub(crate) enum Command {
    Fetch {
        key: ResourceKey,
        reply: Waiter,
    },
    ResetCache {
        key: ResourceKey,
        reply: oneshot::Sender<bool>,
    },
    Flush,
    Stats {
        reply: oneshot::Sender<LoaderStats>,
    },
    Shutdown,
}

/// Outcome of one round trip, reported back by the request task.
struct Completion {
    plan: BatchPlan,
    outcome: Result<BatchResponse, TransportError>,
}

/// Idle wake-up interval when nothing is scheduled.
const IDLE: Duration = Duration::from_secs(3600);

pub(crate) struct Worker {
    backend: Arc<dyn ResourceBackend>,
    notifier: Arc<dyn Notifier>,
    options: LoaderOptions,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    queue: RequestQueue<Waiter>,
    cache: ResourceCache,
    schedule: DispatchSchedule,
    in_flight: bool,
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

impl Worker {
    pub(crate) fn new(
        backend: Arc<dyn ResourceBackend>,
        notifier: Arc<dyn Notifier>,
        options: LoaderOptions,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let schedule = DispatchSchedule::new(options.schedule);
        Self {
            backend,
            notifier,
            options,
            commands,
            completions_tx,
            completions,
            queue: RequestQueue::new(),
            cache: ResourceCache::new(),
            schedule,
            in_flight: false,
        }
    }

    /// Runs until shut down or until every loader handle is dropped.
    pub(crate) async fn run(mut self) {
        loop {
            // At most one round trip at a time; the schedule waits for it.
            let deadline = if self.in_flight {
                None
            } else {
                self.schedule.deadline()
            };
            let wake_at = deadline.map_or_else(|| Instant::now() + IDLE, Instant::from_std);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(completion) = self.completions.recv() => self.complete(completion),
                () = sleep_until(wake_at), if deadline.is_some() => self.dispatch(),
            }
        }

        self.close();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Fetch { key, reply } => {
                trace!(%key, "Queued lookup");
                self.queue.push(key, reply);
                self.schedule.request(now());
            }
            Command::ResetCache { key, reply } => {
                let removed = self.cache.reset_missing(&key);
                if removed {
                    debug!(%key, "Dropped missing marker");
                }
                let _ = reply.send(removed);
            }
            Command::Flush => self.schedule.request_immediate(now()),
            Command::Stats { reply } => {
                let _ = reply.send(LoaderStats {
                    queued_keys: self.queue.key_count(),
                    waiters: self.queue.waiter_count(),
                    cached: self.cache.len(),
                    in_flight: self.in_flight,
                });
            }
            Command::Shutdown => {}
        }
    }

    /// One dispatch tick: answer what the cache knows, then request the rest.
    fn dispatch(&mut self) {
        self.resolve_from_cache();
        if self.queue.is_empty() {
            self.schedule.clear_request();
            return;
        }

        let plan = BatchPlan::from_queue(&self.queue, self.options.ids_per_request);
        self.schedule.mark_dispatched(now());
        self.in_flight = true;
        counter!(DISPATCHES_TOTAL).increment(1);
        debug!(
            ids = plan.len(),
            queued = self.queue.key_count(),
            query = %plan,
            "Dispatching batch"
        );

        let backend = self.backend.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.fetch_batch(&plan).await;
            let _ = completions.send(Completion { plan, outcome });
        });
    }

    fn complete(&mut self, completion: Completion) {
        self.in_flight = false;

        match completion.outcome {
            Ok(response) => self.process(completion.plan, response),
            Err(error) => {
                // Waiters stay queued; a later dispatch re-batches them.
                counter!(TRANSPORT_FAILURES_TOTAL).increment(1);
                self.notifier.transport_failed(&error);
            }
        }
    }

    fn process(&mut self, plan: BatchPlan, response: BatchResponse) {
        for (key, mut lookup) in response.into_entries() {
            if let Some(resource) = lookup.as_mut() {
                resource.absolutize_url(&self.options.base_url);
            }
            self.cache.insert(key.clone(), lookup);

            if let Some(waiters) = self.queue.take(&key) {
                let answer = self.cache.get(&key).cloned().flatten();
                deliver(waiters, Ok(answer));
            }
        }

        for key in plan.keys() {
            let Some(attempts) = self.queue.record_unanswered(&key) else {
                continue;
            };
            if attempts < self.options.max_attempts {
                continue;
            }

            warn!(%key, attempts, "Backend never answered lookup");
            counter!(UNRESOLVED_TOTAL).increment(1);
            if let Some(waiters) = self.queue.take(&key) {
                let error = LoaderError::Unresolved {
                    kind: key.kind.clone(),
                    id: key.id.clone(),
                    attempts,
                };
                deliver(waiters, Err(error));
            }
        }

        if !self.queue.is_empty() {
            self.schedule.request_immediate(now());
        }
    }

    fn resolve_from_cache(&mut self) {
        for (key, waiters, lookup) in self.queue.take_answered(&self.cache) {
            trace!(%key, waiters = waiters.len(), "Answered from cache");
            counter!(CACHE_HITS_TOTAL).increment(waiters.len() as u64);
            deliver(waiters, Ok(lookup));
        }
    }

    fn close(&mut self) {
        let waiters = self.queue.drain();
        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), "Closing loader with pending lookups");
        }
        deliver(waiters, Err(LoaderError::Closed));
    }
}

/// Sends the same answer to every waiter. Dropped callers are skipped.
fn deliver(waiters: Vec<Waiter>, answer: LoaderResult<Lookup>) {
    for waiter in waiters {
        let _ = waiter.send(answer.clone());
    }
}
