//! Pending lookups waiting for an answer.
//!
//! Waiters are grouped by kind and id, both levels kept in insertion order
//! so that batches are filled oldest-first. A key is present only while it
//! has at least one waiter: taking a key removes its id entry, and a kind
//! without ids is removed as well.
//!
//! The queue is generic over the waiter type so it can hold completion
//! handles of any async runtime.

use indexmap::IndexMap;

use crate::cache::ResourceCache;
use crate::kind::{ResourceId, ResourceKey, ResourceKind};
use crate::resource::Lookup;

/// Waiters for one key plus the number of unanswered requests for it.
#[derive(Debug)]
pub(crate) struct QueueEntry<W> {
    waiters: Vec<W>,
    attempts: u32,
}

/// Two-level, insertion-ordered map of pending waiters.
#[derive(Debug)]
pub struct RequestQueue<W> {
    pending: IndexMap<ResourceKind, IndexMap<ResourceId, QueueEntry<W>>>,
}

impl<W> Default for RequestQueue<W> {
    fn default() -> Self {
        Self {
            pending: IndexMap::new(),
        }
    }
}

impl<W> RequestQueue<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a waiter for `key`, after any waiters already queued for it.
    pub fn push(&mut self, key: ResourceKey, waiter: W) {
        self.pending
            .entry(key.kind)
            .or_default()
            .entry(key.id)
            .or_insert_with(|| QueueEntry {
                waiters: Vec::new(),
                attempts: 0,
            })
            .waiters
            .push(waiter);
    }

    /// Removes `key` and returns its waiters in arrival order.
    pub fn take(&mut self, key: &ResourceKey) -> Option<Vec<W>> {
        let by_id = self.pending.get_mut(&key.kind)?;
        let entry = by_id.shift_remove(&key.id);
        if by_id.is_empty() {
            self.pending.shift_remove(&key.kind);
        }
        entry.map(|entry| entry.waiters)
    }

    /// Removes every key that already has a cached answer.
    ///
    /// Returns the waiters of each removed key together with the answer
    /// they should receive.
    pub fn take_answered(&mut self, cache: &ResourceCache) -> Vec<(ResourceKey, Vec<W>, Lookup)> {
        let answered: Vec<(ResourceKey, Lookup)> = self
            .keys()
            .filter_map(|key| cache.get(&key).map(|lookup| (key, lookup.clone())))
            .collect();

        answered
            .into_iter()
            .filter_map(|(key, lookup)| {
                let waiters = self.take(&key)?;
                Some((key, waiters, lookup))
            })
            .collect()
    }

    /// Counts one more request for `key` that came back without an answer.
    ///
    /// Returns the updated count, or `None` if `key` is not queued.
    pub fn record_unanswered(&mut self, key: &ResourceKey) -> Option<u32> {
        let entry = self.pending.get_mut(&key.kind)?.get_mut(&key.id)?;
        entry.attempts += 1;
        Some(entry.attempts)
    }

    /// Removes every key and returns all waiters.
    pub fn drain(&mut self) -> Vec<W> {
        self.pending
            .drain(..)
            .flat_map(|(_, by_id)| by_id.into_values())
            .flat_map(|entry| entry.waiters)
            .collect()
    }

    /// Queued keys in batch order.
    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.pending.iter().flat_map(|(kind, by_id)| {
            by_id.keys().map(move |id| ResourceKey {
                kind: kind.clone(),
                id: id.clone(),
            })
        })
    }

    pub(crate) fn kinds(
        &self,
    ) -> impl Iterator<Item = (&ResourceKind, indexmap::map::Keys<'_, ResourceId, QueueEntry<W>>)> {
        self.pending.iter().map(|(kind, by_id)| (kind, by_id.keys()))
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.pending
            .get(&key.kind)
            .is_some_and(|by_id| by_id.contains_key(&key.id))
    }

    /// Number of waiters queued for `key`.
    pub fn waiters_for(&self, key: &ResourceKey) -> usize {
        self.pending
            .get(&key.kind)
            .and_then(|by_id| by_id.get(&key.id))
            .map_or(0, |entry| entry.waiters.len())
    }

    /// Number of distinct keys queued.
    pub fn key_count(&self) -> usize {
        self.pending.values().map(IndexMap::len).sum()
    }

    /// Number of waiters across all keys.
    pub fn waiter_count(&self) -> usize {
        self.pending
            .values()
            .flat_map(IndexMap::values)
            .map(|entry| entry.waiters.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
