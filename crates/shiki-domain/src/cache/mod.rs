//! Resolved lookups, keyed by kind and id.
//!
//! The cache records every answer the backend has given, including
//! confirmed absences (the missing marker). An entry is only written once:
//! a later answer for the same key is discarded, so every caller observes
//! the first answer for the lifetime of the cache.
//!
//! Missing markers can be dropped with [`ResourceCache::reset_missing`] so a
//! resource that did not exist yet can be looked up again. Positive entries
//! are never removed.
//!
//! # Example
//!
//! ```rust
//! use shiki_domain::{ResourceCache, ResourceKey};
//!
//! let mut cache = ResourceCache::new();
//! let key = ResourceKey::new("image", 5u32);
//!
//! assert!(cache.insert(key.clone(), None));
//! assert_eq!(cache.get(&key), Some(&None));
//!
//! assert!(cache.reset_missing(&key));
//! assert_eq!(cache.get(&key), None);
//! ```

use std::collections::HashMap;

use crate::kind::{ResourceId, ResourceKey, ResourceKind};
use crate::resource::Lookup;

/// Two-level map of resolved lookups.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    entries: HashMap<ResourceKind, HashMap<ResourceId, Lookup>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached answer for `key`.
    ///
    /// `Some(&None)` is a cached missing marker; `None` means the key was
    /// never answered.
    pub fn get(&self, key: &ResourceKey) -> Option<&Lookup> {
        self.entries.get(&key.kind)?.get(&key.id)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.get(key).is_some()
    }

    /// Stores an answer unless one is already cached for `key`.
    ///
    /// Returns `true` if the answer was stored.
    pub fn insert(&mut self, key: ResourceKey, lookup: Lookup) -> bool {
        let by_id = self.entries.entry(key.kind).or_default();
        if by_id.contains_key(&key.id) {
            return false;
        }
        by_id.insert(key.id, lookup);
        true
    }

    /// Removes a cached missing marker for `key`.
    ///
    /// Positive entries are left in place. Returns `true` if a marker was
    /// removed.
    pub fn reset_missing(&mut self, key: &ResourceKey) -> bool {
        let Some(by_id) = self.entries.get_mut(&key.kind) else {
            return false;
        };
        if !matches!(by_id.get(&key.id), Some(None)) {
            return false;
        }

        by_id.remove(&key.id);
        if by_id.is_empty() {
            self.entries.remove(&key.kind);
        }
        true
    }

    /// Number of cached answers across all kinds.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use serde_json::json;

    fn resource(value: serde_json::Value) -> Resource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_first_write_wins() {
        let mut cache = ResourceCache::new();
        let key = ResourceKey::new("video", 42u32);

        assert!(cache.insert(key.clone(), Some(resource(json!({"id": 42, "v": 1})))));
        assert!(!cache.insert(key.clone(), Some(resource(json!({"id": 42, "v": 2})))));
        assert!(!cache.insert(key.clone(), None));

        let cached = cache.get(&key).unwrap().as_ref().unwrap();
        assert_eq!(cached.get("v"), Some(&json!(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_marker_is_distinct_from_unresolved() {
        let mut cache = ResourceCache::new();
        let missing = ResourceKey::new("image", 5u32);
        let unknown = ResourceKey::new("image", 6u32);

        cache.insert(missing.clone(), None);

        assert_eq!(cache.get(&missing), Some(&None));
        assert!(cache.contains(&missing));
        assert_eq!(cache.get(&unknown), None);
        assert!(!cache.contains(&unknown));
    }

    #[test]
    fn test_reset_missing_only_drops_missing_markers() {
        let mut cache = ResourceCache::new();
        let found = ResourceKey::new("video", 1u32);
        let missing = ResourceKey::new("video", 2u32);

        cache.insert(found.clone(), Some(resource(json!({"id": 1}))));
        cache.insert(missing.clone(), None);

        assert!(!cache.reset_missing(&found));
        assert!(cache.contains(&found));

        assert!(cache.reset_missing(&missing));
        assert!(!cache.contains(&missing));

        assert!(!cache.reset_missing(&missing));
        assert!(!cache.reset_missing(&ResourceKey::new("anime", 1u32)));
    }

    #[test]
    fn test_reset_missing_drops_empty_kind() {
        let mut cache = ResourceCache::new();
        let key = ResourceKey::new("topic", 9u32);
        cache.insert(key.clone(), None);

        cache.reset_missing(&key);

        assert!(cache.is_empty());
    }

    #[test]
    fn test_aliases_share_entries() {
        let mut cache = ResourceCache::new();
        cache.insert(ResourceKey::new("poster", 3u32), None);

        assert!(cache.contains(&ResourceKey::new("image", 3u32)));
        assert!(cache.contains(&ResourceKey::new("user_image", 3u32)));
    }
}
