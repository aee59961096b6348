//! Planning of batched lookup requests.

use std::fmt;

use indexmap::IndexMap;

use crate::kind::{ResourceId, ResourceKey, ResourceKind};
use crate::queue::RequestQueue;

/// Maximum number of ids sent in one request, summed over all kinds.
pub const DEFAULT_IDS_PER_REQUEST: usize = 200;

/// Ids to request in one round trip, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    ids_by_kind: IndexMap<ResourceKind, Vec<ResourceId>>,
}

impl BatchPlan {
    /// Selects queued ids for the next request.
    ///
    /// Kinds are visited in queue order and each contributes ids, oldest
    /// first, until `ids_per_request` ids are selected in total. Whatever
    /// does not fit stays queued for a later request.
    pub fn from_queue<W>(queue: &RequestQueue<W>, ids_per_request: usize) -> Self {
        let mut remaining = ids_per_request;
        let mut ids_by_kind = IndexMap::new();

        for (kind, ids) in queue.kinds() {
            if remaining == 0 {
                break;
            }
            let ids: Vec<ResourceId> = ids.take(remaining).cloned().collect();
            remaining -= ids.len();
            if !ids.is_empty() {
                ids_by_kind.insert(kind.clone(), ids);
            }
        }

        Self { ids_by_kind }
    }

    /// Query parameters of the request: one `kind` => `id1,id2,...` pair per kind.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.ids_by_kind
            .iter()
            .map(|(kind, ids)| {
                let joined = ids
                    .iter()
                    .map(ResourceId::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                (kind.to_string(), joined)
            })
            .collect()
    }

    /// Unencoded query string, e.g. `video=1,2&anime=3`.
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(kind, ids)| format!("{kind}={ids}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Every key included in the request.
    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.ids_by_kind.iter().flat_map(|(kind, ids)| {
            ids.iter().map(move |id| ResourceKey {
                kind: kind.clone(),
                id: id.clone(),
            })
        })
    }

    pub fn ids(&self, kind: &ResourceKind) -> Option<&[ResourceId]> {
        self.ids_by_kind.get(kind).map(Vec::as_slice)
    }

    /// Number of ids in the request.
    pub fn len(&self) -> usize {
        self.ids_by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_kind.is_empty()
    }
}

impl fmt::Display for BatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(keys: &[(&str, u32)]) -> RequestQueue<()> {
        let mut queue = RequestQueue::new();
        for (kind, id) in keys {
            queue.push(ResourceKey::new(*kind, *id), ());
        }
        queue
    }

    #[test]
    fn test_plan_groups_ids_by_kind() {
        let queue = queue_with(&[("video", 1), ("anime", 5), ("video", 2)]);

        let plan = BatchPlan::from_queue(&queue, DEFAULT_IDS_PER_REQUEST);

        assert_eq!(plan.to_query_string(), "video=1,2&anime=5");
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_plan_uses_normalized_kinds() {
        let queue = queue_with(&[("ranobe", 7)]);

        let plan = BatchPlan::from_queue(&queue, DEFAULT_IDS_PER_REQUEST);

        assert_eq!(plan.to_query_string(), "manga=7");
    }

    #[test]
    fn test_plan_respects_budget_across_kinds() {
        let queue = queue_with(&[
            ("video", 1),
            ("video", 2),
            ("video", 3),
            ("anime", 1),
            ("anime", 2),
            ("manga", 1),
        ]);

        let plan = BatchPlan::from_queue(&queue, 4);

        assert_eq!(plan.to_query_string(), "video=1,2,3&anime=1");
        assert_eq!(plan.ids(&ResourceKind::normalize("manga")), None);
    }

    #[test]
    fn test_plan_for_empty_queue_is_empty() {
        let queue = queue_with(&[]);

        let plan = BatchPlan::from_queue(&queue, DEFAULT_IDS_PER_REQUEST);

        assert!(plan.is_empty());
        assert_eq!(plan.to_query_string(), "");
    }

    #[test]
    fn test_plan_keys_match_selected_ids() {
        let queue = queue_with(&[("video", 1), ("anime", 5), ("video", 2)]);

        let plan = BatchPlan::from_queue(&queue, 2);
        let keys: Vec<String> = plan.keys().map(|key| key.to_string()).collect();

        assert_eq!(keys, vec!["video:1", "video:2"]);
    }
}
