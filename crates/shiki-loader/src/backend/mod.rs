//! Backend answering batched lookups.

mod http;

pub use http::{HttpBackend, API_PATH};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use shiki_domain::{BatchPlan, Lookup, ResourceId, ResourceKey, ResourceKind};

/// Errors reaching the backend or reading its answer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No response was received (connection, timeout, I/O).
    #[error("request to backend failed")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend responded with status {status}")]
    Status { status: u16 },

    /// The response body is not a lookup map.
    #[error("backend response could not be decoded")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err)
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
            }
        } else {
            TransportError::Request(err)
        }
    }
}

/// Answer to one batched request: `kind -> id -> resource | null`.
///
/// Ids the backend knows nothing about are simply absent. A `null` value is
/// the missing marker.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BatchResponse(HashMap<ResourceKind, HashMap<ResourceId, Lookup>>);

impl BatchResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer for `key`.
    pub fn insert(&mut self, key: ResourceKey, lookup: Lookup) {
        self.0.entry(key.kind).or_default().insert(key.id, lookup);
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Lookup> {
        self.0.get(&key.kind)?.get(&key.id)
    }

    /// Number of answered keys.
    pub fn len(&self) -> usize {
        self.0.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_entries(self) -> impl Iterator<Item = (ResourceKey, Lookup)> {
        self.0.into_iter().flat_map(|(kind, by_id)| {
            by_id.into_iter().map(move |(id, lookup)| {
                (
                    ResourceKey {
                        kind: kind.clone(),
                        id,
                    },
                    lookup,
                )
            })
        })
    }
}

impl FromIterator<(ResourceKey, Lookup)> for BatchResponse {
    fn from_iter<I: IntoIterator<Item = (ResourceKey, Lookup)>>(iter: I) -> Self {
        let mut response = BatchResponse::new();
        for (key, lookup) in iter {
            response.insert(key, lookup);
        }
        response
    }
}

/// Source of lookup answers.
///
/// One call is one network round trip carrying every id in `plan`.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    async fn fetch_batch(&self, plan: &BatchPlan) -> Result<BatchResponse, TransportError>;
}
