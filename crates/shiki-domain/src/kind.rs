//! Resource kinds, identifiers and lookup keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical resource category.
///
/// Editor nodes use a few aliases for the same backend category; those are
/// folded together by [`ResourceKind::normalize`]. Every other kind is kept
/// as written. Deserialized kinds are normalized too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourceKind(String);

impl ResourceKind {
    /// Maps a raw kind to the category the backend knows it by.
    pub fn normalize(raw: &str) -> Self {
        let canonical = match raw {
            "ranobe" => "manga",
            "poster" | "image" => "user_image",
            "entry" => "topic",
            other => other,
        };
        Self(canonical.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<String> for ResourceKind {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.0
    }
}

/// Opaque identifier of a resource within its kind.
///
/// Ids travel as strings on the wire and as object keys in responses, so
/// numeric ids are stored in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! impl_numeric_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ResourceId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

impl_numeric_id!(u32, u64, i32, i64, usize);

/// Key identifying one lookup: the deduplication and cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub id: ResourceId,
}

impl ResourceKey {
    /// Creates a key, normalizing the raw kind.
    pub fn new(kind: impl Into<ResourceKind>, id: impl Into<ResourceId>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
