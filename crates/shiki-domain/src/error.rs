//! Error types for resource lookups.

use thiserror::Error;

use crate::kind::{ResourceId, ResourceKind};

/// Errors delivered to callers of a lookup.
///
/// A resource the backend reports as absent is not an error; it resolves
/// to the missing marker instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// The backend kept answering without mentioning this key.
    #[error("{kind}:{id} was not answered after {attempts} attempts")]
    Unresolved {
        kind: ResourceKind,
        id: ResourceId,
        attempts: u32,
    },

    /// The loader stopped before the lookup was answered.
    #[error("loader is shut down")]
    Closed,

    /// The configured base URL can not be used to build requests.
    #[error("invalid base url '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// The backend client could not be set up.
    #[error("backend could not be initialized: {message}")]
    BackendInit { message: String },
}

/// Result type for lookups.
pub type LoaderResult<T> = Result<T, LoaderError>;
