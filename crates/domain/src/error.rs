//! Domain error types.

use shared::ids::MalformedId;
use thiserror::Error;

/// Failure reported by a document store implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Timeout, exhausted pool or lost connection. Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A unique key was violated.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Error returned by the domain services.
///
/// `NotAuthorized` carries the same message whether the resource is missing or
/// belongs to another profile; the precise reason is only logged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Malformed(String),

    /// The verified identity does not resolve to a stored profile.
    #[error("{0}")]
    Unauthenticated(String),

    /// Ownership check failed on a guarded placement.
    #[error("{0}")]
    NotAuthorized(String),

    /// Ownership check failed on a lifecycle operation.
    #[error("{0}")]
    NotOwned(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MalformedId> for ServiceError {
    fn from(err: MalformedId) -> Self {
        ServiceError::Malformed(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        ServiceError::Malformed(format!(
            "invalid request body, these fields are not valid: {}",
            fields.join(", ")
        ))
    }
}
