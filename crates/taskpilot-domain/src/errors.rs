//! Domain-layer error type.

use thiserror::Error;

/// Failure raised by a domain collaborator.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced entity does not exist (or is not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("project", "task", "sprint", "user").
        entity: &'static str,
        /// Identifier or name that failed to resolve.
        id: String,
    },

    /// The caller lacks the needed permission in the target scope.
    #[error("permission denied: {action}")]
    PermissionDenied {
        /// The denied action, for logs and messages.
        action: String,
    },

    /// The write conflicts with current state (e.g. duplicate name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}
