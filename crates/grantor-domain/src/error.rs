//! Domain error types for permission operations.

use thiserror::Error;

/// Domain-specific errors for permission operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced group does not exist.
    #[error("group not found: {uuid}")]
    GroupNotFound { uuid: String },

    /// A grant's target resource does not exist or cannot be validated.
    #[error("target not found: {resource_type} {resource_id}")]
    TargetNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Caller is not authorized for the requested operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Traversal visited more groups than the configured bound allows.
    #[error("traversal limit exceeded (max: {max_visited})")]
    TraversalLimitExceeded { max_visited: usize },

    /// Invalid input.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Unexpected internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
