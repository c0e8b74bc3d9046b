//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Group not found.
    #[error("group not found: {uuid}")]
    GroupNotFound { uuid: String },

    /// Group already exists.
    #[error("group already exists: {uuid}")]
    GroupAlreadyExists { uuid: String },

    /// Invalid input error.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Internal error.
    #[error("internal storage error: {message}")]
    InternalError { message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
