//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the persistence collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("record {id} not found")]
    NotFound { id: String },

    #[error("record {id} already exists")]
    DuplicateId { id: String },

    #[error("concurrent update on {id}: expected version {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("user name {user_name:?} already taken")]
    UserNameTaken { user_name: String },

    #[error("credential hashing failed: {0}")]
    Credential(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}
