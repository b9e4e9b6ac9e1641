//! Error types for the local store.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in local store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] fieldsync_storage::StorageError),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store has not been opened or was already closed.
    #[error("store unavailable: not initialized or already closed")]
    StoreUnavailable,

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// Index not found on a collection.
    #[error("index {index} not found on collection {collection}")]
    IndexNotFound {
        /// Collection searched.
        collection: String,
        /// Requested index name.
        index: String,
    },

    /// A unique index rejected the write.
    #[error("constraint violation: duplicate value for unique index {index} in {collection}")]
    ConstraintViolation {
        /// Collection written to.
        collection: String,
        /// The unique index that rejected the write.
        index: String,
    },

    /// The record cannot be stored as given.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem.
        message: String,
    },

    /// Store directory is already open in another process.
    #[error("store locked: another process has exclusive access")]
    DatabaseLocked,

    /// Invalid store image format or version.
    #[error("invalid store format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },
}

impl CoreError {
    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Returns true if a unique index rejected the write.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::ConstraintViolation {
            collection: "goals".into(),
            index: "goal_key".into(),
        };
        assert!(err.to_string().contains("goal_key"));
        assert!(err.to_string().contains("goals"));
        assert!(err.is_constraint_violation());

        assert!(!CoreError::StoreUnavailable.is_constraint_violation());
        assert_eq!(
            CoreError::collection_not_found("x").to_string(),
            "collection not found: x"
        );
    }
}
