//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while reading or writing snapshot content.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Content is not valid JSON.
    #[error("remote content is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Content is JSON but not an object.
    #[error("remote content is not a JSON object")]
    NotAnObject,

    /// An expected collection array is absent.
    #[error("remote content has no '{key}' array")]
    MissingCollection {
        /// Snapshot key.
        key: String,
    },

    /// A collection entry is present but not an array.
    #[error("remote '{key}' entry is not an array")]
    NotAnArray {
        /// Snapshot key.
        key: String,
    },

    /// A collection array holds something other than an object.
    #[error("remote '{key}' entry {index} is not an object")]
    InvalidRecord {
        /// Snapshot key.
        key: String,
        /// Position in the array.
        index: usize,
    },

    /// A record failed the collection's validator.
    #[error("remote '{key}' entry {index} is unusable: {reason}")]
    RejectedRecord {
        /// Snapshot key.
        key: String,
        /// Position in the array.
        index: usize,
        /// Validator message.
        reason: String,
    },

    /// Snapshot could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}
