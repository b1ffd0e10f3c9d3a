//! Error types for nestsync core.

use nestsync_store::RecordKey;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while materializing a tree.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] nestsync_store::StoreError),

    /// Malformed input.
    #[error("invalid input: {message}")]
    Validation {
        /// Description of the problem.
        message: String,
    },

    /// An update-only node carries no identity key.
    #[error("flattened node #{position} has no identity key")]
    MissingIdentity {
        /// Preorder position of the node in the flattened sequence.
        position: usize,
    },

    /// An update-only node references a key with no stored record.
    #[error("no stored record for key {key}")]
    RecordNotFound {
        /// The key that was looked up.
        key: RecordKey,
    },
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
