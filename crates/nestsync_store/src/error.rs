//! Error types for record store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A structural field was written while write protection was enabled.
    #[error("structural field `{field}` is write-protected")]
    Protected {
        /// Name of the rejected field.
        field: &'static str,
    },

    /// `commit` or `rollback` was called without a matching `begin`.
    #[error("no active transaction")]
    NoActiveTransaction,

    /// A record that was never saved was used where a persisted one is required.
    #[error("record has no assigned key")]
    MissingKey,

    /// The underlying backend failed.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
