//! Backend-agnostic storage error surface.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend unreachable or the operation failed for infrastructure reasons.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A unique index rejected the write.
    #[error("duplicate value for unique field `{field}`")]
    Duplicate {
        /// Name of the unique field that collided.
        field: &'static str,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
