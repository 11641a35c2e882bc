//! Error types raised by the MongoDB storage implementation.

use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Duplicate-key error code raised by unique indexes.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failure raised by the MongoDB data access layer.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The client could not be constructed from parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The initial connection ping kept failing.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// How many pings were attempted.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A unique index rejected a write.
    #[error("duplicate value for unique field `{field}`")]
    Duplicate {
        /// The colliding field.
        field: &'static str,
    },
    /// A write operation failed.
    #[error("failed to write `{entity}` `{id}`")]
    Write {
        /// Entity kind being written.
        entity: &'static str,
        /// Document id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A read operation failed.
    #[error("failed to load `{entity}`")]
    Read {
        /// Entity kind being read.
        entity: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A delete operation failed.
    #[error("failed to delete `{entity}` `{id}`")]
    Delete {
        /// Entity kind being deleted.
        entity: &'static str,
        /// Document id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A transaction control operation (start/commit/abort) failed.
    #[error("transaction {operation} failed")]
    Transaction {
        /// Which control operation failed.
        operation: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    /// Classify a driver error for a write on a unique field: duplicate-key
    /// collisions become [`MongoDaoError::Duplicate`], everything else keeps
    /// its write context.
    pub fn classify_write(
        entity: &'static str,
        id: Uuid,
        unique_field: &'static str,
        source: MongoError,
    ) -> Self {
        if is_duplicate_key(&source) {
            MongoDaoError::Duplicate {
                field: unique_field,
            }
        } else {
            MongoDaoError::Write { entity, id, source }
        }
    }
}

/// Whether a driver error is a unique-index duplicate-key rejection.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::Duplicate { field } => StorageError::Duplicate { field },
            other => {
                let message = other.to_string();
                StorageError::unavailable(message, other)
            }
        }
    }
}
