/// Storage-specific errors
use encore_core::EncoreError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Requested schema is one this build cannot serve
    #[error("Schema version {requested} is not supported; this build uses version {supported}")]
    UnsupportedSchema { requested: u32, supported: u32 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for EncoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedSchema {
                requested,
                supported,
            } => EncoreError::UnsupportedSchema {
                requested,
                supported,
            },
            other => EncoreError::store_unavailable(other.to_string()),
        }
    }
}
