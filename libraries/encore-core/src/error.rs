/// Core error types for Encore
use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Core error type for Encore
///
/// Every variant is terminal for the single operation that produced it.
/// Batch callers (the save pipeline, projection loads) record the error
/// against the affected track and carry on with the rest.
#[derive(Error, Debug)]
pub enum EncoreError {
    /// Source bytes of an upload (or a legacy reference) could not be read
    #[error("Failed to read {name}: {reason}")]
    Read { name: String, reason: String },

    /// A stored payload is malformed or corrupt
    #[error("Malformed payload for {name}: {reason}")]
    Decode { name: String, reason: String },

    /// The durable medium could not be opened or queried
    #[error("Track store unavailable: {0}")]
    StoreUnavailable(String),

    /// A single upsert, delete or clear failed
    #[error("Failed to write {name}: {reason}")]
    Write { name: String, reason: String },

    /// The caller asked for a schema this build cannot serve
    #[error("Schema version {requested} is not supported; this build uses version {supported}")]
    UnsupportedSchema { requested: u32, supported: u32 },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncoreError {
    /// Create a read error
    pub fn read(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Read {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error
    pub fn decode(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a write error
    pub fn write(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a store unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
