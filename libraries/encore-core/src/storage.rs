//! Storage traits for the playlist store

use crate::error::Result;
use crate::types::TrackRecord;
use async_trait::async_trait;

/// Durable, keyed table of track records
///
/// Every call is a suspension point. Implementations guarantee atomicity of
/// a single call only; callers that need ordering must await one call before
/// issuing the next.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Insert or replace a record, keyed by `record.name`
    async fn upsert(&self, record: TrackRecord) -> Result<()>;

    /// Get all records
    ///
    /// Order is not part of the contract; treat the result as a set.
    async fn get_all(&self) -> Result<Vec<TrackRecord>>;

    /// Get a record by name
    async fn get_by_name(&self, name: &str) -> Result<Option<TrackRecord>>;

    /// Delete a record by name (absent names are not an error)
    async fn delete_by_name(&self, name: &str) -> Result<()>;

    /// Delete every record
    ///
    /// Destructive: callers must obtain explicit confirmation first.
    async fn clear(&self) -> Result<()>;

    /// Number of stored records
    async fn count(&self) -> Result<usize> {
        Ok(self.get_all().await?.len())
    }
}

/// Small key-value store for surface preferences (e.g. the admin session)
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get a preference value
    async fn get_preference(&self, key: &str) -> Result<Option<String>>;

    /// Set a preference value
    async fn set_preference(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a preference (absent keys are not an error)
    async fn remove_preference(&self, key: &str) -> Result<()>;
}
