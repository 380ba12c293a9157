use crate::{create_pool, preferences, run_migrations, tracks, SCHEMA_VERSION};
use async_trait::async_trait;
use encore_core::{EncoreError, PreferenceStore, Result, TrackRecord, TrackStore};
use sqlx::SqlitePool;

/// Track store backed by a local `SQLite` file
#[derive(Clone)]
pub struct SqliteTrackStore {
    pool: SqlitePool,
}

impl SqliteTrackStore {
    /// Open (or create) the store and migrate it to `schema_version`
    ///
    /// Asking for an older version than [`SCHEMA_VERSION`] is accepted only
    /// when the file is already at the current version, since every query
    /// needs the current columns.
    ///
    /// # Errors
    /// Returns `EncoreError::StoreUnavailable` if the database cannot be
    /// opened or migrated, and `EncoreError::UnsupportedSchema` if
    /// `schema_version` is newer than this build supports or would leave
    /// the file below the current version
    pub async fn open(database_url: &str, schema_version: u32) -> Result<Self> {
        let pool = create_pool(database_url)
            .await
            .map_err(|e| EncoreError::store_unavailable(format!("{database_url}: {e}")))?;

        if schema_version < SCHEMA_VERSION {
            let stored = crate::schema_version(&pool).await?;
            if stored < SCHEMA_VERSION {
                pool.close().await;
                return Err(EncoreError::UnsupportedSchema {
                    requested: schema_version,
                    supported: SCHEMA_VERSION,
                });
            }
        }

        let version = run_migrations(&pool, schema_version).await?;
        tracing::info!("Track store open at schema version {}", version);

        Ok(Self { pool })
    }

    /// Wrap an existing, already migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TrackStore for SqliteTrackStore {
    async fn upsert(&self, record: TrackRecord) -> Result<()> {
        tracks::upsert(&self.pool, &record)
            .await
            .map_err(|e| EncoreError::write(&record.name, e.to_string()))
    }

    async fn get_all(&self) -> Result<Vec<TrackRecord>> {
        Ok(tracks::get_all(&self.pool).await?)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<TrackRecord>> {
        Ok(tracks::get_by_name(&self.pool, name).await?)
    }

    async fn delete_by_name(&self, name: &str) -> Result<()> {
        let removed = tracks::delete_by_name(&self.pool, name)
            .await
            .map_err(|e| EncoreError::write(name, e.to_string()))?;
        if !removed {
            tracing::debug!("Delete of absent track {} ignored", name);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let removed = tracks::clear(&self.pool)
            .await
            .map_err(|e| EncoreError::write("*", e.to_string()))?;
        tracing::info!("Cleared {} tracks from store", removed);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(tracks::count(&self.pool).await?)
    }
}

#[async_trait]
impl PreferenceStore for SqliteTrackStore {
    async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        Ok(preferences::get(&self.pool, key).await?)
    }

    async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        preferences::set(&self.pool, key, value)
            .await
            .map_err(|e| EncoreError::write(key, e.to_string()))
    }

    async fn remove_preference(&self, key: &str) -> Result<()> {
        preferences::remove(&self.pool, key)
            .await
            .map_err(|e| EncoreError::write(key, e.to_string()))
    }
}
