//! Encore Storage
//!
//! `SQLite` track store for Encore.
//!
//! This crate provides the durable side of the playlist: a single `tracks`
//! table keyed by track name, plus a small `preferences` table used by the
//! admin session gate. Two surfaces (admin and public) may open the same
//! database file independently; neither sees the other's writes until it
//! reloads.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: `tracks` and `preferences` each own their queries
//! - **Additive Migrations**: schema upgrades only create or add, never drop
//! - **Trait Seam**: [`SqliteTrackStore`] implements `encore_core::TrackStore`
//!   and `encore_core::PreferenceStore`
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_core::TrackStore;
//! use encore_storage::{SqliteTrackStore, SCHEMA_VERSION};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteTrackStore::open("sqlite://encore.db", SCHEMA_VERSION).await?;
//!
//! // Get all tracks
//! let tracks = store.get_all().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod preferences;
pub mod tracks;

pub use context::SqliteTrackStore;
pub use error::StorageError;

use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::Executor;

/// Current schema version
pub const SCHEMA_VERSION: u32 = 2;

/// Embedded migrations; entry `n` upgrades the schema from version `n` to `n + 1`
const MIGRATIONS: &[&str] = &[
    include_str!("../migrations/0001_create_tracks.sql"),
    include_str!("../migrations/0002_inline_payloads.sql"),
];

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://encore.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::debug!("Pool created");

    Ok(pool)
}

/// Read the schema version recorded in the database
///
/// # Errors
///
/// Returns an error if the pragma query fails
pub async fn schema_version<'e, E>(executor: E) -> Result<u32, StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(executor)
        .await?;
    u32::try_from(version).map_err(|_| StorageError::Migration(format!("invalid user_version {version}")))
}

/// Upgrade the schema to `target_version`
///
/// All steps run in one `BEGIN IMMEDIATE` transaction together with the
/// version bump, and the stored version is read again once the write lock
/// is held, so concurrent openers apply each step exactly once.
/// A database already at or beyond `target_version` is left as it is.
/// Returns the schema version in effect afterwards.
///
/// # Errors
///
/// Returns `StorageError::UnsupportedSchema` if `target_version` is newer
/// than [`SCHEMA_VERSION`], or a migration error if a step fails
pub async fn run_migrations(pool: &SqlitePool, target_version: u32) -> Result<u32, StorageError> {
    if target_version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchema {
            requested: target_version,
            supported: SCHEMA_VERSION,
        });
    }

    let current = schema_version(pool).await?;
    if current >= target_version {
        tracing::debug!(
            "Schema at version {}, requested {}; nothing to migrate",
            current,
            target_version
        );
        return Ok(current);
    }

    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

    match migrate_locked(&mut conn, target_version).await {
        Ok(version) => {
            sqlx::query("COMMIT").execute(&mut *conn).await?;
            Ok(version)
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                tracing::warn!("Rollback of failed migration failed: {}", rollback);
            }
            Err(e)
        }
    }
}

/// Apply the missing steps; the caller holds the write lock
async fn migrate_locked(
    conn: &mut SqliteConnection,
    target_version: u32,
) -> Result<u32, StorageError> {
    let current = schema_version(&mut *conn).await?;
    if current >= target_version {
        tracing::debug!("Schema already migrated to version {} by another opener", current);
        return Ok(current);
    }

    for version in current..target_version {
        let migration = MIGRATIONS[version as usize];

        sqlx::raw_sql(migration)
            .execute(&mut *conn)
            .await
            .map_err(|e| StorageError::Migration(format!("v{}: {}", version + 1, e)))?;

        // PRAGMA does not accept bound parameters
        sqlx::query(&format!("PRAGMA user_version = {}", version + 1))
            .execute(&mut *conn)
            .await?;

        tracing::info!("Migrated track store schema to version {}", version + 1);
    }

    Ok(target_version)
}
