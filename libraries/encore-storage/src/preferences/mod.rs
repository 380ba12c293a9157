//! Surface preferences
//!
//! Plain string key-value pairs. The admin session timestamp lives here,
//! under the key owned by the session gate.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_storage::preferences;
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! preferences::set(pool, "adminAuthTime", "1700000000000").await?;
//! let stamp = preferences::get(pool, "adminAuthTime").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use sqlx::SqlitePool;

/// Get a preference value
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar("SELECT value FROM preferences WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Set a preference value, replacing any previous one
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO preferences (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a preference
pub async fn remove(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM preferences WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}
