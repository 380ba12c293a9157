//! Track records
//!
//! One row per track, keyed by name. Rows written under schema v2 carry the
//! audio inline in `encoded_payload`; rows from schema v1 only have
//! `resource_ref` and are returned as legacy records.

use crate::error::{Result, StorageError};
use encore_core::{Annotation, StoredPayload, TrackRecord, DEFAULT_MIME_TYPE};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const SELECT_COLUMNS: &str =
    "SELECT name, encoded_payload, resource_ref, mime_type, duration_seconds, annotation FROM tracks";

/// Insert a record, or replace the one with the same name
pub async fn upsert(pool: &SqlitePool, record: &TrackRecord) -> Result<()> {
    let (encoded_payload, resource_ref) = match &record.payload {
        StoredPayload::Encoded(text) => (Some(text.as_str()), None),
        StoredPayload::LegacyResourceRef(location) => (None, Some(location.as_str())),
    };
    let annotation = record
        .annotation
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO tracks (name, encoded_payload, resource_ref, mime_type, duration_seconds, annotation)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            encoded_payload = excluded.encoded_payload,
            resource_ref = excluded.resource_ref,
            mime_type = excluded.mime_type,
            duration_seconds = excluded.duration_seconds,
            annotation = excluded.annotation,
            updated_at = datetime('now')
        "#,
    )
    .bind(&record.name)
    .bind(encoded_payload)
    .bind(resource_ref)
    .bind(&record.mime_type)
    .bind(record.duration_seconds)
    .bind(annotation)
    .execute(pool)
    .await?;

    tracing::debug!(
        "Upserted track {} ({} annotation lines)",
        record.name,
        record.annotation_len()
    );

    Ok(())
}

/// Get all records, ordered by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<TrackRecord>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY name"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(record_from_row).collect()
}

/// Get one record by name
pub async fn get_by_name(pool: &SqlitePool, name: &str) -> Result<Option<TrackRecord>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE name = ?"))
        .bind(name)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Delete a record; returns whether a row was removed
pub async fn delete_by_name(pool: &SqlitePool, name: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every record; returns the number of rows removed
pub async fn clear(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tracks").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Count records
pub async fn count(pool: &SqlitePool) -> Result<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;
    Ok(count as usize)
}

fn record_from_row(row: &SqliteRow) -> Result<TrackRecord> {
    let name: String = row.try_get("name")?;
    let encoded_payload: Option<String> = row.try_get("encoded_payload")?;
    let resource_ref: Option<String> = row.try_get("resource_ref")?;
    let mime_type: Option<String> = row.try_get("mime_type")?;
    let annotation: Option<String> = row.try_get("annotation")?;

    // A row with neither column set yields an empty payload, which the
    // codec rejects when this one track is loaded
    let payload = match (encoded_payload, resource_ref) {
        (Some(text), _) => StoredPayload::Encoded(text),
        (None, Some(location)) => StoredPayload::LegacyResourceRef(location),
        (None, None) => StoredPayload::Encoded(String::new()),
    };

    let annotation = annotation.and_then(|json| match serde_json::from_str::<Annotation>(&json) {
        Ok(lines) if !lines.is_empty() => Some(lines),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable annotation on track {}: {}", name, e);
            None
        }
    });

    Ok(TrackRecord {
        payload,
        mime_type: mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        duration_seconds: row.try_get("duration_seconds")?,
        annotation,
        name,
    })
}
