//! Integration tests for schema versioning
//!
//! Covers the additive upgrade path from the reference-only v1 schema to the
//! inline-payload v2 schema, and the guards around requested versions.


use encore_core::{EncoreError, PreferenceStore, StoredPayload, TrackStore};
use encore_storage::{run_migrations, schema_version, SqliteTrackStore, SCHEMA_VERSION};
use test_helpers::*;

#[tokio::test]
async fn test_fresh_database_reaches_current_version() {
    let test_db = TestDb::new().await;
    let version = schema_version(test_db.store().pool()).await.unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_upgrade_from_v1_keeps_existing_rows() {
    let test_db = TestDb::with_version(1).await;
    let pool = test_db.store().pool();

    sqlx::query("INSERT INTO tracks (name, resource_ref, duration_seconds) VALUES (?, ?, ?)")
        .bind("old-song")
        .bind("/music/old-song.mp3")
        .bind(201.0_f64)
        .execute(pool)
        .await
        .expect("Failed to insert v1 row");

    let upgraded = test_db.reopen(SCHEMA_VERSION).await;
    assert_eq!(schema_version(upgraded.pool()).await.unwrap(), SCHEMA_VERSION);

    let records = upgraded.get_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "old-song");
    assert_eq!(records[0].duration_seconds, Some(201.0));
    assert_eq!(
        records[0].payload,
        StoredPayload::LegacyResourceRef("/music/old-song.mp3".to_string())
    );
    assert_eq!(records[0].annotation, None);
}

#[tokio::test]
async fn test_upgraded_store_accepts_new_records() {
    let test_db = TestDb::with_version(1).await;
    let upgraded = test_db.reopen(SCHEMA_VERSION).await;

    upgraded.upsert(encoded_record("fresh", b"f")).await.unwrap();
    upgraded
        .set_preference("adminAuthTime", "1")
        .await
        .expect("preferences table should exist after upgrade");

    assert_eq!(upgraded.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_reopening_at_same_version_is_a_no_op() {
    let test_db = TestDb::new().await;
    test_db.store().upsert(encoded_record("stays", b"s")).await.unwrap();

    let again = run_migrations(test_db.store().pool(), SCHEMA_VERSION)
        .await
        .unwrap();
    assert_eq!(again, SCHEMA_VERSION);
    assert_eq!(test_db.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_requesting_older_version_does_not_downgrade() {
    let test_db = TestDb::new().await;
    let version = run_migrations(test_db.store().pool(), 1).await.unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_requesting_unknown_version_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", temp_dir.path().join("future.db").display());

    let result = SqliteTrackStore::open(&url, SCHEMA_VERSION + 1).await;
    assert!(matches!(
        result,
        Err(EncoreError::UnsupportedSchema { requested, supported })
            if requested == SCHEMA_VERSION + 1 && supported == SCHEMA_VERSION
    ));
}

#[tokio::test]
async fn test_unopenable_medium_is_store_unavailable() {
    let temp_dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a database file
    let url = format!("sqlite://{}", temp_dir.path().display());

    let result = SqliteTrackStore::open(&url, SCHEMA_VERSION).await;
    assert!(matches!(result, Err(EncoreError::StoreUnavailable(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_first_opens_share_one_migration() {
    for _ in 0..40 {
        let (_temp_dir, url) = temp_url();

        let (admin, public) = tokio::join!(
            SqliteTrackStore::open(&url, SCHEMA_VERSION),
            SqliteTrackStore::open(&url, SCHEMA_VERSION),
        );
        let admin = admin.expect("First opener failed");
        let public = public.expect("Second opener failed");

        assert_eq!(schema_version(admin.pool()).await.unwrap(), SCHEMA_VERSION);
        admin.upsert(encoded_record("shared", b"s")).await.unwrap();
        assert_eq!(public.count().await.unwrap(), 1);
        admin.close().await;
        public.close().await;

        let third = SqliteTrackStore::open(&url, SCHEMA_VERSION)
            .await
            .expect("Store unusable after concurrent first open");
        assert_eq!(schema_version(third.pool()).await.unwrap(), SCHEMA_VERSION);
        third.close().await;
    }
}

#[tokio::test]
async fn test_opening_fresh_store_below_current_version_is_rejected() {
    let (_temp_dir, url) = temp_url();

    let result = SqliteTrackStore::open(&url, 1).await;
    assert!(matches!(
        result,
        Err(EncoreError::UnsupportedSchema { requested: 1, supported })
            if supported == SCHEMA_VERSION
    ));

    // Nothing was migrated, so a later open at the current version still works
    let store = SqliteTrackStore::open(&url, SCHEMA_VERSION).await.unwrap();
    store.upsert(encoded_record("after", b"a")).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_opening_v1_file_at_v1_is_rejected() {
    let test_db = TestDb::with_version(1).await;

    let result = SqliteTrackStore::open(&test_db.url, 1).await;
    assert!(matches!(result, Err(EncoreError::UnsupportedSchema { .. })));
}

#[tokio::test]
async fn test_older_request_on_current_file_is_usable() {
    let test_db = TestDb::new().await;

    let store = test_db.reopen(1).await;
    store.upsert(encoded_record("old-config", b"o")).await.unwrap();
    assert_eq!(store.get_all().await.unwrap().len(), 1);
}
