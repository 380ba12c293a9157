//! End-to-end tests for the CLI commands against a real SQLite file

use encore_cli::commands;
use encore_cli::config::EncoreConfig;
use encore_cli::error::CliError;
use encore_playlist::LoginOutcome;
use std::path::PathBuf;
use tempfile::TempDir;

const SECRET: &str = "open-sesame";

struct Fixture {
    config: EncoreConfig,
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = EncoreConfig::default();
        config.storage.database_url =
            format!("sqlite://{}", dir.path().join("db").join("encore.db").display());
        config.admin.secret = SECRET.to_string();
        Self { config, dir }
    }

    async fn logged_in() -> Self {
        let fixture = Self::new();
        let outcome = commands::login(&fixture.config, SECRET, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Granted);
        fixture
    }

    fn audio_file(&self, file_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_admin_commands_require_login() {
    let fixture = Fixture::new();

    let result = commands::list(&fixture.config, &mut Vec::new()).await;

    assert!(matches!(result, Err(CliError::NotAuthenticated)));
}

#[tokio::test]
async fn test_wrong_secret_is_rejected() {
    let fixture = Fixture::new();
    let mut out = Vec::new();

    let outcome = commands::login(&fixture.config, "guess", &mut out).await.unwrap();

    assert_eq!(outcome, LoginOutcome::Rejected);
    assert!(text(out).contains("Wrong secret"));
    assert!(matches!(
        commands::list(&fixture.config, &mut Vec::new()).await,
        Err(CliError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let fixture = Fixture::logged_in().await;

    commands::logout(&fixture.config, &mut Vec::new()).await.unwrap();

    assert!(matches!(
        commands::list(&fixture.config, &mut Vec::new()).await,
        Err(CliError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_import_isolates_missing_file() {
    let fixture = Fixture::logged_in().await;
    let paths = vec![
        fixture.audio_file("first.mp3", b"one"),
        fixture.dir.path().join("missing.mp3"),
        fixture.audio_file("third.ogg", b"three"),
    ];
    let mut out = Vec::new();

    let report = commands::import(&fixture.config, &paths, &mut out).await.unwrap();

    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.failed_count(), 1);
    let output = text(out);
    assert!(output.contains("missing"));
    assert!(output.contains("Saved: 2 ok, 1 failed"));

    let mut listing = Vec::new();
    commands::list(&fixture.config, &mut listing).await.unwrap();
    let listing = text(listing);
    assert!(listing.starts_with("2 tracks"));
    assert!(listing.contains("first"));
    assert!(listing.contains("third"));
}

#[tokio::test]
async fn test_annotate_then_show_publicly() {
    let fixture = Fixture::logged_in().await;
    let path = fixture.audio_file("song.mp3", b"audio");
    commands::import(&fixture.config, &[path], &mut Vec::new())
        .await
        .unwrap();

    commands::annotate(&fixture.config, "song", " intro \n\n  outro ", &mut Vec::new())
        .await
        .unwrap();

    let mut out = Vec::new();
    commands::show(&fixture.config, "song", &mut out).await.unwrap();
    let output = text(out);
    assert!(output.contains("intro\noutro"));

    let mut playlist = Vec::new();
    commands::playlist(&fixture.config, &mut playlist).await.unwrap();
    assert!(text(playlist).contains("song [--:--] (2 lines)"));
}

#[tokio::test]
async fn test_unknown_track_name() {
    let fixture = Fixture::logged_in().await;

    let result = commands::remove(&fixture.config, "ghost", &mut Vec::new()).await;

    assert!(matches!(result, Err(CliError::TrackNotFound(name)) if name == "ghost"));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let fixture = Fixture::logged_in().await;
    let paths = vec![
        fixture.audio_file("a.mp3", b"a"),
        fixture.audio_file("b.mp3", b"b"),
        fixture.audio_file("c.mp3", b"c"),
    ];
    commands::import(&fixture.config, &paths, &mut Vec::new())
        .await
        .unwrap();

    commands::remove(&fixture.config, "b", &mut Vec::new()).await.unwrap();

    let declined = commands::clear(&fixture.config, |count| count != 2, &mut Vec::new())
        .await
        .unwrap();
    assert!(!declined);

    let cleared = commands::clear(&fixture.config, |_| true, &mut Vec::new())
        .await
        .unwrap();
    assert!(cleared);

    let mut out = Vec::new();
    commands::playlist(&fixture.config, &mut out).await.unwrap();
    assert!(text(out).contains("No tracks yet"));
}
