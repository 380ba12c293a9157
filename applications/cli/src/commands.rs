//! Command implementations
//!
//! Each command opens its own store, the way each surface would, and writes
//! human-readable output to `out`.

use crate::config::EncoreConfig;
use crate::error::{CliError, Result};
use encore_core::{annotation, ByteSource, UploadedFile};
use encore_playlist::{
    format_duration, session, AdminSession, AdminSurface, LoginOutcome, PublicSurface,
    ResourceRegistry, SaveReport, SurfaceEvent,
};
use encore_storage::SqliteTrackStore;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Open the configured store, creating its directory if needed
pub async fn open_store(config: &EncoreConfig) -> Result<Arc<SqliteTrackStore>> {
    if let Some(parent) = config.database_path().as_deref().and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let store =
        SqliteTrackStore::open(&config.storage.database_url, config.storage.schema_version).await?;
    Ok(Arc::new(store))
}

/// Build an upload from a file on disk
pub fn upload_from_path(path: &Path) -> UploadedFile {
    let file_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let declared_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    UploadedFile::new(file_name, declared_type, ByteSource::from_path(path))
}

fn print_events(rx: &mut UnboundedReceiver<SurfaceEvent>, out: &mut impl Write) -> Result<()> {
    while let Ok(event) = rx.try_recv() {
        match event {
            SurfaceEvent::Saved { saved, failed } => {
                writeln!(out, "Saved: {saved} ok, {failed} failed")?;
            }
            SurfaceEvent::LoadFailed { reason } => {
                writeln!(out, "Playlist failed to load: {reason}")?;
            }
            SurfaceEvent::Loaded { .. } => {}
        }
    }
    Ok(())
}

async fn admin_surface(
    config: &EncoreConfig,
) -> Result<(AdminSurface<SqliteTrackStore>, UnboundedReceiver<SurfaceEvent>)> {
    let store = open_store(config).await?;
    let gate = AdminSession::new(Arc::clone(&store), config.admin_secret()?);
    if !gate.is_authenticated(session::now_ms()).await? {
        return Err(CliError::NotAuthenticated);
    }

    let (tx, rx) = unbounded_channel();
    let mut surface = AdminSurface::new(store, ResourceRegistry::new(), tx);
    surface.load().await;
    Ok((surface, rx))
}

fn find_track<S: encore_core::TrackStore + ?Sized>(
    surface: &AdminSurface<S>,
    name: &str,
) -> Result<usize> {
    surface
        .projection()
        .position(name)
        .ok_or_else(|| CliError::TrackNotFound(name.to_string()))
}

/// Check `input` against the admin secret and start a session
pub async fn login(config: &EncoreConfig, input: &str, out: &mut impl Write) -> Result<LoginOutcome> {
    let store = open_store(config).await?;
    let gate = AdminSession::new(store, config.admin_secret()?);

    let outcome = gate.login(input, session::now_ms()).await?;
    match outcome {
        LoginOutcome::Granted => writeln!(out, "Logged in for 7 days")?,
        LoginOutcome::EmptyInput => writeln!(out, "Please enter the admin secret")?,
        LoginOutcome::Rejected => writeln!(out, "Wrong secret, try again")?,
    }
    Ok(outcome)
}

/// End the admin session
pub async fn logout(config: &EncoreConfig, out: &mut impl Write) -> Result<()> {
    let store = open_store(config).await?;
    AdminSession::new(store, config.admin_secret()?).logout().await?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Upload files into the playlist
pub async fn import(
    config: &EncoreConfig,
    paths: &[impl AsRef<Path>],
    out: &mut impl Write,
) -> Result<SaveReport> {
    let (mut surface, mut rx) = admin_surface(config).await?;

    let files = paths.iter().map(|p| upload_from_path(p.as_ref())).collect();
    let report = surface.upload(files).await;

    for (name, error) in report.failures() {
        writeln!(out, "  {name}: {error}")?;
    }
    print_events(&mut rx, out)?;

    surface.close();
    Ok(report)
}

/// List tracks with durations and annotation previews
pub async fn list(config: &EncoreConfig, out: &mut impl Write) -> Result<()> {
    let (mut surface, mut rx) = admin_surface(config).await?;
    print_events(&mut rx, out)?;

    let projection = surface.projection();
    writeln!(out, "{} tracks", projection.len())?;
    for (index, track) in projection.iter().enumerate() {
        let preview = track
            .annotation
            .as_deref()
            .map(|lines| annotation::render_preview(lines, config.display.preview_chars))
            .unwrap_or_default();
        writeln!(
            out,
            "{:>3}. {} [{}] {}",
            index + 1,
            track.name,
            format_duration(track.duration_seconds),
            preview
        )?;
    }

    surface.close();
    Ok(())
}

/// Replace the annotation of the track called `name`
pub async fn annotate(
    config: &EncoreConfig,
    name: &str,
    raw_text: &str,
    out: &mut impl Write,
) -> Result<()> {
    let (mut surface, mut rx) = admin_surface(config).await?;

    let result = match find_track(&surface, name) {
        Ok(index) => surface.annotate(index, raw_text).await.map_err(CliError::from),
        Err(e) => Err(e),
    };
    print_events(&mut rx, out)?;

    surface.close();
    result
}

/// Remove the track called `name`
pub async fn remove(config: &EncoreConfig, name: &str, out: &mut impl Write) -> Result<()> {
    let (mut surface, _rx) = admin_surface(config).await?;

    let result = match find_track(&surface, name) {
        Ok(index) => surface.remove(index).await.map_err(CliError::from),
        Err(e) => Err(e),
    };
    if let Ok(Some(removed)) = &result {
        writeln!(out, "Removed {removed}")?;
    }

    surface.close();
    result.map(|_| ())
}

/// Remove every track once `confirm` approves
pub async fn clear<F>(config: &EncoreConfig, confirm: F, out: &mut impl Write) -> Result<bool>
where
    F: FnOnce(usize) -> bool,
{
    let (mut surface, _rx) = admin_surface(config).await?;

    let cleared = surface.clear(confirm).await;
    if let Ok(true) = cleared {
        writeln!(out, "Playlist cleared")?;
    }

    surface.close();
    Ok(cleared?)
}

async fn public_surface(
    config: &EncoreConfig,
) -> Result<(PublicSurface<SqliteTrackStore>, UnboundedReceiver<SurfaceEvent>)> {
    let store = open_store(config).await?;
    let (tx, rx) = unbounded_channel();
    let mut surface = PublicSurface::new(store, ResourceRegistry::new(), tx);
    surface.load().await;
    Ok((surface, rx))
}

/// Public listing in play order
pub async fn playlist(config: &EncoreConfig, out: &mut impl Write) -> Result<()> {
    let (mut surface, mut rx) = public_surface(config).await?;
    print_events(&mut rx, out)?;

    if surface.projection().is_empty() {
        writeln!(out, "No tracks yet")?;
    }

    let mut cue = surface.current_cue();
    let mut position = 1;
    while let Some(current) = cue {
        let lines = surface.current_annotation().map_or(0, <[_]>::len);
        writeln!(
            out,
            "{:>3}. {} [{}]{}",
            position,
            current.name,
            format_duration(current.duration_seconds),
            if lines > 0 { format!(" ({lines} lines)") } else { String::new() }
        )?;
        position += 1;
        cue = surface.on_track_end();
    }

    surface.close();
    Ok(())
}

/// Public view of one track with its full annotation
pub async fn show(config: &EncoreConfig, name: &str, out: &mut impl Write) -> Result<()> {
    let (mut surface, _rx) = public_surface(config).await?;

    let Some(index) = surface.projection().position(name) else {
        surface.close();
        return Err(CliError::TrackNotFound(name.to_string()));
    };

    if let Some(cue) = surface.select(index) {
        writeln!(out, "{} [{}]", cue.name, format_duration(cue.duration_seconds))?;
        match surface.current_annotation() {
            Some(lines) => writeln!(out, "{}", annotation::render(lines))?,
            None => writeln!(out, "(no annotation)")?,
        }
    }

    surface.close();
    Ok(())
}
