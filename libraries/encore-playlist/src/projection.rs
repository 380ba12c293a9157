//! Playlist projection
//!
//! The in-memory, ordered view of the track store held by one surface.
//! Display order lives only here; the store is an unordered set.
//!
//! The projection exclusively owns the [`ResourceHandle`]s of its current
//! generation. Rebuilding, removing and clearing release them.

use crate::resource::{PlayableResource, ResourceHandle, ResourceRegistry};
use crate::transport::PlaybackCue;
use encore_core::{
    codec, Annotation, ByteSource, EncoreError, Result, StoredPayload, TrackRecord, TrackStore,
};
use std::path::PathBuf;

/// A track ready to play, owned by one projection
#[derive(Debug)]
pub struct LiveTrack {
    pub name: String,
    pub mime_type: String,
    pub duration_seconds: Option<f64>,
    pub annotation: Option<Annotation>,
    handle: ResourceHandle,
}

impl LiveTrack {
    /// Register `source` and wrap it in a live track with no metadata
    pub fn register(
        registry: &ResourceRegistry,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        source: ByteSource,
    ) -> Self {
        let name = name.into();
        let mime_type = mime_type.into();
        let handle = registry.register(PlayableResource {
            name: name.clone(),
            mime_type: mime_type.clone(),
            source,
        });

        Self {
            name,
            mime_type,
            duration_seconds: None,
            annotation: None,
            handle,
        }
    }

    /// Resolve a stored record into a live track
    ///
    /// Encoded payloads are decoded into memory; legacy references become
    /// path-backed resources and are not read here.
    ///
    /// # Errors
    /// Returns `EncoreError::Decode` if an encoded payload is malformed
    pub fn from_record(record: TrackRecord, registry: &ResourceRegistry) -> Result<Self> {
        let (mime_type, source) = match record.payload {
            StoredPayload::Encoded(text) => {
                let decoded = codec::decode(&text, Some(record.mime_type.as_str()), &record.name)?;
                (decoded.mime_type, ByteSource::from_bytes(decoded.bytes))
            }
            StoredPayload::LegacyResourceRef(location) => {
                if location.trim().is_empty() {
                    return Err(EncoreError::decode(&record.name, "empty resource reference"));
                }
                (record.mime_type, ByteSource::Path(PathBuf::from(location)))
            }
        };

        let mut track = Self::register(registry, record.name, mime_type, source);
        track.duration_seconds = record.duration_seconds;
        track.annotation = record.annotation;
        Ok(track)
    }

    /// URL the playback sink resolves through the registry
    pub fn url(&self) -> &str {
        self.handle.url()
    }

    /// Cue for the playback sink
    pub fn cue(&self) -> PlaybackCue {
        PlaybackCue {
            name: self.name.clone(),
            url: self.handle.url().to_string(),
            duration_seconds: self.duration_seconds,
        }
    }

    /// Release the handle, consuming the track
    pub fn release(self) {
        self.handle.release();
    }
}

/// Load state of a projection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectionState {
    /// Nothing loaded yet
    #[default]
    NotLoaded,

    /// Loaded from a store with no records
    Empty,

    /// Holds at least one track
    Loaded,

    /// The store could not be read, or none of its records could be decoded
    Failed(String),
}

/// A record that was skipped during a load
#[derive(Debug)]
pub struct SkippedRecord {
    pub name: String,
    pub error: EncoreError,
}

/// What a load did
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Tracks installed
    pub loaded: usize,

    /// Records that could not be decoded
    pub skipped: Vec<SkippedRecord>,
}

/// Ordered in-memory playlist
#[derive(Debug)]
pub struct PlaylistProjection {
    registry: ResourceRegistry,
    tracks: Vec<LiveTrack>,
    state: ProjectionState,
}

impl PlaylistProjection {
    /// Create an unloaded projection issuing handles from `registry`
    pub fn new(registry: ResourceRegistry) -> Self {
        Self {
            registry,
            tracks: Vec::new(),
            state: ProjectionState::NotLoaded,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ProjectionState {
        &self.state
    }

    /// Rebuild from every record in `store`
    ///
    /// The previous generation's handles are released before the new one is
    /// installed, whatever the outcome.
    pub async fn load_from<S: TrackStore + ?Sized>(&mut self, store: &S) -> LoadReport {
        let records = match store.get_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to load playlist: {}", e);
                self.release_all();
                self.state = ProjectionState::Failed(e.to_string());
                return LoadReport::default();
            }
        };

        let total = records.len();
        let mut generation = Vec::with_capacity(total);
        let mut report = LoadReport::default();

        for record in records {
            let name = record.name.clone();
            match LiveTrack::from_record(record, &self.registry) {
                Ok(track) => generation.push(track),
                Err(error) => {
                    tracing::warn!("Skipping track {}: {}", name, error);
                    report.skipped.push(SkippedRecord { name, error });
                }
            }
        }

        self.release_all();
        report.loaded = generation.len();
        self.tracks = generation;

        self.state = if total == 0 {
            ProjectionState::Empty
        } else if report.loaded == 0 {
            ProjectionState::Failed(format!("none of {total} stored tracks could be decoded"))
        } else {
            ProjectionState::Loaded
        };

        tracing::info!(
            "Loaded {} of {} tracks ({} skipped)",
            report.loaded,
            total,
            report.skipped.len()
        );

        report
    }

    /// Move the track at `from` to `to`
    ///
    /// Returns `false`, leaving the order untouched, if either index is out
    /// of range. Order is not persisted.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            tracing::debug!("Ignoring reorder {} -> {} (length {})", from, to, len);
            return false;
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        true
    }

    /// Remove the track at `index` and delete it from `store`
    ///
    /// Returns the removed name, or `None` if `index` is out of range. The
    /// in-memory removal stands even if the delete fails.
    ///
    /// # Errors
    /// Returns `EncoreError::Write` if the store delete fails
    pub async fn remove_at<S: TrackStore + ?Sized>(
        &mut self,
        index: usize,
        store: &S,
    ) -> Result<Option<String>> {
        if index >= self.tracks.len() {
            return Ok(None);
        }

        let track = self.tracks.remove(index);
        let name = track.name.clone();
        track.release();
        self.settle_state();

        store.delete_by_name(&name).await?;
        tracing::info!("Removed track {}", name);

        Ok(Some(name))
    }

    /// Append a track before its durable write has happened
    pub fn insert_uploaded(&mut self, track: LiveTrack) {
        self.tracks.push(track);
        self.state = ProjectionState::Loaded;
    }

    /// Release every handle, empty the projection, then clear `store`
    ///
    /// Returns how many tracks the projection held.
    ///
    /// # Errors
    /// Returns `EncoreError::Write` if the store could not be cleared
    pub async fn clear<S: TrackStore + ?Sized>(&mut self, store: &S) -> Result<usize> {
        let count = self.tracks.len();
        self.release_all();
        self.state = ProjectionState::Empty;

        store.clear().await?;
        tracing::info!("Cleared playlist ({} tracks)", count);

        Ok(count)
    }

    /// Replace the annotation of the track at `index`
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set_annotation(&mut self, index: usize, annotation: Option<Annotation>) -> bool {
        match self.tracks.get_mut(index) {
            Some(track) => {
                track.annotation = annotation;
                true
            }
            None => false,
        }
    }

    /// Fill in the duration of every track named `name` that has none
    ///
    /// Returns how many tracks were updated.
    pub fn set_duration(&mut self, name: &str, duration_seconds: f64) -> usize {
        let mut updated = 0;
        for track in self
            .tracks
            .iter_mut()
            .filter(|t| t.name == name && t.duration_seconds.is_none())
        {
            track.duration_seconds = Some(duration_seconds);
            updated += 1;
        }
        updated
    }

    pub fn get(&self, index: usize) -> Option<&LiveTrack> {
        self.tracks.get(index)
    }

    /// Index of the first track named `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveTrack> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Release every handle and forget all tracks
    ///
    /// Leaves the state untouched; callers set it.
    pub fn release_all(&mut self) {
        for track in self.tracks.drain(..) {
            track.release();
        }
    }

    fn settle_state(&mut self) {
        if self.tracks.is_empty() && self.state == ProjectionState::Loaded {
            self.state = ProjectionState::Empty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::annotation;

    fn projection_with(names: &[&str]) -> PlaylistProjection {
        let mut projection = PlaylistProjection::new(ResourceRegistry::new());
        for name in names {
            let track = LiveTrack::register(
                projection.registry(),
                *name,
                "audio/mpeg",
                ByteSource::from_bytes(name.as_bytes().to_vec()),
            );
            projection.insert_uploaded(track);
        }
        projection
    }

    fn names(projection: &PlaylistProjection) -> Vec<&str> {
        projection.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn starts_not_loaded() {
        let projection = PlaylistProjection::new(ResourceRegistry::new());
        assert_eq!(projection.state(), &ProjectionState::NotLoaded);
        assert!(projection.is_empty());
    }

    #[test]
    fn reorder_moves_one_element() {
        let mut projection = projection_with(&["a", "b", "c", "d"]);

        assert!(projection.reorder(0, 2));
        assert_eq!(names(&projection), vec!["b", "c", "a", "d"]);

        assert!(projection.reorder(3, 0));
        assert_eq!(names(&projection), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn reorder_out_of_range_is_ignored() {
        let mut projection = projection_with(&["a", "b"]);

        assert!(!projection.reorder(2, 0));
        assert!(!projection.reorder(0, 2));
        assert!(!projection.reorder(usize::MAX, 1));
        assert_eq!(names(&projection), vec!["a", "b"]);
    }

    #[test]
    fn set_duration_only_fills_unknown() {
        let mut projection = projection_with(&["a", "b"]);

        assert_eq!(projection.set_duration("a", 30.0), 1);
        assert_eq!(projection.set_duration("a", 45.0), 0);
        assert_eq!(projection.get(0).unwrap().duration_seconds, Some(30.0));
        assert_eq!(projection.get(1).unwrap().duration_seconds, None);
    }

    #[test]
    fn set_annotation_bounds() {
        let mut projection = projection_with(&["a"]);

        assert!(projection.set_annotation(0, annotation::parse("line")));
        assert_eq!(projection.get(0).unwrap().annotation.as_ref().unwrap().len(), 1);
        assert!(!projection.set_annotation(1, None));
    }

    #[test]
    fn release_all_revokes_every_handle() {
        let mut projection = projection_with(&["a", "b", "c"]);
        assert_eq!(projection.registry().live_count(), 3);

        projection.release_all();

        assert_eq!(projection.registry().live_count(), 0);
        assert!(projection.is_empty());
    }

    #[test]
    fn cue_carries_url_and_duration() {
        let mut projection = projection_with(&["a"]);
        projection.set_duration("a", 12.0);

        let cue = projection.get(0).unwrap().cue();
        assert_eq!(cue.name, "a");
        assert_eq!(cue.duration_seconds, Some(12.0));
        assert!(projection.registry().resolve(&cue.url).is_some());
    }

    #[test]
    fn legacy_record_becomes_path_resource() {
        let registry = ResourceRegistry::new();
        let track =
            LiveTrack::from_record(TrackRecord::legacy("old", "/music/old.mp3"), &registry).unwrap();

        let resource = registry.resolve(track.url()).unwrap();
        assert_eq!(resource.source, ByteSource::from_path("/music/old.mp3"));
        track.release();
    }

    #[test]
    fn malformed_record_registers_nothing() {
        let registry = ResourceRegistry::new();
        let record = TrackRecord::encoded("bad", "not a data url", "audio/mpeg");

        let result = LiveTrack::from_record(record, &registry);

        assert!(matches!(result, Err(EncoreError::Decode { .. })));
        assert_eq!(registry.live_count(), 0);
    }
}
