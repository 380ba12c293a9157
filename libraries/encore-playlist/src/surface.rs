//! Admin and public surfaces
//!
//! Each surface is an owned struct built around an injected store. The two
//! never share memory; a public surface sees admin changes only after it
//! loads again.

use crate::pipeline::{SavePipeline, SaveReport, SaveRequest};
use crate::probe::DurationProbe;
use crate::projection::{LiveTrack, LoadReport, PlaylistProjection, ProjectionState};
use crate::resource::{PlayableResource, ResourceRegistry};
use crate::transport::{PlayMode, PlaybackCue, Transport};
use encore_core::{annotation, AnnotationLine, EncoreError, Result, TrackStore, UploadedFile};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Notifications for whatever renders a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A load finished; `tracks` is zero for an empty store
    Loaded { tracks: usize },

    /// A load failed and the projection is in the failed state
    LoadFailed { reason: String },

    /// A save batch finished (once per batch, never per item)
    Saved { saved: usize, failed: usize },
}

fn emit(events: &UnboundedSender<SurfaceEvent>, event: SurfaceEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Surface event dropped: no listener");
    }
}

fn load_event(projection: &PlaylistProjection) -> SurfaceEvent {
    match projection.state() {
        ProjectionState::Failed(reason) => SurfaceEvent::LoadFailed {
            reason: reason.clone(),
        },
        _ => SurfaceEvent::Loaded {
            tracks: projection.len(),
        },
    }
}

/// Curating surface: uploads, reorders, removes, annotates and clears
pub struct AdminSurface<S: TrackStore + ?Sized> {
    store: Arc<S>,
    projection: PlaylistProjection,
    pipeline: SavePipeline<S>,
    events: UnboundedSender<SurfaceEvent>,
}

impl<S: TrackStore + ?Sized> AdminSurface<S> {
    pub fn new(
        store: Arc<S>,
        registry: ResourceRegistry,
        events: UnboundedSender<SurfaceEvent>,
    ) -> Self {
        let pipeline = SavePipeline::new(Arc::clone(&store));
        Self::with_pipeline(store, registry, pipeline, events)
    }

    /// Create a surface whose pipeline uses `probe` for durations
    pub fn with_probe(
        store: Arc<S>,
        registry: ResourceRegistry,
        probe: Arc<dyn DurationProbe>,
        events: UnboundedSender<SurfaceEvent>,
    ) -> Self {
        let pipeline = SavePipeline::with_probe(Arc::clone(&store), probe);
        Self::with_pipeline(store, registry, pipeline, events)
    }

    fn with_pipeline(
        store: Arc<S>,
        registry: ResourceRegistry,
        pipeline: SavePipeline<S>,
        events: UnboundedSender<SurfaceEvent>,
    ) -> Self {
        Self {
            store,
            projection: PlaylistProjection::new(registry),
            pipeline,
            events,
        }
    }

    pub fn projection(&self) -> &PlaylistProjection {
        &self.projection
    }

    /// Rebuild the projection from the store
    pub async fn load(&mut self) -> LoadReport {
        let report = self.projection.load_from(self.store.as_ref()).await;
        emit(&self.events, load_event(&self.projection));
        report
    }

    /// Stage uploads in the projection, then persist them in order
    ///
    /// Tracks appear in the projection before their writes complete and stay
    /// there even if their write fails. Probed durations are applied once
    /// the batch is done. Emits one [`SurfaceEvent::Saved`].
    pub async fn upload(&mut self, files: Vec<UploadedFile>) -> SaveReport {
        if files.is_empty() {
            return SaveReport::default();
        }

        let mut requests = Vec::with_capacity(files.len());
        for file in &files {
            let request = SaveRequest::from_upload(file);
            let track = LiveTrack::register(
                self.projection.registry(),
                &request.name,
                &request.mime_type,
                request.source.clone(),
            );
            self.projection.insert_uploaded(track);
            requests.push(request);
        }

        let report = self.pipeline.save_all(requests).await;

        for saved in report.saved() {
            if let Some(duration) = saved.duration_seconds {
                self.projection.set_duration(&saved.name, duration);
            }
        }

        emit(
            &self.events,
            SurfaceEvent::Saved {
                saved: report.saved_count(),
                failed: report.failed_count(),
            },
        );

        report
    }

    /// Move a track within the projection; not persisted
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.projection.reorder(from, to)
    }

    /// Remove the track at `index` from the projection and the store
    ///
    /// # Errors
    /// Returns `EncoreError::Write` if the store delete fails
    pub async fn remove(&mut self, index: usize) -> Result<Option<String>> {
        self.projection.remove_at(index, self.store.as_ref()).await
    }

    /// Replace the annotation of the track at `index` with `raw_text` and
    /// persist the track
    ///
    /// The in-memory edit is kept even if the save fails. Emits one
    /// [`SurfaceEvent::Saved`] once the save is attempted.
    ///
    /// # Errors
    /// Returns `EncoreError::InvalidInput` for an out-of-range index, or the
    /// save error
    pub async fn annotate(&mut self, index: usize, raw_text: &str) -> Result<()> {
        if !self.projection.set_annotation(index, annotation::parse(raw_text)) {
            return Err(EncoreError::invalid_input(format!("no track at index {index}")));
        }

        let result = match self.projection.get(index) {
            Some(track) => match SaveRequest::from_live(track, self.projection.registry()) {
                Ok(request) => self.pipeline.save_one(request).await.map(|_| ()),
                Err(e) => Err(e),
            },
            None => Err(EncoreError::invalid_input(format!("no track at index {index}"))),
        };

        if let Err(e) = &result {
            tracing::error!("Failed to save annotation: {}", e);
        }

        let failed = usize::from(result.is_err());
        emit(
            &self.events,
            SurfaceEvent::Saved {
                saved: 1 - failed,
                failed,
            },
        );

        result
    }

    /// Remove every track, after `confirm` approves the track count
    ///
    /// Returns `false` without touching anything if `confirm` declines.
    ///
    /// # Errors
    /// Returns `EncoreError::Write` if the store could not be cleared
    pub async fn clear<F>(&mut self, confirm: F) -> Result<bool>
    where
        F: FnOnce(usize) -> bool,
    {
        if !confirm(self.projection.len()) {
            tracing::debug!("Clear declined");
            return Ok(false);
        }

        self.projection.clear(self.store.as_ref()).await?;
        Ok(true)
    }

    /// Release every handle held by this surface
    pub fn close(&mut self) {
        self.projection.release_all();
    }
}

/// Read-only listening surface
pub struct PublicSurface<S: TrackStore + ?Sized> {
    store: Arc<S>,
    projection: PlaylistProjection,
    transport: Transport,
    events: UnboundedSender<SurfaceEvent>,
}

impl<S: TrackStore + ?Sized> PublicSurface<S> {
    pub fn new(
        store: Arc<S>,
        registry: ResourceRegistry,
        events: UnboundedSender<SurfaceEvent>,
    ) -> Self {
        Self {
            store,
            projection: PlaylistProjection::new(registry),
            transport: Transport::new(),
            events,
        }
    }

    pub fn projection(&self) -> &PlaylistProjection {
        &self.projection
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Rebuild the projection and cue the first track
    pub async fn load(&mut self) -> LoadReport {
        let report = self.projection.load_from(self.store.as_ref()).await;
        self.transport.reset();
        if self.projection.state() == &ProjectionState::Loaded {
            self.transport.select(&self.projection, 0);
        }
        emit(&self.events, load_event(&self.projection));
        report
    }

    /// Resolve a cue to the resource the sink should play
    pub fn resolve(&self, cue: &PlaybackCue) -> Option<Arc<PlayableResource>> {
        self.projection.registry().resolve(&cue.url)
    }

    pub fn current_cue(&self) -> Option<PlaybackCue> {
        self.transport.current_cue(&self.projection)
    }

    /// Annotation lines of the current track
    pub fn current_annotation(&self) -> Option<&[AnnotationLine]> {
        self.transport
            .current_index()
            .and_then(|index| self.projection.get(index))
            .and_then(|track| track.annotation.as_deref())
    }

    pub fn select(&mut self, index: usize) -> Option<PlaybackCue> {
        self.transport.select(&self.projection, index)
    }

    pub fn next_track(&mut self) -> Option<PlaybackCue> {
        self.transport.next(&self.projection)
    }

    pub fn previous_track(&mut self) -> Option<PlaybackCue> {
        self.transport.previous(&self.projection)
    }

    pub fn on_track_end(&mut self) -> Option<PlaybackCue> {
        self.transport.on_track_end(&self.projection)
    }

    pub fn toggle_play(&mut self) -> bool {
        self.transport.toggle_play(&self.projection)
    }

    pub fn toggle_mode(&mut self) -> PlayMode {
        self.transport.toggle_mode()
    }

    pub fn rewind(&mut self) -> f64 {
        self.transport.rewind()
    }

    pub fn forward(&mut self) -> f64 {
        self.transport.forward(&self.projection)
    }

    pub fn seek_percent(&mut self, percent: f64) -> Option<f64> {
        self.transport.seek_percent(&self.projection, percent)
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.transport.set_position(seconds);
    }

    pub fn set_speed(&mut self, speed: f64) -> bool {
        self.transport.set_speed(speed)
    }

    /// Release every handle held by this surface
    pub fn close(&mut self) {
        self.transport.reset();
        self.projection.release_all();
    }
}
