//! Save pipeline
//!
//! Turns uploads into durable records. Each request goes through:
//!
//! 1. Read the source bytes (`EncoreError::Read` on failure)
//! 2. Probe the duration if the request does not carry one
//! 3. Encode as data-URL text
//! 4. Upsert by name (`EncoreError::Write` on failure)
//!
//! Requests are processed strictly one after another. A failed item is
//! logged and recorded in the [`SaveReport`]; the remaining items are still
//! attempted.

use crate::probe::{DurationProbe, LoftyProbe};
use crate::projection::LiveTrack;
use crate::resource::ResourceRegistry;
use encore_core::{
    codec, Annotation, ByteSource, EncoreError, Result, TrackRecord, TrackStore, UploadedFile,
};
use std::sync::Arc;

/// One track to persist
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// Track name (the store key)
    pub name: String,

    /// Content type
    pub mime_type: String,

    /// Where to read the bytes from
    pub source: ByteSource,

    /// Known duration, if any
    pub duration_seconds: Option<f64>,

    /// Annotation to store with the track
    pub annotation: Option<Annotation>,
}

impl SaveRequest {
    /// Request for a freshly uploaded file
    pub fn from_upload(file: &UploadedFile) -> Self {
        Self {
            name: file.track_name(),
            mime_type: file.mime_type(),
            source: file.source.clone(),
            duration_seconds: None,
            annotation: None,
        }
    }

    /// Request that re-persists a live track, e.g. after an annotation edit
    ///
    /// # Errors
    /// Returns `EncoreError::Read` if the track's handle has been released
    pub fn from_live(track: &LiveTrack, registry: &ResourceRegistry) -> Result<Self> {
        let resource = registry
            .resolve(track.url())
            .ok_or_else(|| EncoreError::read(&track.name, "resource handle was released"))?;

        Ok(Self {
            name: track.name.clone(),
            mime_type: track.mime_type.clone(),
            source: resource.source.clone(),
            duration_seconds: track.duration_seconds,
            annotation: track.annotation.clone(),
        })
    }
}

/// A track that reached the store
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTrack {
    /// Track name
    pub name: String,

    /// Duration as stored (probed if it was unknown)
    pub duration_seconds: Option<f64>,
}

/// Result of one item in a batch
#[derive(Debug)]
pub enum SaveOutcome {
    /// Persisted
    Saved(SavedTrack),

    /// Not persisted
    Failed {
        /// Track name
        name: String,
        /// Why
        error: EncoreError,
    },
}

impl SaveOutcome {
    /// Name of the track this outcome is about
    pub fn name(&self) -> &str {
        match self {
            Self::Saved(saved) => &saved.name,
            Self::Failed { name, .. } => name,
        }
    }
}

/// Per-item outcomes of one batch, in request order
#[derive(Debug, Default)]
pub struct SaveReport {
    pub outcomes: Vec<SaveOutcome>,
}

impl SaveReport {
    /// Tracks that were persisted
    pub fn saved(&self) -> impl Iterator<Item = &SavedTrack> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SaveOutcome::Saved(saved) => Some(saved),
            SaveOutcome::Failed { .. } => None,
        })
    }

    /// Tracks that failed, with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &EncoreError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SaveOutcome::Failed { name, error } => Some((name.as_str(), error)),
            SaveOutcome::Saved(_) => None,
        })
    }

    pub fn saved_count(&self) -> usize {
        self.saved().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Whether every item was persisted
    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Sequential encode-then-upsert pipeline
pub struct SavePipeline<S: TrackStore + ?Sized> {
    store: Arc<S>,
    probe: Arc<dyn DurationProbe>,
}

impl<S: TrackStore + ?Sized> SavePipeline<S> {
    /// Create a pipeline that probes durations with lofty
    pub fn new(store: Arc<S>) -> Self {
        Self::with_probe(store, Arc::new(LoftyProbe))
    }

    /// Create a pipeline with a custom duration probe
    pub fn with_probe(store: Arc<S>, probe: Arc<dyn DurationProbe>) -> Self {
        Self { store, probe }
    }

    /// Persist every request, in order
    ///
    /// Never returns early: each request yields exactly one outcome.
    pub async fn save_all(&self, requests: Vec<SaveRequest>) -> SaveReport {
        let total = requests.len();
        tracing::info!("Saving {} tracks", total);

        let mut report = SaveReport {
            outcomes: Vec::with_capacity(total),
        };

        for (index, request) in requests.into_iter().enumerate() {
            let name = request.name.clone();
            tracing::debug!("Saving {}/{}: {}", index + 1, total, name);

            match self.save_one(request).await {
                Ok(saved) => report.outcomes.push(SaveOutcome::Saved(saved)),
                Err(error) => {
                    tracing::error!("Failed to save {}: {}", name, error);
                    report.outcomes.push(SaveOutcome::Failed { name, error });
                }
            }
        }

        tracing::info!(
            "Save complete: {} saved, {} failed",
            report.saved_count(),
            report.failed_count()
        );

        report
    }

    /// Persist one request
    ///
    /// # Errors
    /// Returns `EncoreError::Read` if the source cannot be read and
    /// `EncoreError::Write` if the upsert fails
    pub async fn save_one(&self, request: SaveRequest) -> Result<SavedTrack> {
        let bytes = request.source.read(&request.name).await?;

        let duration_seconds = request
            .duration_seconds
            .or_else(|| self.probe.probe(&bytes));

        let encoded = codec::encode(&bytes, &request.mime_type);
        let record = TrackRecord::encoded(&request.name, encoded, &request.mime_type)
            .with_duration(duration_seconds)
            .with_annotation(request.annotation);

        self.store.upsert(record).await?;

        Ok(SavedTrack {
            name: request.name,
            duration_seconds,
        })
    }
}
