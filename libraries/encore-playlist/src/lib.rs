//! Encore Playlist
//!
//! The in-memory side of the Encore playlist store: revocable playable
//! resources, the ordered playlist projection each surface holds, the
//! sequential save pipeline, and the admin and public surfaces built on
//! top of them.
//!
//! # Architecture
//!
//! - **Projection**: ordered view of the store; owns one generation of
//!   resource handles and releases them on rebuild, remove and clear
//! - **Save Pipeline**: read, probe, encode, upsert; one item at a time with
//!   per-item failure isolation
//! - **Surfaces**: owned structs with an injected `TrackStore`; the admin
//!   surface writes through, the public surface only reads
//! - **Transport**: current track, play mode and playhead for the public
//!   surface; produces `PlaybackCue`s for an external sink
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_core::{ByteSource, TrackStore, UploadedFile};
//! use encore_playlist::{AdminSurface, ResourceRegistry};
//! use std::sync::Arc;
//!
//! # async fn example(store: Arc<dyn TrackStore>) {
//! let (events, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut admin = AdminSurface::new(store, ResourceRegistry::new(), events);
//!
//! admin.load().await;
//! let report = admin
//!     .upload(vec![UploadedFile::new(
//!         "song.mp3",
//!         Some("audio/mpeg".to_string()),
//!         ByteSource::from_path("/music/song.mp3"),
//!     )])
//!     .await;
//! println!("{} saved, {} failed", report.saved_count(), report.failed_count());
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod display;
pub mod pipeline;
pub mod probe;
pub mod projection;
pub mod resource;
pub mod session;
pub mod surface;
pub mod transport;

pub use display::{format_duration, format_time};
pub use pipeline::{SaveOutcome, SavePipeline, SaveReport, SaveRequest, SavedTrack};
pub use probe::{DurationProbe, LoftyProbe};
pub use projection::{LiveTrack, LoadReport, PlaylistProjection, ProjectionState, SkippedRecord};
pub use resource::{PlayableResource, ResourceHandle, ResourceRegistry};
pub use session::{AdminSession, LoginOutcome, ADMIN_AUTH_TIME, SESSION_TTL_MS};
pub use surface::{AdminSurface, PublicSurface, SurfaceEvent};
pub use transport::{PlayMode, PlaybackCue, Transport};
