//! Encore Core
//!
//! Platform-agnostic core types, traits, and error handling for the Encore
//! playlist store.
//!
//! This crate provides the building blocks shared by the storage layer and
//! both playlist surfaces (admin and public).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRecord`, `StoredPayload`, `UploadedFile`, `ByteSource`
//! - **Core Traits**: `TrackStore`, `PreferenceStore`
//! - **Binary Codec**: lossless data-URL encoding of uploaded audio
//! - **Annotation Model**: per-track text lines
//! - **Error Handling**: Unified `EncoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::{annotation, codec, TrackRecord};
//!
//! let encoded = codec::encode(b"ID3 audio bytes", "audio/mpeg");
//! let record = TrackRecord::encoded("Opening Night", encoded, "audio/mpeg")
//!     .with_annotation(annotation::parse("verse one\nverse two"));
//!
//! assert_eq!(record.annotation.as_ref().map(Vec::len), Some(2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod annotation;
pub mod codec;
pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationLine};
pub use error::{EncoreError, Result};
pub use storage::{PreferenceStore, TrackStore};
pub use types::{
    normalize_mime_type, track_name_from_file, ByteSource, StoredPayload, TrackRecord,
    UploadedFile, DEFAULT_MIME_TYPE,
};
