//! Domain types for Encore

mod track;
mod upload;

pub use track::{normalize_mime_type, StoredPayload, TrackRecord, DEFAULT_MIME_TYPE};
pub use upload::{track_name_from_file, ByteSource, UploadedFile};
