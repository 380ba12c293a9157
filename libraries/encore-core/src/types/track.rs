/// Durable track record types
use crate::annotation::Annotation;
use serde::{Deserialize, Serialize};

/// Content type assumed when an upload or record carries none
pub const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Resolve a possibly missing content type to a usable one
///
/// Empty and whitespace-only types count as missing.
pub fn normalize_mime_type(mime_type: Option<&str>) -> String {
    match mime_type.map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_string(),
        _ => DEFAULT_MIME_TYPE.to_string(),
    }
}

/// Where a record keeps its audio
///
/// Rows written by the current schema carry the audio inline as encoded
/// text. Rows from the first schema only pointed at the original file.
/// Both shapes are resolved once, at load time, into a uniform live track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StoredPayload {
    /// Data-URL text produced by [`crate::codec::encode`]
    Encoded(String),

    /// Location of the raw audio (schema v1 rows)
    LegacyResourceRef(String),
}

impl StoredPayload {
    /// Encoded text, if this payload is inline
    pub fn as_encoded(&self) -> Option<&str> {
        match self {
            Self::Encoded(text) => Some(text),
            Self::LegacyResourceRef(_) => None,
        }
    }

    /// Whether this payload predates inline encoding
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyResourceRef(_))
    }
}

/// A track as persisted in the track store
///
/// `name` is the primary key: writing a second record with the same name
/// replaces the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Unique key and display name
    pub name: String,

    /// The audio itself, or where to find it
    pub payload: StoredPayload,

    /// Original content type
    pub mime_type: String,

    /// Duration in seconds, unknown until the audio has been probed
    pub duration_seconds: Option<f64>,

    /// Attached text lines; `None` means "no annotation"
    pub annotation: Option<Annotation>,
}

impl TrackRecord {
    /// Create a record carrying an encoded payload
    pub fn encoded(
        name: impl Into<String>,
        encoded_payload: impl Into<String>,
        mime_type: &str,
    ) -> Self {
        Self {
            name: name.into(),
            payload: StoredPayload::Encoded(encoded_payload.into()),
            mime_type: normalize_mime_type(Some(mime_type)),
            duration_seconds: None,
            annotation: None,
        }
    }

    /// Create a record that only references its audio (schema v1 shape)
    pub fn legacy(name: impl Into<String>, resource_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: StoredPayload::LegacyResourceRef(resource_ref.into()),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            duration_seconds: None,
            annotation: None,
        }
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration_seconds: Option<f64>) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    /// Set the annotation
    #[must_use]
    pub fn with_annotation(mut self, annotation: Option<Annotation>) -> Self {
        self.annotation = annotation;
        self
    }

    /// Number of annotation lines (0 when unannotated)
    pub fn annotation_len(&self) -> usize {
        self.annotation.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationLine;

    #[test]
    fn missing_mime_falls_back_to_default() {
        assert_eq!(normalize_mime_type(None), DEFAULT_MIME_TYPE);
        assert_eq!(normalize_mime_type(Some("")), DEFAULT_MIME_TYPE);
        assert_eq!(normalize_mime_type(Some("  ")), DEFAULT_MIME_TYPE);
        assert_eq!(normalize_mime_type(Some("audio/flac")), "audio/flac");
    }

    #[test]
    fn encoded_record_normalizes_mime() {
        let record = TrackRecord::encoded("a", "data:;base64,", "");
        assert_eq!(record.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(record.payload.as_encoded(), Some("data:;base64,"));
        assert!(!record.payload.is_legacy());
    }

    #[test]
    fn legacy_record_has_no_encoded_text() {
        let record = TrackRecord::legacy("old", "/music/old.mp3");
        assert!(record.payload.is_legacy());
        assert_eq!(record.payload.as_encoded(), None);
    }

    #[test]
    fn annotation_len_counts_lines() {
        let record = TrackRecord::encoded("a", "data:audio/mpeg;base64,", "audio/mpeg");
        assert_eq!(record.annotation_len(), 0);

        let record = record.with_annotation(Some(vec![
            AnnotationLine::new("one"),
            AnnotationLine::new("two"),
        ]));
        assert_eq!(record.annotation_len(), 2);
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let json = serde_json::to_string(&StoredPayload::LegacyResourceRef("x".into())).unwrap();
        assert_eq!(json, r#"{"kind":"legacy_resource_ref","value":"x"}"#);
    }
}
