/// Upload intake types
use crate::error::{EncoreError, Result};
use crate::types::track::normalize_mime_type;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the bytes of a track live before they are encoded
///
/// Registering a source never reads it; reading happens when the bytes are
/// actually needed (encoding, playback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    /// Bytes already in memory
    Memory(Arc<[u8]>),

    /// A file on disk
    Path(PathBuf),
}

impl ByteSource {
    /// Wrap in-memory bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memory(Arc::from(bytes.into()))
    }

    /// Reference a file on disk
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Read the full contents
    ///
    /// # Errors
    /// Returns `EncoreError::Read` (tagged with `name`) if the file cannot be read
    pub async fn read(&self, name: &str) -> Result<Arc<[u8]>> {
        match self {
            Self::Memory(bytes) => Ok(Arc::clone(bytes)),
            Self::Path(path) => tokio::fs::read(path)
                .await
                .map(Arc::from)
                .map_err(|e| EncoreError::read(name, format!("{}: {}", path.display(), e))),
        }
    }
}

/// A file handed over by the upload intake
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, extension included
    pub file_name: String,

    /// Content type declared by the uploader, if any
    pub declared_type: Option<String>,

    /// The file's bytes
    pub source: ByteSource,
}

impl UploadedFile {
    /// Create a new upload
    pub fn new(
        file_name: impl Into<String>,
        declared_type: Option<String>,
        source: ByteSource,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type,
            source,
        }
    }

    /// Track name derived from the file name
    pub fn track_name(&self) -> String {
        track_name_from_file(&self.file_name)
    }

    /// Declared content type, or the default audio type
    pub fn mime_type(&self) -> String {
        normalize_mime_type(self.declared_type.as_deref())
    }
}

/// Strip the final extension from a file name
///
/// A leading dot is not treated as an extension separator, and directory
/// components are left alone.
pub fn track_name_from_file(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let extension = &file_name[dot + 1..];
            if extension.is_empty() || extension.contains('/') {
                file_name.to_string()
            } else {
                file_name[..dot].to_string()
            }
        }
        _ => file_name.to_string(),
    }
}
