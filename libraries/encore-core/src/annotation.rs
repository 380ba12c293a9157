//! Annotation model
//!
//! An annotation is an ordered list of text lines attached to a track. It is
//! edited as a single block of text and shown either in full (one line per
//! row) or as a compact single-line preview.
//!
//! "Never annotated" and "annotated with nothing" are not distinguished:
//! both are `None`.

use serde::{Deserialize, Serialize};

/// Preview width used by the admin track list
pub const DEFAULT_PREVIEW_CHARS: usize = 50;

/// Marker appended to truncated previews
pub const ELLIPSIS: &str = "...";

/// One line of an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationLine {
    /// Line text, already trimmed
    pub content: String,
}

impl AnnotationLine {
    /// Create a new line
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Ordered annotation lines
pub type Annotation = Vec<AnnotationLine>;

/// Parse an edited text block into annotation lines
///
/// Lines are trimmed and blank lines dropped. Returns `None` when nothing
/// is left.
pub fn parse(raw: &str) -> Option<Annotation> {
    let lines: Annotation = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(AnnotationLine::new)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

/// Render lines back into an editable text block
pub fn render(lines: &[AnnotationLine]) -> String {
    join(lines, "\n")
}

/// Render a single-line preview of at most `max_chars` characters
///
/// Longer previews are cut to exactly `max_chars` characters followed by
/// [`ELLIPSIS`]. Characters are counted as Unicode scalar values.
pub fn render_preview(lines: &[AnnotationLine], max_chars: usize) -> String {
    let joined = join(lines, " ");
    if joined.chars().count() <= max_chars {
        return joined;
    }

    let mut preview: String = joined.chars().take(max_chars).collect();
    preview.push_str(ELLIPSIS);
    preview
}

fn join(lines: &[AnnotationLine], separator: &str) -> String {
    lines
        .iter()
        .map(|line| line.content.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
