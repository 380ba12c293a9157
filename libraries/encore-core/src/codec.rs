//! Binary codec
//!
//! Converts uploaded audio into a self-describing text encoding that fits a
//! string column, and back. The encoding is a data URL:
//!
//! ```text
//! data:<mime type>;base64,<standard base64 with padding>
//! ```
//!
//! Decoding reconstructs the body in fixed-size chunks into one output
//! buffer; the result is byte-for-byte identical to the encoded input.

use crate::error::{EncoreError, Result};
use crate::types::{normalize_mime_type, ByteSource};
use base64::{engine::general_purpose::STANDARD, Engine as _};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Base64 characters decoded per step; a multiple of 4 so padding can only
/// appear in the final chunk
const DECODE_CHUNK_CHARS: usize = 4096;

/// Bytes recovered from an encoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Original bytes
    pub bytes: Vec<u8>,

    /// Content type to play them with
    pub mime_type: String,
}

/// Encode bytes as data-URL text
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    let mime_type = normalize_mime_type(Some(mime_type));
    let capacity =
        DATA_URL_PREFIX.len() + mime_type.len() + BASE64_MARKER.len() + bytes.len().div_ceil(3) * 4;
    let mut encoded = String::with_capacity(capacity);
    encoded.push_str(DATA_URL_PREFIX);
    encoded.push_str(&mime_type);
    encoded.push_str(BASE64_MARKER);
    STANDARD.encode_string(bytes, &mut encoded);
    encoded
}

/// Read a source and encode its bytes
///
/// # Errors
/// Returns `EncoreError::Read` if the source cannot be read
pub async fn encode_source(source: &ByteSource, name: &str, mime_type: &str) -> Result<String> {
    let bytes = source.read(name).await?;
    Ok(encode(&bytes, mime_type))
}

/// Decode data-URL text back into bytes
///
/// The content type is taken from `mime_type` when it is non-empty, then
/// from the data URL header, then [`crate::DEFAULT_MIME_TYPE`].
///
/// # Errors
/// Returns `EncoreError::Decode` (tagged with `name`) if the text is not a
/// base64 data URL or the body is not valid base64
pub fn decode(encoded: &str, mime_type: Option<&str>, name: &str) -> Result<DecodedPayload> {
    let rest = encoded
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| EncoreError::decode(name, "missing data URL prefix"))?;
    let (header, body) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| EncoreError::decode(name, "missing base64 marker"))?;

    let mut bytes = Vec::with_capacity(body.len() / 4 * 3);
    for chunk in body.as_bytes().chunks(DECODE_CHUNK_CHARS) {
        STANDARD
            .decode_vec(chunk, &mut bytes)
            .map_err(|e| EncoreError::decode(name, e.to_string()))?;
    }

    let declared = mime_type.map(str::trim).filter(|m| !m.is_empty());
    let embedded = header.split(';').next().map(str::trim).filter(|m| !m.is_empty());

    Ok(DecodedPayload {
        bytes,
        mime_type: normalize_mime_type(declared.or(embedded)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_produces_data_url() {
        assert_eq!(encode(b"abc", "audio/ogg"), "data:audio/ogg;base64,YWJj");
    }

    #[test]
    fn encode_defaults_empty_mime() {
        assert!(encode(b"", "").starts_with("data:audio/mpeg;base64,"));
    }

    #[test]
    fn decode_reverses_encode() {
        let decoded = decode("data:audio/ogg;base64,YWJj", None, "a").unwrap();
        assert_eq!(decoded.bytes, b"abc");
        assert_eq!(decoded.mime_type, "audio/ogg");
    }

    #[test]
    fn record_mime_wins_over_embedded() {
        let decoded = decode("data:audio/ogg;base64,YWJj", Some("audio/wav"), "a").unwrap();
        assert_eq!(decoded.mime_type, "audio/wav");
    }

    #[test]
    fn missing_mime_everywhere_uses_default() {
        let decoded = decode("data:;base64,YWJj", Some(""), "a").unwrap();
        assert_eq!(decoded.mime_type, "audio/mpeg");
    }

    #[test]
    fn empty_body_decodes_to_nothing() {
        let decoded = decode("data:audio/mpeg;base64,", None, "a").unwrap();
        assert!(decoded.bytes.is_empty());
    }

    #[test]
    fn missing_prefix_is_decode_error() {
        let err = decode("YWJj", None, "broken").unwrap_err();
        assert!(matches!(err, EncoreError::Decode { ref name, .. } if name == "broken"));
    }

    #[test]
    fn missing_marker_is_decode_error() {
        assert!(matches!(
            decode("data:audio/mpeg,YWJj", None, "a"),
            Err(EncoreError::Decode { .. })
        ));
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        assert!(matches!(
            decode("data:audio/mpeg;base64,@@@@", None, "a"),
            Err(EncoreError::Decode { .. })
        ));
        assert!(matches!(
            decode("data:audio/mpeg;base64,YWJ", None, "a"),
            Err(EncoreError::Decode { .. })
        ));
    }

    #[test]
    fn large_payload_spans_chunks() {
        let bytes: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let encoded = encode(&bytes, "audio/wav");
        assert!(encoded.len() > DECODE_CHUNK_CHARS * 3);

        let decoded = decode(&encoded, None, "big").unwrap();
        assert_eq!(decoded.bytes, bytes);
    }

    #[tokio::test]
    async fn encode_source_reports_unreadable_source() {
        let source = ByteSource::from_path("/nonexistent/encore.mp3");
        let err = encode_source(&source, "gone", "audio/mpeg").await.unwrap_err();
        assert!(matches!(err, EncoreError::Read { .. }));
    }

    proptest! {
        #[test]
        fn round_trip_is_lossless(bytes in prop::collection::vec(any::<u8>(), 0..10_000)) {
            let encoded = encode(&bytes, "audio/mpeg");
            let decoded = decode(&encoded, None, "prop").unwrap();
            prop_assert_eq!(decoded.bytes, bytes);
        }
    }
}
