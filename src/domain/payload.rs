//! Memory Payload Codec - `gz:` Compressed Segment Decoding
//!
//! The memory API returns the segment either as a structured value, as
//! JSON text, or as JSON text that the game script gzipped and base64
//! encoded behind a `gz:` marker. This module turns any of those into
//! a plain JSON value, and provides the inverse for the compressed form.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json::Value;
use thiserror::Error;

/// Prefix the game server puts in front of compressed segments.
pub const COMPRESSION_MARKER: &str = "gz:";

/// Failure while turning a payload into a JSON value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Text after the marker is not valid base64.
    #[error("invalid base64 in compressed payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Bytes are not a valid gzip stream.
    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
    /// Gzip output is not UTF-8 text.
    #[error("decompressed payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// Text is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Gzip encoding failed (encoder side only).
    #[error("gzip compression failed: {0}")]
    Compress(#[source] std::io::Error),
}

/// Decode the envelope's `data` field.
///
/// - Non-string values are returned unchanged.
/// - Strings starting with [`COMPRESSION_MARKER`] are base64-decoded,
///   gunzipped and parsed.
/// - Any other string is parsed as JSON text.
///
/// # Errors
/// Returns the first failing step; no partial result is produced.
pub fn decode_payload(data: Value) -> Result<Value, DecodeError> {
    match data {
        Value::String(text) => match text.strip_prefix(COMPRESSION_MARKER) {
            Some(encoded) => decode_compressed(encoded),
            None => Ok(serde_json::from_str(&text)?),
        },
        other => Ok(other),
    }
}

/// Decode the base64 body of a compressed payload (marker already removed).
/// ASCII whitespace anywhere in the body is ignored, so line-wrapped
/// base64 decodes like the unwrapped form.
///
/// # Errors
/// See [`DecodeError`].
pub fn decode_compressed(encoded: &str) -> Result<Value, DecodeError> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let compressed = STANDARD.decode(cleaned)?;

    let mut decompressed = Vec::with_capacity(compressed.len() * 4);
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Decompress)?;

    let text = String::from_utf8(decompressed)?;
    Ok(serde_json::from_str(&text)?)
}

/// Encode a value the way the game script does: JSON, gzip, base64,
/// then the `gz:` marker.
///
/// # Errors
/// Fails only if serialization or the in-memory gzip writer fails.
pub fn encode_compressed(value: &Value) -> Result<String, DecodeError> {
    let json = serde_json::to_vec(value)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).map_err(DecodeError::Compress)?;
    let compressed = encoder.finish().map_err(DecodeError::Compress)?;

    Ok(format!("{COMPRESSION_MARKER}{}", STANDARD.encode(compressed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_data_passes_through() {
        let doc = json!({"cpu": {"bucket": 10000}, "colonies": {}});
        assert_eq!(decode_payload(doc.clone()).unwrap(), doc);
        assert_eq!(decode_payload(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_plain_json_string_is_parsed() {
        let data = Value::String(r#"{"creeps":{"total":42}}"#.to_string());
        assert_eq!(decode_payload(data).unwrap(), json!({"creeps": {"total": 42}}));
    }

    #[test]
    fn test_compressed_string_is_decoded() {
        let doc = json!({"gcl": {"level": 10, "progress_percent": 50.5}});
        let encoded = encode_compressed(&doc).unwrap();
        assert!(encoded.starts_with("gz:"));
        assert_eq!(decode_payload(Value::String(encoded)).unwrap(), doc);
    }

    #[test]
    fn test_line_wrapped_base64_is_decoded() {
        let doc = json!({"resources": {"energy": 123_456, "power": 7}, "creeps": {"total": 42}});
        let encoded = encode_compressed(&doc).unwrap();
        let body = encoded.strip_prefix(COMPRESSION_MARKER).unwrap();

        let wrapped: String = body
            .as_bytes()
            .chunks(16)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        assert!(wrapped.contains('\n'));

        let data = format!("{COMPRESSION_MARKER}\n{wrapped}\n");
        assert_eq!(decode_payload(Value::String(data)).unwrap(), doc);
    }

    #[test]
    fn test_invalid_base64_fails() {
        let err = decode_payload(Value::String("gz:!!not-base64!!".into())).unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_non_gzip_bytes_fail() {
        let data = format!("gz:{}", STANDARD.encode(b"plain bytes, no gzip header"));
        let err = decode_payload(Value::String(data)).unwrap_err();
        assert!(matches!(err, DecodeError::Decompress(_)));
    }

    #[test]
    fn test_non_utf8_content_fails() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&[0xff, 0xfe, 0xfd]).unwrap();
        let data = format!("gz:{}", STANDARD.encode(encoder.finish().unwrap()));

        let err = decode_payload(Value::String(data)).unwrap_err();
        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn test_compressed_garbage_json_fails() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(b"{not json").unwrap();
        let data = format!("gz:{}", STANDARD.encode(encoder.finish().unwrap()));

        let err = decode_payload(Value::String(data)).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_plain_garbage_string_fails() {
        let err = decode_payload(Value::String("stats unavailable".into())).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
