//! Raw occurrence input: file reading, encoding detection and JSON decoding.
//!
//! The fetch step normally writes UTF-8, but exports re-saved by desktop
//! tools show up as Latin-1 or Windows-1252 often enough that the bytes are
//! sniffed before decoding. Decoding itself never fails; only a missing file
//! or invalid JSON stops the run.

pub mod payload;

pub use payload::{find_occurrence_list, CONTAINER_KEYS};

use serde_json::Value;
use std::path::Path;

use crate::error::{InputError, InputResult};

const UTF8_BOM: char = '\u{feff}';

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text.
///
/// Valid UTF-8 is used as-is whatever the detector says; otherwise the
/// detected single-byte encoding is applied, falling back to lossy UTF-8.
/// A leading byte-order mark is dropped.
pub fn decode_content(bytes: &[u8]) -> (String, String) {
    let (text, encoding) = match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), "utf-8".to_string()),
        Err(_) => {
            let encoding = detect_encoding(bytes);
            let text = match encoding.as_str() {
                "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
                "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
                _ => String::from_utf8_lossy(bytes).into_owned(),
            };
            (text, encoding)
        }
    };

    let text = match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    };
    (text, encoding)
}

/// Parse raw bytes into a JSON value.
///
/// `origin` is only used in the error.
pub fn parse_raw_bytes(bytes: &[u8], origin: &Path) -> InputResult<Value> {
    let (content, encoding) = decode_content(bytes);
    tracing::debug!(encoding = %encoding, bytes = bytes.len(), "decoded raw input");

    serde_json::from_str(&content).map_err(|source| InputError::Malformed {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read and decode the raw occurrence JSON file.
///
/// # Errors
/// - [`InputError::NotFound`] if the file does not exist
/// - [`InputError::Io`] if it cannot be read
/// - [`InputError::Malformed`] if it is not JSON
pub fn read_raw_json<P: AsRef<Path>>(path: P) -> InputResult<Value> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raw_bytes(&bytes, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_utf8_passthrough() {
        let (text, encoding) = decode_content("{\"locality\": \"Saint-André\"}".as_bytes());
        assert_eq!(encoding, "utf-8");
        assert!(text.contains("Saint-André"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"[]");
        let value = parse_raw_bytes(&bytes, Path::new("bom.json")).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_latin1_decoding() {
        // {"locality":"Entre-Deux é"} with a Latin-1 é
        let mut bytes = b"{\"locality\":\"Entre-Deux ".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"\"}");
        let value = parse_raw_bytes(&bytes, Path::new("latin1.json")).unwrap();
        assert!(value["locality"].as_str().unwrap().starts_with("Entre-Deux"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_raw_bytes(b"{\"results\": [", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, InputError::Malformed { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_raw_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, InputError::NotFound(_)));
    }

    #[test]
    fn test_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.json");
        std::fs::write(&path, r#"{"results": [{"scientificName": "Iris japonica"}]}"#).unwrap();
        let value = read_raw_json(&path).unwrap();
        assert_eq!(value["results"][0]["scientificName"], "Iris japonica");
    }
}
