//! Opaque connection cursors
//!
//! A cursor encodes a type tag and an entity key, nothing else. Clients must
//! treat it as opaque; the engine only ever uses it to locate an anchor key
//! inside a candidate set, never as a position.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::{ConnectionError, Result};

/// Cursor encoding/decoding.
///
/// Errors returned here carry terse internal detail only; the connection
/// resolver replaces them with a localized message before anything reaches
/// the client.
pub struct CursorCodec;

impl CursorCodec {
    /// Encode a cursor as base64 of `"{type_tag}:{key}"`.
    ///
    /// Type tags must not contain `:`; keys may.
    pub fn encode(type_tag: &str, key: &str) -> String {
        BASE64.encode(format!("{type_tag}:{key}").as_bytes())
    }

    /// Decode a cursor into its type tag and key.
    pub fn decode(cursor: &str) -> Result<(String, String)> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|_| ConnectionError::Decode("cursor is not valid base64".to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConnectionError::Decode("cursor is not valid UTF-8".to_string()))?;
        let (type_tag, key) = text
            .split_once(':')
            .ok_or_else(|| ConnectionError::Decode("cursor has no type tag".to_string()))?;
        Ok((type_tag.to_string(), key.to_string()))
    }

    /// Decode a cursor, insisting that its embedded type tag matches the
    /// connection it is used in. A cursor minted for one connection type is
    /// rejected on any other.
    pub fn decode_expecting(cursor: &str, expected_tag: &str) -> Result<String> {
        let (type_tag, key) = Self::decode(cursor)?;
        if type_tag != expected_tag {
            return Err(ConnectionError::Decode(format!(
                "cursor type tag `{type_tag}` does not match `{expected_tag}`"
            )));
        }
        Ok(key)
    }

    /// Encode a structured payload under a type tag, for composite sort keys.
    pub fn encode_payload<T: Serialize>(type_tag: &str, payload: &T) -> Result<String> {
        let json = serde_json::to_string(payload)
            .map_err(|e| ConnectionError::Decode(e.to_string()))?;
        Ok(Self::encode(type_tag, &json))
    }

    /// Decode a structured payload, checking the type tag.
    pub fn decode_payload<T: DeserializeOwned>(cursor: &str, expected_tag: &str) -> Result<T> {
        let json = Self::decode_expecting(cursor, expected_tag)?;
        serde_json::from_str(&json).map_err(|e| ConnectionError::Decode(e.to_string()))
    }
}
