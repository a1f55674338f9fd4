//! Cached payload representation

use serde::Serialize;

/// A decoded cache payload.
///
/// Payloads are written as serialized JSON, but reads tolerate any byte
/// shape via a fallback chain: JSON first, then UTF-8 text, then the raw
/// bytes unchanged. Decoding therefore never fails on payload shape.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Payload parsed as JSON.
    Json(serde_json::Value),
    /// Payload was not valid JSON but is valid UTF-8.
    Text(String),
    /// Raw bytes, neither JSON nor UTF-8.
    Bytes(Vec<u8>),
}

impl CachedValue {
    /// Decode payload bytes through the fallback chain.
    pub fn decode(bytes: &[u8]) -> Self {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return Self::Json(value);
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Bytes(bytes.to_vec()),
        }
    }

    /// The JSON value, if this payload decoded as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize the JSON payload into a typed value.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.as_json()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

impl From<serde_json::Value> for CachedValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl Serialize for CachedValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::Text(text) => text.serialize(serializer),
            Self::Bytes(bytes) => bytes.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_object() {
        let value = CachedValue::decode(br#"{"title": "outline", "sections": [1, 2]}"#);

        assert_eq!(
            value,
            CachedValue::Json(json!({"title": "outline", "sections": [1, 2]}))
        );
    }

    #[test]
    fn test_decode_json_scalars() {
        assert_eq!(CachedValue::decode(b"42"), CachedValue::Json(json!(42)));
        assert_eq!(CachedValue::decode(b"true"), CachedValue::Json(json!(true)));
        assert_eq!(CachedValue::decode(b"null"), CachedValue::Json(json!(null)));
        assert_eq!(
            CachedValue::decode(br#""quoted""#),
            CachedValue::Json(json!("quoted"))
        );
    }

    #[test]
    fn test_decode_falls_back_to_text() {
        let value = CachedValue::decode(b"not json, just prose");

        assert_eq!(value, CachedValue::Text("not json, just prose".to_string()));
    }

    #[test]
    fn test_decode_falls_back_to_bytes() {
        let raw = vec![0xff, 0xfe, 0x00, 0x81];
        let value = CachedValue::decode(&raw);

        assert_eq!(value, CachedValue::Bytes(raw));
    }

    #[test]
    fn test_deserialize_typed() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Outline {
            title: String,
        }

        let value = CachedValue::decode(br#"{"title": "cache"}"#);
        let outline: Outline = value.deserialize().unwrap();

        assert_eq!(outline.title, "cache");
    }
}
