//! Wire conventions shared by every payload.
//!
//! - Field names are snake_case in both directions. Rust field names already
//!   are, so DTOs derive serde without renames; the tests below pin the keys.
//! - Dates travel as ISO-8601 strings, written as `YYYY-MM-DDTHH:MM:SSZ`.
//! - Binary payloads travel as standard base64 strings.
//! - The login request is the one form-encoded body; see [`encode_form`].

use serde::{de::DeserializeOwned, Serialize};
use url::form_urlencoded;

use crate::api::ApiError;

/// Serialize a request body as JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value)
        .map_err(|e| ApiError::RequestConstruction(format!("Failed to encode body: {e}")))
}

/// Deserialize a JSON response body, reporting the path where matching failed.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|e| {
        let path = e.path().to_string();
        ApiError::Decode {
            path,
            message: e.into_inner().to_string(),
        }
    })?;
    de.end().map_err(|e| ApiError::Decode {
        path: ".".to_string(),
        message: e.to_string(),
    })?;
    Ok(value)
}

/// Encode `application/x-www-form-urlencoded` pairs, in order.
pub fn encode_form(pairs: &[(&str, &str)]) -> Vec<u8> {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .into_bytes()
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod iso8601 {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 date: {raw:?}")))
    }

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Accepts RFC 3339 with any offset, or a bare local timestamp taken as UTC.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Serde adapter for byte payloads carried as base64 strings.
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw.as_bytes()).map_err(de::Error::custom)
    }
}
