use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Length of the hyphenated UUID form
const HYPHENATED_UUID_LEN: usize = 36;

/// Epoch values above this are already milliseconds
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Parse an RFC3339 timestamp string, returning `None` when it is malformed
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim().parse::<DateTime<Utc>>().ok()
}

/// Timestamp of a JSON value if it is an RFC3339 string
pub fn timestamp_from_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value.and_then(Value::as_str).and_then(parse_timestamp)
}

/// Convert an epoch number that may be in seconds or milliseconds
pub fn epoch_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    let millis = if ts > MILLIS_THRESHOLD { ts } else { ts.saturating_mul(1000) };
    DateTime::from_timestamp_millis(millis)
}

/// Custom deserializer for epoch timestamps that accepts integers or floats,
/// in seconds or milliseconds. Anything else deserializes to `None`.
pub fn deserialize_epoch<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(epoch_to_datetime),
        _ => None,
    })
}

/// Accepts a string, treating any other JSON value as absent
pub fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Parse a UUID written in the hyphenated 8-4-4-4-12 form only
pub fn parse_hyphenated_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

/// UUID that rejects the simple, braced and URN spellings
pub fn deserialize_hyphenated_uuid<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hyphenated_uuid(&raw).ok_or_else(|| D::Error::custom(format!("not a hyphenated UUID: {raw}")))
}

/// Nullable variant of [`deserialize_hyphenated_uuid`]
pub fn deserialize_opt_hyphenated_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_hyphenated_uuid(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("not a hyphenated UUID: {raw}"))),
        None => Ok(None),
    }
}
