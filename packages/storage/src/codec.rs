// ABOUTME: Tag-and-restore date codec for the local fallback store
// ABOUTME: Encodes datetime values distinguishably from plain strings so loads restore true dates

use chrono::DateTime;
use serde_json::{json, Map, Value};

const TYPE_KEY: &str = "__ascentType";
const VALUE_KEY: &str = "value";
const DATETIME_TAG: &str = "datetime";

/// Recursively tags every RFC 3339 datetime string in `value` so it is
/// distinguishable from a plain string in the stored payload.
pub fn encode_dates(value: Value) -> Value {
    match value {
        Value::String(s) if is_datetime(&s) => json!({
            TYPE_KEY: DATETIME_TAG,
            VALUE_KEY: s,
        }),
        Value::Array(items) => Value::Array(items.into_iter().map(encode_dates).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, encode_dates(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Reverses [`encode_dates`]: tagged datetime objects become their RFC 3339
/// string form again, ready for typed deserialization.
pub fn decode_dates(value: Value) -> Value {
    match value {
        Value::Object(map) => match untag(&map) {
            Some(s) => Value::String(s),
            None => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, decode_dates(v)))
                    .collect(),
            ),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(decode_dates).collect()),
        other => other,
    }
}

fn untag(map: &Map<String, Value>) -> Option<String> {
    if map.len() != 2 {
        return None;
    }
    if map.get(TYPE_KEY)?.as_str()? != DATETIME_TAG {
        return None;
    }
    Some(map.get(VALUE_KEY)?.as_str()?.to_string())
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}
