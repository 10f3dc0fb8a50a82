//! Load-time normalization
//!
//! The converter writes timestamps as the decimal strings it read from the
//! page's `data-time` attributes, and writes `null` for values it could not
//! find. Before decoding into typed records every `*_timestamp` key is
//! coerced to integer epoch milliseconds and `null` keys are dropped, so an
//! absent value stays absent instead of becoming zero.

use super::error::{RecordError, RecordResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// Coerce every `*_timestamp` field of a raw object to an integer in place
///
/// Other keys are left untouched. `null` values are removed.
pub fn normalize_timestamps(object: &mut Map<String, Value>) -> RecordResult<()> {
    object.retain(|_, value| !value.is_null());

    for (key, value) in object.iter_mut() {
        if !key.ends_with(TIMESTAMP_SUFFIX) {
            continue;
        }
        let millis = coerce_millis(key, value)?;
        *value = Value::from(millis);
    }

    Ok(())
}

fn coerce_millis(key: &str, value: &Value) -> RecordResult<i64> {
    let invalid = || RecordError::InvalidTimestamp {
        field: key.to_string(),
        value: value.to_string(),
    };

    match value {
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// Normalize one raw JSON object and decode it into a typed record
pub fn decode_record<T: DeserializeOwned>(value: Value) -> RecordResult<T> {
    let mut object = match value {
        Value::Object(map) => map,
        other => return Err(RecordError::NotAnObject(json_type_name(&other))),
    };
    normalize_timestamps(&mut object)?;
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Normalize and decode a JSON array of raw objects
pub fn decode_records<T: DeserializeOwned>(value: Value) -> RecordResult<Vec<T>> {
    match value {
        Value::Array(items) => items.into_iter().map(decode_record).collect(),
        other => Err(RecordError::NotAnObject(json_type_name(&other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PostEntry, Profile};
    use serde_json::json;

    fn as_object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_timestamps_to_integer() {
        let mut raw = as_object(json!({
            "join_timestamp": "1550691826355",
            "last_post_timestamp": "1556527466920",
            "post_timestamp": "1556072740741",
            "test_1": "500",
            "test_2": "text"
        }));

        normalize_timestamps(&mut raw).unwrap();

        assert_eq!(raw["join_timestamp"], json!(1550691826355_i64));
        assert_eq!(raw["last_post_timestamp"], json!(1556527466920_i64));
        assert_eq!(raw["post_timestamp"], json!(1556072740741_i64));
        // Non-timestamp keys are not coerced
        assert_eq!(raw["test_1"], json!("500"));
        assert_eq!(raw["test_2"], json!("text"));
    }

    #[test]
    fn test_null_fields_are_dropped() {
        let mut raw = as_object(json!({
            "username": "Matt_Cliffe",
            "join_timestamp": null,
            "full_name": null
        }));

        normalize_timestamps(&mut raw).unwrap();

        assert!(!raw.contains_key("join_timestamp"));
        assert!(!raw.contains_key("full_name"));
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn test_numeric_timestamps_pass_through() {
        let mut raw = as_object(json!({"post_timestamp": 1550859165213_i64}));
        normalize_timestamps(&mut raw).unwrap();
        assert_eq!(raw["post_timestamp"], json!(1550859165213_i64));
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut raw = as_object(json!({"join_timestamp": "last week"}));
        let err = normalize_timestamps(&mut raw).unwrap_err();
        assert!(matches!(err, RecordError::InvalidTimestamp { ref field, .. } if field == "join_timestamp"));

        let mut raw = as_object(json!({"post_timestamp": true}));
        assert!(normalize_timestamps(&mut raw).is_err());
    }

    #[test]
    fn test_decode_profile() {
        let profile: Profile = decode_record(json!({
            "username": "Matt_Cliffe",
            "full_name": "Matt Cliffe",
            "member_status": "Not Member",
            "join_timestamp": "1550691826355",
            "last_post_timestamp": null
        }))
        .unwrap();

        assert_eq!(profile.username, "Matt_Cliffe");
        assert_eq!(profile.member_status.as_deref(), Some("Not Member"));
        assert_eq!(profile.join_timestamp, Some(1550691826355));
        assert_eq!(profile.last_post_timestamp, None);
    }

    #[test]
    fn test_decode_post_history() {
        let posts: Vec<PostEntry> = decode_records(json!([
            {
                "username": "Matt_Cliffe",
                "topic": "Joining South London Makerspace",
                "category": "Admin",
                "post_timestamp": "1550859165213",
                "text": "Lorem ipsum"
            },
            {"username": "Matt_Cliffe", "topic": "Laser cutter", "post_timestamp": "1550859165999"}
        ]))
        .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].post_timestamp, Some(1550859165213));
        assert_eq!(posts[1].text, None);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        let err = decode_record::<Profile>(json!(["not", "a", "profile"])).unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject("array")));

        let err = decode_records::<PostEntry>(json!({"username": "x"})).unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject("object")));
    }
}
