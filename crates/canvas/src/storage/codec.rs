//! Attribute value codec.
//!
//! Converts between the dynamic [`Value`] type and DynamoDB attribute values,
//! and owns the wire timestamp format shared by item attributes and key
//! strings. Timestamps are formatted fixed-width so they sort correctly as
//! strings inside sort keys.

use std::collections::BTreeMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Duration, DurationRound, NaiveDateTime, Utc};

use clinical_canvas_core::clinical::Value;
use clinical_canvas_core::storage::{Result, StorageError};

/// Fixed-width wire format: millisecond precision, trailing `Z`.
pub const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats a timestamp for storage. Every timestamp written to the table,
/// including those embedded in sort keys, goes through here.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// The current time at the precision the wire format keeps, so values written
/// now read back equal.
pub fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now)
}

/// Parses a stored timestamp. Accepts the fixed-width wire format, any RFC
/// 3339 string, and naive timestamps, which are taken as UTC.
pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TS_FORMAT) {
        return Some(ts.and_utc());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Encodes a dynamic value as a DynamoDB attribute value.
///
/// Numbers must be finite; DynamoDB's `N` type has no NaN or infinity.
pub fn encode_value(value: &Value, entity_type: &'static str) -> Result<AttributeValue> {
    match value {
        Value::Null => Ok(AttributeValue::Null(true)),
        Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
        Value::String(s) => Ok(AttributeValue::S(s.clone())),
        Value::Timestamp(ts) => Ok(AttributeValue::S(format_ts(*ts))),
        Value::Number(n) => {
            if !n.is_finite() {
                return Err(StorageError::codec(
                    entity_type,
                    format!("non-finite number {n} cannot be stored"),
                ));
            }
            Ok(AttributeValue::N(n.to_string()))
        }
        Value::List(items) => {
            let encoded = items
                .iter()
                .map(|item| encode_value(item, entity_type))
                .collect::<Result<Vec<_>>>()?;
            Ok(AttributeValue::L(encoded))
        }
        Value::Map(map) => {
            let mut encoded = std::collections::HashMap::with_capacity(map.len());
            for (key, item) in map {
                encoded.insert(key.clone(), encode_value(item, entity_type)?);
            }
            Ok(AttributeValue::M(encoded))
        }
    }
}

/// Decodes a DynamoDB attribute value back into a dynamic value.
///
/// Strings that parse as timestamps come back as `Value::Timestamp`, so a
/// value written through [`encode_value`] decodes to what was stored.
pub fn decode_value(av: &AttributeValue, entity_type: &'static str) -> Result<Value> {
    match av {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::S(s) => match parse_ts(s) {
            Some(ts) => Ok(Value::Timestamp(ts)),
            None => Ok(Value::String(s.clone())),
        },
        AttributeValue::N(n) => n
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| StorageError::codec(entity_type, format!("unparseable number '{n}'"))),
        AttributeValue::L(items) => items
            .iter()
            .map(|item| decode_value(item, entity_type))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        AttributeValue::M(map) => {
            let mut decoded = BTreeMap::new();
            for (key, item) in map {
                decoded.insert(key.clone(), decode_value(item, entity_type)?);
            }
            Ok(Value::Map(decoded))
        }
        other => Err(StorageError::codec(
            entity_type,
            format!("unsupported attribute type {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_ts_is_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(format_ts(ts), "2026-03-01T09:05:07.000Z");

        let with_millis = ts + chrono::Duration::milliseconds(42);
        assert_eq!(format_ts(with_millis), "2026-03-01T09:05:07.042Z");
    }

    #[test]
    fn test_parse_ts_round_trips() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(parse_ts(&format_ts(ts)), Some(ts));
    }

    #[test]
    fn test_parse_ts_accepts_naive_as_utc() {
        let ts = parse_ts("2026-03-01T09:05:07").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap());
    }

    #[test]
    fn test_parse_ts_accepts_offset() {
        let ts = parse_ts("2026-03-01T10:05:07+01:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap());
    }

    #[test]
    fn test_parse_ts_rejects_garbage() {
        assert_eq!(parse_ts("not a time"), None);
        assert_eq!(parse_ts(""), None);
    }

    #[test]
    fn test_value_round_trip() {
        let mut map = BTreeMap::new();
        map.insert("dose_mg".to_string(), Value::Number(250.5));
        map.insert("stat".to_string(), Value::Bool(true));
        map.insert(
            "scheduled".to_string(),
            Value::Timestamp(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),
        );
        map.insert("route".to_string(), Value::String("IV".to_string()));
        map.insert("flags".to_string(), Value::List(vec![Value::Null]));
        let value = Value::Map(map);

        let encoded = encode_value(&value, "Task").unwrap();
        let decoded = decode_value(&encoded, "Task").unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_number_formatting_round_trips() {
        for n in [0.1, 1.0 / 3.0, 1e-7, 123456789.123456, -2.5] {
            let encoded = encode_value(&Value::Number(n), "Task").unwrap();
            let decoded = decode_value(&encoded, "Task").unwrap();
            assert_eq!(decoded.as_f64(), Some(n));
        }
    }

    #[test]
    fn test_non_finite_number_is_codec_error() {
        let err = encode_value(&Value::Number(f64::NAN), "Task").unwrap_err();
        assert!(matches!(err, StorageError::Codec { .. }));
    }

    #[test]
    fn test_binary_attribute_is_codec_error() {
        let av = AttributeValue::Ss(vec!["a".to_string()]);
        let err = decode_value(&av, "Task").unwrap_err();
        assert!(matches!(err, StorageError::Codec { .. }));
    }
}
