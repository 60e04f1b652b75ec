use crate::contract::model_registry::FieldType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

pub struct JsonUtils;

impl JsonUtils {
    /// JSON type name of a value
    pub fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Structural type check; `null` never matches
    pub fn matches_type(value: &Value, field_type: FieldType) -> bool {
        match field_type {
            FieldType::Number => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::DateString => value.as_str().and_then(Self::parse_date).is_some(),
        }
    }

    /// Parse RFC 3339 timestamps, naive date-times (taken as UTC) and plain dates
    pub fn parse_date(input: &str) -> Option<DateTime<FixedOffset>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
            return Some(parsed);
        }
        let utc = FixedOffset::east_opt(0)?;
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(utc.from_utc_datetime(&naive));
        }
        let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(utc.from_utc_datetime(&midnight))
    }

    /// Compare a submitted value with its echo. Numbers compare numerically
    /// and dates compare as instants when both sides parse.
    pub fn echo_equals(expected: &Value, actual: &Value, field_type: Option<FieldType>) -> bool {
        match (expected, actual) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => a == b,
            },
            (Value::String(a), Value::String(b)) if field_type == Some(FieldType::DateString) => {
                match (Self::parse_date(a), Self::parse_date(b)) {
                    (Some(a), Some(b)) => a == b,
                    _ => a == b,
                }
            }
            _ => expected == actual,
        }
    }
}
