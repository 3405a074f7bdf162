use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A typed value in a validated record.
///
/// Timestamps always carry an explicit offset; `Json` holds the canonical
/// JSON text of an arbitrary payload fragment, never a parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
    Date(NaiveDate),
    Json(String),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::String(_) => "string",
            FieldValue::Int(_) => "int64",
            FieldValue::Float(_) => "float64",
            FieldValue::Bool(_) => "bool",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Date(_) => "date",
            FieldValue::Json(_) => "json",
            FieldValue::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Empty means null, an empty string, or an empty array; everything else
    /// counts as populated (0 and false are real values).
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Output representation: timestamps as RFC 3339 text with explicit
    /// offset, dates as `YYYY-MM-DD`, JSON payloads as their canonical text.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            FieldValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            FieldValue::Json(text) => Value::String(text.clone()),
            FieldValue::Array(items) => {
                Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Emptiness for raw JSON values mirrors [`FieldValue::is_empty`]: null, `""`
/// and `[]` are empty, numeric zero and `false` are not.
pub fn json_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn emptiness_rules() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::String(String::new()).is_empty());
        assert!(FieldValue::Array(vec![]).is_empty());
        assert!(!FieldValue::Int(0).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());

        assert!(json_is_empty(&json!(null)));
        assert!(json_is_empty(&json!("")));
        assert!(json_is_empty(&json!([])));
        assert!(!json_is_empty(&json!(0)));
        assert!(!json_is_empty(&json!(false)));
        assert!(!json_is_empty(&json!({})));
    }

    #[test]
    fn timestamps_serialize_with_explicit_offset() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 12, 10, 30, 0).unwrap();
        let value = FieldValue::Timestamp(ts.fixed_offset());
        assert_eq!(value.to_json(), json!("2025-07-12T10:30:00+00:00"));
    }

    #[test]
    fn dates_serialize_as_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();
        assert_eq!(FieldValue::Date(date).to_json(), json!("2025-07-12"));
    }

    #[test]
    fn json_payload_stays_text() {
        let value = FieldValue::Json("{}".to_string());
        assert_eq!(value.to_json(), json!("{}"));
    }

    #[test]
    fn arrays_serialize_elementwise() {
        let value = FieldValue::Array(vec![
            FieldValue::String("a".to_string()),
            FieldValue::String("b".to_string()),
        ]);
        assert_eq!(value.to_json(), json!(["a", "b"]));
    }
}
