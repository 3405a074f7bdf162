//! Type coercion from draft JSON values to typed column values.

use serde_json::Value;
use unipost_model::datetime::{date_of_value, parse_timestamp_value};
use unipost_model::{FieldValue, TargetType};

/// Coerces one scalar value to its declared column type.
///
/// Null and emptiness are the caller's concern; this function only sees
/// values that are actually present.
pub fn coerce_scalar(value: &Value, target: &TargetType) -> Result<FieldValue, String> {
    match target {
        TargetType::String => coerce_string(value),
        TargetType::Int64 => coerce_int(value),
        TargetType::Float64 => coerce_float(value),
        TargetType::Bool => coerce_bool(value),
        TargetType::Timestamp => parse_timestamp_value(value)
            .map(FieldValue::Timestamp)
            .ok_or_else(|| format!("cannot read {} as TIMESTAMP", kind_of(value))),
        TargetType::Date => date_of_value(value)
            .map(FieldValue::Date)
            .ok_or_else(|| format!("cannot read {} as DATE", kind_of(value))),
        // Any value is representable as JSON text, including `{}`.
        TargetType::Json => Ok(FieldValue::Json(
            serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string()),
        )),
        TargetType::Array(_) => Err("array type in scalar position".to_string()),
    }
}

/// Coerces a value into a repeated column.
///
/// A bare scalar wraps into a one-element array. Elements that cannot
/// coerce are dropped, keeping the rest in order; each drop is reported
/// as a reason string for the caller to turn into a warning.
pub fn coerce_repeated(value: &Value, element: &TargetType) -> (Vec<FieldValue>, Vec<String>) {
    let mut values = Vec::new();
    let mut dropped = Vec::new();
    match value {
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                if item.is_null() {
                    dropped.push(format!("element {idx} dropped: null"));
                    continue;
                }
                match coerce_scalar(item, element) {
                    Ok(fv) => values.push(fv),
                    Err(reason) => dropped.push(format!("element {idx} dropped: {reason}")),
                }
            }
        }
        scalar => match coerce_scalar(scalar, element) {
            Ok(fv) => values.push(fv),
            Err(reason) => dropped.push(format!("scalar value dropped: {reason}")),
        },
    }
    (values, dropped)
}

fn coerce_string(value: &Value) -> Result<FieldValue, String> {
    match value {
        Value::String(s) => Ok(FieldValue::String(s.clone())),
        Value::Number(n) => Ok(FieldValue::String(n.to_string())),
        Value::Bool(b) => Ok(FieldValue::String(b.to_string())),
        other => Err(format!("cannot read {} as STRING", kind_of(other))),
    }
}

fn coerce_int(value: &Value) -> Result<FieldValue, String> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(FieldValue::Int(v));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(FieldValue::Int(f as i64)),
                _ => Err(format!("{n} has a fractional part")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("cannot read {} as INT64", kind_of(other))),
    }
}

fn coerce_float(value: &Value) -> Result<FieldValue, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| format!("{n} does not fit FLOAT64")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| format!("'{s}' is not a number")),
        other => Err(format!("cannot read {} as FLOAT64", kind_of(other))),
    }
}

fn coerce_bool(value: &Value) -> Result<FieldValue, String> {
    match value {
        Value::Bool(b) => Ok(FieldValue::Bool(*b)),
        Value::String(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(FieldValue::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(FieldValue::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("cannot read {} as BOOL", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_accepts_integral_forms_only() {
        assert_eq!(
            coerce_scalar(&json!(42), &TargetType::Int64).unwrap(),
            FieldValue::Int(42)
        );
        assert_eq!(
            coerce_scalar(&json!(42.0), &TargetType::Int64).unwrap(),
            FieldValue::Int(42)
        );
        assert_eq!(
            coerce_scalar(&json!(" 7 "), &TargetType::Int64).unwrap(),
            FieldValue::Int(7)
        );
        assert!(coerce_scalar(&json!(42.5), &TargetType::Int64).is_err());
        assert!(coerce_scalar(&json!("x"), &TargetType::Int64).is_err());
    }

    #[test]
    fn string_renders_scalars() {
        assert_eq!(
            coerce_scalar(&json!(12), &TargetType::String).unwrap(),
            FieldValue::String("12".to_string())
        );
        assert!(coerce_scalar(&json!({"a": 1}), &TargetType::String).is_err());
    }

    #[test]
    fn json_serializes_anything() {
        assert_eq!(
            coerce_scalar(&json!({}), &TargetType::Json).unwrap(),
            FieldValue::Json("{}".to_string())
        );
        assert_eq!(
            coerce_scalar(&json!({"a": [1, 2]}), &TargetType::Json).unwrap(),
            FieldValue::Json(r#"{"a":[1,2]}"#.to_string())
        );
    }

    #[test]
    fn timestamp_and_date_parse() {
        let ts = coerce_scalar(&json!("2025-07-12T10:30:00Z"), &TargetType::Timestamp).unwrap();
        assert_eq!(ts.to_json(), json!("2025-07-12T10:30:00+00:00"));
        let date = coerce_scalar(&json!("2025-07-12"), &TargetType::Date).unwrap();
        assert_eq!(date.to_json(), json!("2025-07-12"));
    }

    #[test]
    fn repeated_drops_bad_elements_in_order() {
        let element = TargetType::Int64;
        let (values, dropped) = coerce_repeated(&json!(["1", "x", 2, null]), &element);
        assert_eq!(values, [FieldValue::Int(1), FieldValue::Int(2)]);
        assert_eq!(dropped.len(), 2);
        assert!(dropped[0].contains("element 1"));
        assert!(dropped[1].contains("element 3"));
    }

    #[test]
    fn repeated_wraps_scalars() {
        let (values, dropped) = coerce_repeated(&json!(5), &TargetType::Int64);
        assert_eq!(values, [FieldValue::Int(5)]);
        assert!(dropped.is_empty());
    }
}
