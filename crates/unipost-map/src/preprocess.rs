//! Preprocessing steps applied to extracted values.
//!
//! Every step is a total function over `serde_json::Value`: malformed
//! input degrades to `0`, `null`, or the input itself, never an error.
//! Crawler payloads are too inconsistent for per-value failures to be
//! actionable; the validator decides later whether a degraded value is
//! acceptable for the column mode.

use serde_json::Value;
use unipost_model::PreprocessStep;
use unipost_model::datetime::{canonical_timestamp, parse_timestamp_value};

/// Applies one preprocessing step to a value.
pub fn apply(step: PreprocessStep, value: &Value) -> Value {
    match step {
        PreprocessStep::SafeInt => safe_int(value),
        PreprocessStep::SafeFloat => safe_float(value),
        PreprocessStep::CleanText => clean_text(value),
        PreprocessStep::NormalizeTimestamp => normalize_timestamp(value),
        PreprocessStep::ParseUrl => parse_url(value),
        PreprocessStep::Lowercase => lowercase(value),
        PreprocessStep::Trim => trim(value),
    }
}

/// Applies a preprocessing chain in declaration order.
pub fn apply_all(steps: &[PreprocessStep], value: Value) -> Value {
    steps.iter().fold(value, |acc, step| apply(*step, &acc))
}

/// Best-effort i64 conversion.
///
/// Accepts JSON numbers (floats truncate), numeric strings, and the
/// `"1.2k"` / `"3M"` / `"1b"` suffixed counts crawlers emit for large
/// engagement numbers. Empty input becomes `null`; any other
/// unparseable input becomes `0`.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use unipost_map::preprocess::safe_int;
///
/// assert_eq!(safe_int(&json!("1.2k")), json!(1200));
/// assert_eq!(safe_int(&json!(12.9)), json!(12));
/// assert_eq!(safe_int(&json!("n/a")), json!(0));
/// assert_eq!(safe_int(&json!("")), Value::Null);
/// ```
pub fn safe_int(value: &Value) -> Value {
    match numeric_value(value) {
        Numeric::Missing => Value::Null,
        Numeric::Value(v) => Value::from(v as i64),
        Numeric::Unparseable => Value::from(0),
    }
}

/// Best-effort f64 conversion with the same policy as [`safe_int`].
pub fn safe_float(value: &Value) -> Value {
    match numeric_value(value) {
        Numeric::Missing => Value::Null,
        Numeric::Value(v) => Value::from(v),
        Numeric::Unparseable => Value::from(0.0),
    }
}

enum Numeric {
    Missing,
    Value(f64),
    Unparseable,
}

fn numeric_value(value: &Value) -> Numeric {
    match value {
        Value::Null => Numeric::Missing,
        Value::Number(n) => match n.as_f64() {
            Some(v) => Numeric::Value(v),
            None => Numeric::Unparseable,
        },
        Value::Bool(b) => Numeric::Value(f64::from(u8::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Numeric::Missing;
            }
            match parse_count(trimmed) {
                Some(v) => Numeric::Value(v),
                None => Numeric::Unparseable,
            }
        }
        Value::Array(_) | Value::Object(_) => Numeric::Unparseable,
    }
}

/// Parses a plain or k/m/b-suffixed count string as f64.
fn parse_count(raw: &str) -> Option<f64> {
    if let Ok(v) = raw.parse::<f64>() {
        return Some(v);
    }
    let (base, multiplier) = match raw.chars().last()? {
        'k' | 'K' => (&raw[..raw.len() - 1], 1_000.0),
        'm' | 'M' => (&raw[..raw.len() - 1], 1_000_000.0),
        'b' | 'B' => (&raw[..raw.len() - 1], 1_000_000_000.0),
        _ => return None,
    };
    base.trim().parse::<f64>().ok().map(|v| v * multiplier)
}

/// Cleans free-form post text.
///
/// Strips control characters, emoji and other symbol-plane codepoints,
/// normalizes curly quotes to their ASCII forms, and collapses
/// whitespace runs to single spaces. Non-string values pass through
/// unchanged.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use unipost_map::preprocess::clean_text;
///
/// assert_eq!(clean_text(&json!("new\u{201C}drop\u{201D}  out\tnow")), json!("new\"drop\" out now"));
/// assert_eq!(clean_text(&json!("launch \u{1F680} day")), json!("launch day"));
/// ```
pub fn clean_text(value: &Value) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };
    let mut cleaned = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' => cleaned.push('\''),
            '\u{201C}' | '\u{201D}' => cleaned.push('"'),
            _ if ch.is_control() || is_symbol_codepoint(ch) => cleaned.push(' '),
            _ => cleaned.push(ch),
        }
    }
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    Value::from(collapsed)
}

fn is_symbol_codepoint(ch: char) -> bool {
    matches!(u32::from(ch),
        0x1F000..=0x1FAFF   // pictographs, emoticons, extended symbols
        | 0x2600..=0x27BF   // misc symbols and dingbats
        | 0xFE00..=0xFE0F   // variation selectors
        | 0x200D            // zero-width joiner
        | 0x20E3            // combining enclosing keycap
    )
}

/// Parses any supported timestamp encoding and re-emits the canonical
/// RFC 3339 form with an explicit offset; unparseable input becomes
/// `null` so it reads as missing downstream.
pub fn normalize_timestamp(value: &Value) -> Value {
    match parse_timestamp_value(value) {
        Some(dt) => Value::from(canonical_timestamp(&dt)),
        None => Value::Null,
    }
}

/// Keeps only absolute http(s) URLs with a host, re-emitting the
/// normalized form; everything else becomes `null`.
pub fn parse_url(value: &Value) -> Value {
    let Value::String(s) = value else {
        return Value::Null;
    };
    match url::Url::parse(s.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Value::from(parsed.to_string())
        }
        _ => Value::Null,
    }
}

pub fn lowercase(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::from(s.to_lowercase()),
        other => other.clone(),
    }
}

pub fn trim(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::from(s.trim().to_string()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_int_parses_suffixed_counts() {
        assert_eq!(safe_int(&json!("1.2k")), json!(1200));
        assert_eq!(safe_int(&json!("3M")), json!(3_000_000));
        assert_eq!(safe_int(&json!("1.5B")), json!(1_500_000_000_i64));
        assert_eq!(safe_int(&json!("42")), json!(42));
    }

    #[test]
    fn safe_int_degrades_instead_of_failing() {
        assert_eq!(safe_int(&json!("n/a")), json!(0));
        assert_eq!(safe_int(&json!({"likes": 3})), json!(0));
        assert_eq!(safe_int(&json!("  ")), Value::Null);
        assert_eq!(safe_int(&Value::Null), Value::Null);
        assert_eq!(safe_int(&json!(true)), json!(1));
    }

    #[test]
    fn safe_float_keeps_fractions() {
        assert_eq!(safe_float(&json!("1.2k")), json!(1200.0));
        assert_eq!(safe_float(&json!("0.37")), json!(0.37));
        assert_eq!(safe_float(&json!("oops")), json!(0.0));
    }

    #[test]
    fn clean_text_strips_emoji_and_collapses_whitespace() {
        let cleaned = clean_text(&json!("Big\u{2019}un \u{1F525}\u{1F525}  sale\n\tnow"));
        assert_eq!(cleaned, json!("Big'un sale now"));
    }

    #[test]
    fn clean_text_passes_non_strings_through() {
        assert_eq!(clean_text(&json!(7)), json!(7));
    }

    #[test]
    fn normalize_timestamp_rewrites_zulu_to_offset() {
        let out = normalize_timestamp(&json!("2025-07-12T10:30:00Z"));
        assert_eq!(out, json!("2025-07-12T10:30:00+00:00"));
    }

    #[test]
    fn normalize_timestamp_nulls_unparseable_input() {
        assert_eq!(normalize_timestamp(&json!("not a date")), Value::Null);
    }

    #[test]
    fn parse_url_accepts_only_absolute_http() {
        assert_eq!(
            parse_url(&json!("https://example.com/p/1")),
            json!("https://example.com/p/1")
        );
        assert_eq!(parse_url(&json!("/p/1")), Value::Null);
        assert_eq!(parse_url(&json!("ftp://example.com/p")), Value::Null);
        assert_eq!(parse_url(&json!(13)), Value::Null);
    }

    #[test]
    fn chains_apply_in_order() {
        let steps = [PreprocessStep::CleanText, PreprocessStep::Lowercase];
        assert_eq!(
            apply_all(&steps, json!("HELLO\u{1F604} World")),
            json!("hello world")
        );
    }
}
