//! Implementations of the named compute functions.
//!
//! Each function reads previously produced draft fields (mapped,
//! injected, or earlier computed values) and returns either a value or
//! a reason it could not produce one. Reasons become warnings on the
//! record; they never abort evaluation.

use serde_json::Value;
use unipost_model::datetime::date_of_value;
use unipost_model::{ComputeFunction, RecordDraft};
use unipost_schema::{ComputedField, SchemaDefinition};

use crate::text;

/// Conventional numerator field for `engagement_rate`.
const TOTAL_ENGAGEMENT_FIELD: &str = "total_engagement";
/// Denominator candidates for `engagement_rate`, in priority order.
const VIEW_FIELDS: [&str; 3] = ["play_count", "view_count", "views_count"];
/// Inclusive tolerance around each aspect bucket's ratio.
const ASPECT_TOLERANCE: f64 = 0.05;

/// Evaluates one computed field against the draft.
pub fn evaluate(
    field: &ComputedField,
    schema: &SchemaDefinition,
    draft: &RecordDraft,
) -> Result<Value, String> {
    match field.function {
        ComputeFunction::TotalEngagement => Ok(total_engagement(field, draft)),
        ComputeFunction::EngagementRate => Ok(engagement_rate(draft)),
        ComputeFunction::AspectRatio => aspect_ratio(field, draft),
        ComputeFunction::TextLength => Ok(Value::from(text::text_length(draft))),
        ComputeFunction::TextLanguage => Ok(Value::from(text::text_language(draft))),
        ComputeFunction::TextSentiment => Ok(Value::from(text::text_sentiment(draft))),
        ComputeFunction::HashtagCount => Ok(Value::from(text::hashtag_count(draft))),
        ComputeFunction::MentionCount => Ok(Value::from(text::mention_count(draft))),
        ComputeFunction::ExtractHashtags => Ok(Value::from(text::extract_hashtags(draft))),
        ComputeFunction::GroupedDate => grouped_date(field, draft),
        ComputeFunction::DataQualityScore => data_quality_score(schema, draft),
    }
}

/// Sum of the declared dependencies, with absent ones counted as 0.
fn total_engagement(field: &ComputedField, draft: &RecordDraft) -> Value {
    let sum: i64 = field
        .dependencies
        .iter()
        .filter_map(|dep| int_of(draft.get(dep)?))
        .sum();
    Value::from(sum)
}

/// `total_engagement` divided by the first populated view count.
///
/// An absent, unparseable, or zero denominator yields 0.0 rather than
/// an error: posts legitimately report no views before the platform
/// refreshes its counters.
fn engagement_rate(draft: &RecordDraft) -> Value {
    let total = draft
        .get(TOTAL_ENGAGEMENT_FIELD)
        .and_then(int_of)
        .unwrap_or(0);
    let views = VIEW_FIELDS
        .iter()
        .find(|f| draft.is_populated(f))
        .and_then(|f| draft.get(f))
        .and_then(float_of)
        .unwrap_or(0.0);
    if views <= 0.0 {
        return Value::from(0.0);
    }
    Value::from(total as f64 / views)
}

/// Buckets width/height (the two declared dependencies, in that order)
/// into `9:16`, `16:9` or `1:1`; anything else keeps the literal
/// `{width}:{height}` so unusual formats stay distinguishable.
fn aspect_ratio(field: &ComputedField, draft: &RecordDraft) -> Result<Value, String> {
    let [width_field, height_field] = field.dependencies.as_slice() else {
        return Err(format!(
            "expected width and height dependencies, found {}",
            field.dependencies.len()
        ));
    };
    let width = dimension(draft, width_field)?;
    let height = dimension(draft, height_field)?;

    let ratio = width / height;
    let label = if (ratio - 9.0 / 16.0).abs() <= ASPECT_TOLERANCE {
        "9:16".to_string()
    } else if (ratio - 16.0 / 9.0).abs() <= ASPECT_TOLERANCE {
        "16:9".to_string()
    } else if (ratio - 1.0).abs() <= ASPECT_TOLERANCE {
        "1:1".to_string()
    } else {
        format!("{}:{}", dimension_label(width), dimension_label(height))
    };
    Ok(Value::from(label))
}

fn dimension(draft: &RecordDraft, field: &str) -> Result<f64, String> {
    let value = draft
        .get(field)
        .and_then(float_of)
        .ok_or_else(|| format!("dependency '{field}' has no numeric value"))?;
    if value <= 0.0 {
        return Err(format!("dependency '{field}' is not a positive dimension"));
    }
    Ok(value)
}

fn dimension_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Calendar date of the first dependency, `%Y-%m-%d`.
fn grouped_date(field: &ComputedField, draft: &RecordDraft) -> Result<Value, String> {
    let source = field
        .dependencies
        .first()
        .ok_or_else(|| "declares no source dependency".to_string())?;
    let value = draft
        .get(source)
        .ok_or_else(|| format!("dependency '{source}' is missing"))?;
    let date = date_of_value(value)
        .ok_or_else(|| format!("dependency '{source}' has no parseable date"))?;
    Ok(Value::from(date.format("%Y-%m-%d").to_string()))
}

/// Fraction of the schema's expected fields populated in the draft.
fn data_quality_score(schema: &SchemaDefinition, draft: &RecordDraft) -> Result<Value, String> {
    if schema.expected_fields.is_empty() {
        return Err("schema declares no expected fields".to_string());
    }
    let populated = schema
        .expected_fields
        .iter()
        .filter(|f| draft.is_populated(f))
        .count();
    let score = populated as f64 / schema.expected_fields.len() as f64;
    Ok(Value::from(score.clamp(0.0, 1.0)))
}

fn int_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
