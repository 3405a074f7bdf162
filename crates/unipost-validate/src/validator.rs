//! Column-mode enforcement and record finalization.
//!
//! The validator sees the finished draft (mapped, computed, and
//! engine-injected fields) and decides the record's fate: every
//! declared column is coerced to its target type under its mode, and
//! one error anywhere turns the whole record into an `InvalidRecord`
//! that keeps the draft for inspection.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;
use unipost_model::{
    FieldIssue, FieldIssueKind, FieldMode, FieldValue, InvalidRecord, NormalizedRecord,
    RecordDraft, TargetType, fields, json_is_empty,
};
use unipost_schema::SchemaDefinition;

use crate::coerce::{coerce_repeated, coerce_scalar};

/// The two ways a record leaves the pipeline.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Valid {
        record: NormalizedRecord,
        warnings: Vec<FieldIssue>,
    },
    Invalid(InvalidRecord),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }
}

/// Validates the draft against every declaration it must satisfy.
///
/// `issues` carries what mapping and computation already reported;
/// outcomes are decided over the union of those and validation's own
/// findings. Injected core fields are checked first, then the schema's
/// declared fields.
pub fn validate(
    draft: RecordDraft,
    schema: &SchemaDefinition,
    mut issues: Vec<FieldIssue>,
) -> ValidationOutcome {
    let mut out: BTreeMap<String, FieldValue> = BTreeMap::new();

    for name in fields::RESERVED {
        if let Some((target_type, mode)) = fields::injected_declaration(name) {
            validate_field(name, &target_type, mode, &draft, &mut out, &mut issues);
        }
    }
    for name in schema.declared_fields() {
        if let Some((target_type, mode)) = schema.declaration(name) {
            validate_field(name, target_type, mode, &draft, &mut out, &mut issues);
        }
    }

    let invalid = issues.iter().any(FieldIssue::is_error);
    debug!(
        platform = %draft.platform,
        fields = out.len(),
        issues = issues.len(),
        valid = !invalid,
        "record validated"
    );
    if invalid {
        return ValidationOutcome::Invalid(InvalidRecord { draft, issues });
    }
    ValidationOutcome::Valid {
        record: NormalizedRecord {
            platform: draft.platform,
            fields: out,
        },
        warnings: issues,
    }
}

fn validate_field(
    name: &str,
    target_type: &TargetType,
    mode: FieldMode,
    draft: &RecordDraft,
    out: &mut BTreeMap<String, FieldValue>,
    issues: &mut Vec<FieldIssue>,
) {
    let value = draft.get(name).filter(|v| !json_is_empty(v));
    match mode {
        FieldMode::Repeated => {
            let element = target_type.element_type().unwrap_or(target_type);
            let (values, dropped) = match value {
                Some(v) => coerce_repeated(v, element),
                None => (Vec::new(), Vec::new()),
            };
            for reason in dropped {
                issues.push(FieldIssue::warning(name, FieldIssueKind::TypeCoercion, reason));
            }
            out.insert(name.to_string(), FieldValue::Array(values));
        }
        FieldMode::Required => match value {
            Some(v) => match coerce_scalar(v, target_type) {
                Ok(coerced) => {
                    out.insert(name.to_string(), coerced);
                }
                Err(reason) => {
                    issues.push(FieldIssue::error(
                        name,
                        FieldIssueKind::TypeCoercion,
                        format!("required field: {reason}"),
                    ));
                }
            },
            None => {
                // Mapping may already have reported this with the source path.
                if !issues.iter().any(|i| i.field == name && i.is_error()) {
                    issues.push(FieldIssue::error(
                        name,
                        FieldIssueKind::RequiredMissing,
                        "required field is missing",
                    ));
                }
            }
        },
        FieldMode::Nullable => match value {
            Some(v) => match coerce_scalar(v, target_type) {
                Ok(coerced) => {
                    out.insert(name.to_string(), coerced);
                }
                Err(reason) => {
                    issues.push(FieldIssue::warning(
                        name,
                        FieldIssueKind::TypeCoercion,
                        format!("{reason}; stored as null"),
                    ));
                    out.insert(name.to_string(), FieldValue::Null);
                }
            },
            None => {
                out.insert(name.to_string(), FieldValue::Null);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unipost_model::Platform;

    fn schema() -> SchemaDefinition {
        let doc = br#"{
            "platform": "instagram",
            "field_mappings": {
                "identity": {
                    "post_id": {
                        "source_field": "id",
                        "target_field": "id",
                        "target_type": "STRING",
                        "required": true
                    },
                    "created": {
                        "source_field": "timestamp",
                        "target_field": "date_posted",
                        "target_type": "TIMESTAMP",
                        "required": true
                    }
                },
                "content": {
                    "likes": {
                        "source_field": "likesCount",
                        "target_field": "like_count",
                        "target_type": "INT64"
                    },
                    "sidecar": {
                        "source_field": "childPosts",
                        "target_field": "child_posts",
                        "target_type": "JSON"
                    },
                    "images": {
                        "source_field": "images",
                        "target_field": "image_urls",
                        "target_type": "ARRAY<STRING>"
                    }
                }
            },
            "computed_fields": {
                "grouped_date": {
                    "target_field": "grouped_date",
                    "target_type": "DATE",
                    "dependencies": ["date_posted"]
                },
                "data_quality_score": {
                    "target_field": "data_quality_score",
                    "target_type": "FLOAT64"
                }
            },
            "expected_fields": ["id", "date_posted", "like_count"]
        }"#;
        SchemaDefinition::from_slice(doc, "instagram.json").unwrap()
    }

    fn complete_draft() -> RecordDraft {
        let mut draft = RecordDraft::new(Platform::Instagram);
        draft.set("crawl_id", json!("c-1"));
        draft.set("snapshot_id", json!("s-1"));
        draft.set("platform", json!("instagram"));
        draft.set("competitor", json!("acme"));
        draft.set("brand", json!("acme-main"));
        draft.set("category", json!("apparel"));
        draft.set("crawl_date", json!("2025-07-13"));
        draft.set("processed_date", json!("2025-07-13T09:00:00+00:00"));
        draft.set("schema_version", json!("2025.1"));
        draft.set("processing_version", json!("1.0.0"));
        draft.set("id", json!("p-77"));
        draft.set("date_posted", json!("2025-07-12T10:30:00+00:00"));
        draft.set("like_count", json!(41));
        draft.set("child_posts", json!({}));
        draft.set("image_urls", json!(["https://a.test/1.jpg"]));
        draft.set("grouped_date", json!("2025-07-12"));
        draft.set("data_quality_score", json!(1.0));
        draft
    }

    #[test]
    fn complete_draft_validates() {
        let outcome = validate(complete_draft(), &schema(), Vec::new());
        let ValidationOutcome::Valid { record, warnings } = outcome else {
            panic!("expected valid outcome");
        };
        assert!(warnings.is_empty());
        assert_eq!(record.get("id"), Some(&FieldValue::String("p-77".into())));
        assert_eq!(record.get("like_count"), Some(&FieldValue::Int(41)));
        // Every core field is present in the output.
        for name in fields::ALL {
            assert!(record.fields.contains_key(name), "{name} missing");
        }
    }

    #[test]
    fn empty_json_object_stays_a_canonical_string() {
        let outcome = validate(complete_draft(), &schema(), Vec::new());
        let ValidationOutcome::Valid { record, .. } = outcome else {
            panic!("expected valid outcome");
        };
        assert_eq!(
            record.get("child_posts"),
            Some(&FieldValue::Json("{}".to_string()))
        );
    }

    #[test]
    fn missing_required_field_invalidates() {
        let mut draft = complete_draft();
        draft.fields.remove("id");
        let outcome = validate(draft, &schema(), Vec::new());
        let ValidationOutcome::Invalid(invalid) = outcome else {
            panic!("expected invalid outcome");
        };
        assert!(invalid.errors().any(|i| i.field == "id"));
    }

    #[test]
    fn required_uncoercible_field_invalidates() {
        let mut draft = complete_draft();
        draft.set("date_posted", json!("whenever"));
        let ValidationOutcome::Invalid(invalid) = validate(draft, &schema(), Vec::new()) else {
            panic!("expected invalid outcome");
        };
        assert!(
            invalid
                .errors()
                .any(|i| i.field == "date_posted" && i.kind == FieldIssueKind::TypeCoercion)
        );
    }

    #[test]
    fn missing_injected_field_invalidates() {
        let mut draft = complete_draft();
        draft.fields.remove("crawl_id");
        let outcome = validate(draft, &schema(), Vec::new());
        assert!(!outcome.is_valid());
    }

    #[test]
    fn prior_error_is_not_duplicated() {
        let mut draft = complete_draft();
        draft.fields.remove("id");
        let prior = vec![FieldIssue::error(
            "id",
            FieldIssueKind::RequiredMissing,
            "no value at source path 'id'",
        )];
        let ValidationOutcome::Invalid(invalid) = validate(draft, &schema(), prior) else {
            panic!("expected invalid outcome");
        };
        assert_eq!(invalid.issues.iter().filter(|i| i.field == "id").count(), 1);
    }

    #[test]
    fn nullable_uncoercible_degrades_to_null_with_warning() {
        let mut draft = complete_draft();
        draft.set("like_count", json!("many"));
        let ValidationOutcome::Valid { record, warnings } =
            validate(draft, &schema(), Vec::new())
        else {
            panic!("expected valid outcome");
        };
        assert_eq!(record.get("like_count"), Some(&FieldValue::Null));
        assert!(warnings.iter().any(|i| i.field == "like_count"));
    }

    #[test]
    fn repeated_field_defaults_to_empty_and_drops_bad_elements() {
        let mut draft = complete_draft();
        draft.fields.remove("image_urls");
        let ValidationOutcome::Valid { record, .. } = validate(draft, &schema(), Vec::new())
        else {
            panic!("expected valid outcome");
        };
        assert_eq!(record.get("image_urls"), Some(&FieldValue::Array(Vec::new())));

        let mut draft = complete_draft();
        draft.set("image_urls", json!(["ok", {"not": "a string"}]));
        let ValidationOutcome::Valid { record, warnings } =
            validate(draft, &schema(), Vec::new())
        else {
            panic!("expected valid outcome");
        };
        assert_eq!(
            record.get("image_urls"),
            Some(&FieldValue::Array(vec![FieldValue::String("ok".into())]))
        );
        assert!(warnings.iter().any(|i| i.field == "image_urls"));
    }

    #[test]
    fn required_empty_string_counts_as_missing() {
        let mut draft = complete_draft();
        draft.set("id", json!(""));
        assert!(!validate(draft, &schema(), Vec::new()).is_valid());
    }

    #[test]
    fn output_timestamps_carry_an_explicit_offset() {
        let ValidationOutcome::Valid { record, .. } =
            validate(complete_draft(), &schema(), Vec::new())
        else {
            panic!("expected valid outcome");
        };
        let rendered = record.to_json();
        assert_eq!(rendered["date_posted"], json!("2025-07-12T10:30:00+00:00"));
        assert_eq!(rendered["grouped_date"], json!("2025-07-12"));
    }
}
