//! Source-to-target field mapping.

use serde_json::Value;
use tracing::debug;
use unipost_model::{FieldIssue, FieldIssueKind, RecordDraft, json_is_empty};
use unipost_schema::{FieldMapping, SchemaDefinition};

use crate::path::extract;
use crate::preprocess::apply_all;

/// Result of mapping one raw payload.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub draft: RecordDraft,
    pub issues: Vec<FieldIssue>,
}

/// Maps a raw crawler payload onto the schema's target fields.
///
/// Mappings run in category order. A field that ends up without a value
/// falls back to its declared default; a required field with neither is
/// recorded as an error and mapping continues, so one pass surfaces
/// every problem in a payload instead of the first one.
pub fn map_record(raw: &Value, schema: &SchemaDefinition) -> MapOutcome {
    let mut draft = RecordDraft::new(schema.platform);
    let mut issues = Vec::new();

    for category in &schema.categories {
        for mapping in &category.mappings {
            map_field(raw, mapping, &mut draft, &mut issues);
        }
    }

    debug!(
        platform = %schema.platform,
        mapped = draft.len(),
        issues = issues.len(),
        "field mapping complete"
    );
    MapOutcome { draft, issues }
}

fn map_field(
    raw: &Value,
    mapping: &FieldMapping,
    draft: &mut RecordDraft,
    issues: &mut Vec<FieldIssue>,
) {
    let extracted = extract(raw, &mapping.source_field, &mapping.target_type);
    let value = match extracted {
        Some(v) if !json_is_empty(&v) => apply_all(&mapping.preprocessing, v),
        _ => Value::Null,
    };

    if json_is_empty(&value) {
        if let Some(default) = &mapping.default_value {
            draft.set(&mapping.target_field, default.clone());
        } else if mapping.required {
            issues.push(FieldIssue::error(
                &mapping.target_field,
                FieldIssueKind::RequiredMissing,
                format!("no value at source path '{}'", mapping.source_field),
            ));
        }
        return;
    }
    draft.set(&mapping.target_field, value);
}
