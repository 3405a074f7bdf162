//! Ordered evaluation of a schema's computed fields.

use serde_json::Value;
use tracing::debug;
use unipost_model::{FieldIssue, FieldIssueKind, RecordDraft};
use unipost_schema::SchemaDefinition;

use crate::functions::evaluate;

/// Appends every computed field to the draft in dependency order.
///
/// The order was resolved at schema load, so this is a single pass.
/// Functions are isolated from each other: one that cannot produce a
/// value leaves an explicit null plus a warning and evaluation moves
/// on, mirroring how mapping treats per-field failures.
pub fn compute_fields(draft: &mut RecordDraft, schema: &SchemaDefinition) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for field in schema.computed_in_order() {
        match evaluate(field, schema, draft) {
            Ok(value) => draft.set(&field.target_field, value),
            Err(reason) => {
                draft.set(&field.target_field, Value::Null);
                issues.push(FieldIssue::warning(
                    &field.target_field,
                    FieldIssueKind::ComputedField,
                    reason,
                ));
            }
        }
    }
    debug!(
        platform = %draft.platform,
        computed = schema.computed.len(),
        issues = issues.len(),
        "computed fields evaluated"
    );
    issues
}
