use crate::issue::FieldIssue;
use crate::platform::Platform;
use crate::value::{FieldValue, json_is_empty};
use serde_json::Value;
use std::collections::BTreeMap;

/// Working record between mapping and validation: loosely-typed JSON values
/// keyed by target field, in deterministic field order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub platform: Platform,
    pub fields: BTreeMap<String, Value>,
}

impl RecordDraft {
    pub fn new(platform: Platform) -> Self {
        RecordDraft {
            platform,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// A field is populated when it is present and non-empty (null, `""` and
    /// `[]` do not count).
    pub fn is_populated(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !json_is_empty(v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flat JSON object of the draft as it stands.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// A fully validated, strongly-typed flat record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub platform: Platform,
    pub fields: BTreeMap<String, FieldValue>,
}

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Flat JSON object in wire form (timestamps as RFC 3339 text, dates as
    /// `YYYY-MM-DD`, JSON payloads as canonical text).
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// A record that failed validation, carrying the draft as it stood and the
/// issues that condemned it.
#[derive(Debug, Clone)]
pub struct InvalidRecord {
    pub draft: RecordDraft,
    pub issues: Vec<FieldIssue>,
}

impl InvalidRecord {
    pub fn errors(&self) -> impl Iterator<Item = &FieldIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// Reject-file representation: the draft plus its issue list.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "platform": self.draft.platform,
            "record": self.draft.to_json(),
            "issues": self.issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::FieldIssueKind;
    use serde_json::json;

    #[test]
    fn draft_population_rules() {
        let mut draft = RecordDraft::new(Platform::Tiktok);
        draft.set("a", json!("x"));
        draft.set("b", json!(""));
        draft.set("c", json!(0));
        assert!(draft.is_populated("a"));
        assert!(!draft.is_populated("b"));
        assert!(draft.is_populated("c"));
        assert!(!draft.is_populated("missing"));
    }

    #[test]
    fn invalid_record_reject_shape() {
        let mut draft = RecordDraft::new(Platform::Instagram);
        draft.set("likes_count", json!("many"));
        let invalid = InvalidRecord {
            draft,
            issues: vec![FieldIssue::error(
                "id",
                FieldIssueKind::RequiredMissing,
                "no value extracted",
            )],
        };
        let out = invalid.to_json();
        assert_eq!(out["platform"], json!("instagram"));
        assert_eq!(out["record"]["likes_count"], json!("many"));
        assert_eq!(out["issues"][0]["field"], json!("id"));
        assert_eq!(invalid.errors().count(), 1);
    }
}
