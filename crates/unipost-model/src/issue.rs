use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a field-level issue. Errors condemn the whole record; warnings
/// travel with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// What went wrong for a single target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIssueKind {
    /// A REQUIRED field had no usable value.
    RequiredMissing,
    /// Source-path extraction or preprocessing failed.
    Extraction,
    /// A value could not be coerced to its declared target type.
    TypeCoercion,
    /// A derivation function could not produce a value.
    ComputedField,
    /// A JSON-typed payload could not be serialized to canonical text.
    JsonSerialization,
}

impl FieldIssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldIssueKind::RequiredMissing => "required_missing",
            FieldIssueKind::Extraction => "extraction",
            FieldIssueKind::TypeCoercion => "type_coercion",
            FieldIssueKind::ComputedField => "computed_field",
            FieldIssueKind::JsonSerialization => "json_serialization",
        }
    }
}

impl fmt::Display for FieldIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A per-field problem recorded while transforming one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Target field name the issue applies to.
    pub field: String,
    pub kind: FieldIssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

impl FieldIssue {
    pub fn error(field: impl Into<String>, kind: FieldIssueKind, message: impl Into<String>) -> Self {
        FieldIssue {
            field: field.into(),
            kind,
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(
        field: impl Into<String>,
        kind: FieldIssueKind,
        message: impl Into<String>,
    ) -> Self {
        FieldIssue {
            field: field.into(),
            kind,
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.field, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_constructors() {
        let err = FieldIssue::error("id", FieldIssueKind::RequiredMissing, "no value");
        assert!(err.is_error());
        let warn = FieldIssue::warning("likes_count", FieldIssueKind::TypeCoercion, "bad number");
        assert!(!warn.is_error());
    }

    #[test]
    fn display_names_field_and_kind() {
        let issue = FieldIssue::warning("video_url", FieldIssueKind::Extraction, "path missing");
        assert_eq!(issue.to_string(), "video_url [extraction]: path missing");
    }
}
