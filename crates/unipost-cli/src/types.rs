use std::path::PathBuf;

use unipost_model::{FieldIssueKind, IssueSeverity, Platform};

/// Everything a processing run produced, for the end-of-run summary and the
/// exit code.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub platform: Platform,
    pub table: String,
    pub schema_version: String,
    /// NDJSON output file, when records were written.
    pub output_file: Option<PathBuf>,
    /// Reject file, when any post failed validation.
    pub rejects_file: Option<PathBuf>,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub abandoned: usize,
    pub warning_count: usize,
    pub issues: Vec<IssueRollup>,
    pub errors: Vec<String>,
    pub has_errors: bool,
}

/// Field issues aggregated across a whole batch.
#[derive(Debug)]
pub struct IssueRollup {
    pub field: String,
    pub kind: FieldIssueKind,
    pub severity: IssueSeverity,
    pub count: usize,
    /// Message of the first occurrence.
    pub example: String,
}
