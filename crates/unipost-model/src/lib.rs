pub mod computed;
pub mod datetime;
pub mod fields;
pub mod issue;
pub mod metadata;
pub mod platform;
pub mod preprocessing;
pub mod record;
pub mod target;
pub mod value;

pub use computed::ComputeFunction;
pub use issue::{FieldIssue, FieldIssueKind, IssueSeverity};
pub use metadata::CrawlMetadata;
pub use platform::Platform;
pub use preprocessing::PreprocessStep;
pub use record::{InvalidRecord, NormalizedRecord, RecordDraft};
pub use target::{FieldMode, TargetType};
pub use value::{FieldValue, json_is_empty};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn record_serializes_flat() {
        let ts = Utc
            .with_ymd_and_hms(2025, 7, 12, 10, 30, 0)
            .unwrap()
            .fixed_offset();
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), FieldValue::String("post-1".to_string()));
        fields.insert("date_posted".to_string(), FieldValue::Timestamp(ts));
        fields.insert("likes_count".to_string(), FieldValue::Int(100));
        let record = NormalizedRecord {
            platform: Platform::Tiktok,
            fields,
        };
        let json = record.to_json();
        assert_eq!(json["id"], "post-1");
        assert_eq!(json["date_posted"], "2025-07-12T10:30:00+00:00");
        assert_eq!(json["likes_count"], 100);
    }
}
