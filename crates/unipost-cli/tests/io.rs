//! Round-trips for crawler dumps, metadata sidecars, and reject files.

use serde_json::{Value, json};
use tempfile::TempDir;

use unipost_cli::io::{read_metadata, read_posts, write_rejects};
use unipost_model::{FieldIssue, FieldIssueKind, InvalidRecord, Platform, RecordDraft};
use unipost_pipeline::RejectedRecord;

#[test]
fn reads_ndjson_posts_and_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.ndjson");
    std::fs::write(&path, "{\"id\":\"a\"}\n\n{\"id\":\"b\"}\n").unwrap();
    let posts = read_posts(&path).unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"], json!("a"));
    assert_eq!(posts[1]["id"], json!("b"));
}

#[test]
fn reads_a_json_array_dump() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    std::fs::write(&path, r#"[{"id": "a"}, {"id": "b"}, {"id": "c"}]"#).unwrap();
    let posts = read_posts(&path).unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[2]["id"], json!("c"));
}

#[test]
fn bad_line_reports_its_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.ndjson");
    std::fs::write(&path, "{\"id\":\"a\"}\nnot json\n").unwrap();
    let error = read_posts(&path).unwrap_err();
    assert!(error.to_string().contains("line 2"), "{error}");
}

#[test]
fn missing_posts_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(read_posts(&dir.path().join("absent.ndjson")).is_err());
}

#[test]
fn reads_metadata_sidecar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meta.json");
    std::fs::write(
        &path,
        r#"{
            "crawl_id": "crawl-11",
            "snapshot_id": "snap-3",
            "competitor": "acme",
            "brand": "acme-drinks",
            "category": "beverages",
            "crawl_date": "2025-07-14"
        }"#,
    )
    .unwrap();
    let metadata = read_metadata(&path).unwrap();
    assert_eq!(metadata.crawl_id, "crawl-11");
    assert_eq!(metadata.brand, "acme-drinks");
    assert_eq!(metadata.crawl_date.to_string(), "2025-07-14");
}

#[test]
fn malformed_metadata_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meta.json");
    std::fs::write(&path, r#"{"crawl_id": "crawl-11"}"#).unwrap();
    assert!(read_metadata(&path).is_err());
}

#[test]
fn writes_one_reject_line_per_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rejects").join("tiktok.rejects.ndjson");

    let mut draft = RecordDraft::new(Platform::Tiktok);
    draft.set("likes_count", json!(12));
    let rejects = vec![
        RejectedRecord {
            index: 0,
            invalid: InvalidRecord {
                draft: draft.clone(),
                issues: vec![FieldIssue::error(
                    "id",
                    FieldIssueKind::RequiredMissing,
                    "no value extracted",
                )],
            },
        },
        RejectedRecord {
            index: 4,
            invalid: InvalidRecord {
                draft,
                issues: vec![FieldIssue::error(
                    "date_posted",
                    FieldIssueKind::TypeCoercion,
                    "unparseable timestamp",
                )],
            },
        },
    ];
    write_rejects(&path, &rejects).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["index"], json!(0));
    assert_eq!(first["platform"], json!("tiktok"));
    assert_eq!(first["record"]["likes_count"], json!(12));
    assert_eq!(first["issues"][0]["field"], json!("id"));
    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["index"], json!(4));
    assert_eq!(second["issues"][0]["kind"], json!("type_coercion"));
}
