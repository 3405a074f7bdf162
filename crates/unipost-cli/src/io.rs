//! File I/O for the CLI: crawler dumps in, reject files out.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use unipost_model::CrawlMetadata;
use unipost_pipeline::RejectedRecord;

/// Read raw posts from a crawler dump.
///
/// Accepts either NDJSON (one post per line, blank lines skipped) or a
/// single JSON array, which is how most crawler exports arrive.
pub fn read_posts(path: &Path) -> Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read posts file {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        let posts: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("parse posts array {}", path.display()))?;
        return Ok(posts);
    }
    let mut posts = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let post: Value = serde_json::from_str(line)
            .with_context(|| format!("parse post on line {} of {}", number + 1, path.display()))?;
        posts.push(post);
    }
    Ok(posts)
}

/// Read the crawl metadata sidecar accompanying a dump.
pub fn read_metadata(path: &Path) -> Result<CrawlMetadata> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read crawl metadata {}", path.display()))?;
    let metadata = serde_json::from_str(&raw)
        .with_context(|| format!("parse crawl metadata {}", path.display()))?;
    Ok(metadata)
}

/// Write rejected posts as NDJSON, one object per reject carrying its batch
/// index, the draft as it stood, and the issues that condemned it.
pub fn write_rejects(path: &Path, rejects: &[RejectedRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create reject directory {}", parent.display()))?;
    }
    let mut buffer = String::new();
    for reject in rejects {
        let mut line = serde_json::Map::new();
        line.insert("index".to_string(), Value::from(reject.index));
        if let Value::Object(body) = reject.invalid.to_json() {
            line.extend(body);
        }
        buffer.push_str(&serde_json::to_string(&Value::Object(line))?);
        buffer.push('\n');
    }
    fs::write(path, buffer).with_context(|| format!("write reject file {}", path.display()))
}
