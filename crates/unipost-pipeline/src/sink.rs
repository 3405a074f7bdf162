//! Destinations for validated records.
//!
//! The engine only produces records; where they land is behind
//! [`RecordSink`]. [`MemorySink`] backs tests and dry runs,
//! [`NdjsonSink`] writes line-delimited JSON for downstream loaders.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use unipost_model::NormalizedRecord;
use unipost_schema::TableTarget;

use crate::error::SinkError;

/// Per-row outcome of an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResult {
    Inserted,
    Failed { reason: String },
}

impl RowResult {
    pub fn is_inserted(&self) -> bool {
        matches!(self, RowResult::Inserted)
    }
}

/// Where validated records go, one batch at a time.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Insert a batch into the table, returning one result per record in
    /// input order.
    async fn insert_batch(
        &self,
        table: &TableTarget,
        records: &[NormalizedRecord],
    ) -> Result<Vec<RowResult>, SinkError>;
}

/// In-memory sink keyed by table name.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Mutex<BTreeMap<String, Vec<NormalizedRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows inserted into a table so far, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<NormalizedRecord> {
        self.tables
            .lock()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn total_rows(&self) -> usize {
        self.tables.lock().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert_batch(
        &self,
        table: &TableTarget,
        records: &[NormalizedRecord],
    ) -> Result<Vec<RowResult>, SinkError> {
        let mut tables = self.tables.lock().await;
        tables
            .entry(table.name.clone())
            .or_default()
            .extend_from_slice(records);
        Ok(vec![RowResult::Inserted; records.len()])
    }
}

/// Appends one JSON line per record to a file named after the table.
///
/// Files land under the sink's directory as `<table>.ndjson`; repeated
/// batches append.
#[derive(Debug, Clone)]
pub struct NdjsonSink {
    dir: PathBuf,
}

impl NdjsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_for(&self, table: &TableTarget) -> PathBuf {
        self.dir.join(format!("{}.ndjson", table.name))
    }
}

#[async_trait]
impl RecordSink for NdjsonSink {
    async fn insert_batch(
        &self,
        table: &TableTarget,
        records: &[NormalizedRecord],
    ) -> Result<Vec<RowResult>, SinkError> {
        let path = self.file_for(table);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError::io(&self.dir, e))?;

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(&record.to_json())?);
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SinkError::io(&path, e))?;
        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| SinkError::io(&path, e))?;
        file.flush().await.map_err(|e| SinkError::io(&path, e))?;

        debug!(path = %path.display(), rows = records.len(), "ndjson batch appended");
        Ok(vec![RowResult::Inserted; records.len()])
    }
}
