//! One post in, one verdict out; batches run the same path in parallel.
//!
//! A batch resolves its schema once and every post in it transforms
//! against that snapshot, so a concurrent schema reload never mixes
//! versions within a batch. The per-post path is strictly sequential:
//! mapping, metadata injection, computed fields, validation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use unipost_compute::compute_fields;
use unipost_map::{MapOutcome, map_record};
use unipost_model::datetime::canonical_timestamp;
use unipost_model::{
    CrawlMetadata, FieldIssue, InvalidRecord, NormalizedRecord, Platform, RecordDraft, fields,
};
use unipost_schema::{SchemaDefinition, SharedSchemas};
use unipost_validate::{ValidationOutcome, validate};

use crate::error::PipelineError;
use crate::router::{PlatformRouter, RouteTarget};
use crate::sink::{RecordSink, RowResult};

/// Engine version stamped into every record's `processing_version`.
pub const PROCESSING_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Batch concurrency when the caller does not set one.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Tunables for batch transformation.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum posts transformed at once within a batch.
    pub concurrency: usize,
    /// Wall-clock budget for a whole batch. Posts not finished by the
    /// deadline are reported as abandoned, never silently dropped.
    pub deadline: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }
}

/// One successfully transformed post, tagged with its batch position.
#[derive(Debug, Clone)]
pub struct TransformedRecord {
    pub index: usize,
    pub record: NormalizedRecord,
    pub warnings: Vec<FieldIssue>,
}

/// One rejected post, tagged with its batch position.
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    pub index: usize,
    pub invalid: InvalidRecord,
}

/// Outcome of one batch. Every input index lands in exactly one of the
/// three buckets.
#[derive(Debug)]
pub struct BatchResult {
    pub platform: Platform,
    pub valid: Vec<TransformedRecord>,
    pub invalid: Vec<RejectedRecord>,
    /// Input indices still unfinished when the deadline expired.
    pub abandoned: Vec<usize>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len() + self.abandoned.len()
    }

    pub fn warning_count(&self) -> usize {
        self.valid.iter().map(|record| record.warnings.len()).sum()
    }
}

/// Batch outcome after sink insertion.
#[derive(Debug)]
pub struct InsertResult {
    pub batch: BatchResult,
    /// Per-row sink results for the valid records, in batch index order.
    pub rows: Vec<RowResult>,
}

/// Schema-driven transformation over the currently loaded registry.
///
/// The pipeline holds the shared registry handle, not a registry: each
/// call takes a fresh snapshot, so reloads apply between calls and never
/// during one.
pub struct TransformationPipeline {
    schemas: Arc<SharedSchemas>,
    options: PipelineOptions,
}

impl TransformationPipeline {
    pub fn new(schemas: Arc<SharedSchemas>) -> Self {
        Self::with_options(schemas, PipelineOptions::default())
    }

    pub fn with_options(schemas: Arc<SharedSchemas>, options: PipelineOptions) -> Self {
        Self { schemas, options }
    }

    /// Transform one raw post.
    pub fn transform(
        &self,
        raw: &Value,
        metadata: &CrawlMetadata,
        platform: &str,
    ) -> Result<ValidationOutcome, PipelineError> {
        let route = self.route(platform)?;
        let processed_at = canonical_timestamp(&Utc::now().fixed_offset());
        Ok(transform_post(raw, metadata, &route.schema, &processed_at))
    }

    /// Transform a batch of raw posts with bounded parallelism.
    pub async fn transform_batch(
        &self,
        posts: Vec<Value>,
        metadata: &CrawlMetadata,
        platform: &str,
    ) -> Result<BatchResult, PipelineError> {
        let route = self.route(platform)?;
        self.run_batch(posts, metadata, &route).await
    }

    /// Transform a batch and insert the valid records into `sink`.
    ///
    /// Rejected and abandoned posts never reach the sink.
    pub async fn transform_and_insert(
        &self,
        posts: Vec<Value>,
        metadata: &CrawlMetadata,
        platform: &str,
        sink: &dyn RecordSink,
    ) -> Result<InsertResult, PipelineError> {
        let route = self.route(platform)?;
        let batch = self.run_batch(posts, metadata, &route).await?;
        let records: Vec<NormalizedRecord> = batch
            .valid
            .iter()
            .map(|transformed| transformed.record.clone())
            .collect();
        let rows = if records.is_empty() {
            Vec::new()
        } else {
            sink.insert_batch(&route.table, &records).await?
        };
        info!(
            platform = %batch.platform,
            table = %route.table.name,
            rows = rows.len(),
            "valid records handed to sink"
        );
        Ok(InsertResult { batch, rows })
    }

    fn route(&self, platform: &str) -> Result<RouteTarget, PipelineError> {
        PlatformRouter::new(self.schemas.load_full()).resolve(platform)
    }

    async fn run_batch(
        &self,
        posts: Vec<Value>,
        metadata: &CrawlMetadata,
        route: &RouteTarget,
    ) -> Result<BatchResult, PipelineError> {
        let start = Instant::now();
        let total = posts.len();
        let concurrency = self.options.concurrency.max(1);
        let deadline = self
            .options
            .deadline
            .map(|budget| tokio::time::Instant::now() + budget);

        // One stamp per batch: every record in it shares processed_date.
        let processed_at = canonical_timestamp(&Utc::now().fixed_offset());
        let metadata = Arc::new(metadata.clone());
        let schema = Arc::clone(&route.schema);

        let mut pending: BTreeSet<usize> = (0..total).collect();
        let mut result = BatchResult {
            platform: schema.platform,
            valid: Vec::new(),
            invalid: Vec::new(),
            abandoned: Vec::new(),
        };

        let mut outcomes = stream::iter(posts.into_iter().enumerate())
            .map(|(index, raw)| {
                let schema = Arc::clone(&schema);
                let metadata = Arc::clone(&metadata);
                let stamp = processed_at.clone();
                async move {
                    let joined = tokio::task::spawn_blocking(move || {
                        transform_post(&raw, &metadata, &schema, &stamp)
                    })
                    .await;
                    (index, joined)
                }
            })
            .buffer_unordered(concurrency);

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, outcomes.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        warn!(
                            platform = %schema.platform,
                            unfinished = pending.len(),
                            "batch deadline expired, abandoning unfinished posts"
                        );
                        break;
                    }
                },
                None => outcomes.next().await,
            };
            let Some((index, joined)) = next else {
                break;
            };
            pending.remove(&index);
            let outcome = joined.map_err(|e| PipelineError::Worker {
                reason: e.to_string(),
            })?;
            match outcome {
                ValidationOutcome::Valid { record, warnings } => {
                    result.valid.push(TransformedRecord {
                        index,
                        record,
                        warnings,
                    });
                }
                ValidationOutcome::Invalid(invalid) => {
                    result.invalid.push(RejectedRecord { index, invalid });
                }
            }
        }
        drop(outcomes);

        result.abandoned = pending.into_iter().collect();
        result.valid.sort_by_key(|record| record.index);
        result.invalid.sort_by_key(|record| record.index);

        info!(
            platform = %schema.platform,
            total,
            valid = result.valid.len(),
            invalid = result.invalid.len(),
            abandoned = result.abandoned.len(),
            warnings = result.warning_count(),
            duration_ms = start.elapsed().as_millis(),
            "batch transformed"
        );
        Ok(result)
    }
}

/// Sequential transformation of one post against a resolved schema.
///
/// `processed_at` is the canonical timestamp to stamp as
/// `processed_date`; batches pass one shared stamp.
pub fn transform_post(
    raw: &Value,
    metadata: &CrawlMetadata,
    schema: &SchemaDefinition,
    processed_at: &str,
) -> ValidationOutcome {
    let MapOutcome {
        mut draft,
        mut issues,
    } = map_record(raw, schema);
    inject_metadata(&mut draft, metadata, schema, processed_at);
    issues.extend(compute_fields(&mut draft, schema));
    let outcome = validate(draft, schema, issues);
    debug!(
        platform = %schema.platform,
        valid = outcome.is_valid(),
        "post transformed"
    );
    outcome
}

/// Stamp the engine-injected core fields. Schemas cannot map or compute
/// into these names, so the writes never collide with payload data.
fn inject_metadata(
    draft: &mut RecordDraft,
    metadata: &CrawlMetadata,
    schema: &SchemaDefinition,
    processed_at: &str,
) {
    draft.set(fields::CRAWL_ID, Value::from(metadata.crawl_id.as_str()));
    draft.set(
        fields::SNAPSHOT_ID,
        Value::from(metadata.snapshot_id.as_str()),
    );
    draft.set(fields::PLATFORM, Value::from(schema.platform.as_str()));
    draft.set(fields::COMPETITOR, Value::from(metadata.competitor.as_str()));
    draft.set(fields::BRAND, Value::from(metadata.brand.as_str()));
    draft.set(fields::CATEGORY, Value::from(metadata.category.as_str()));
    draft.set(
        fields::CRAWL_DATE,
        Value::from(metadata.crawl_date.to_string()),
    );
    draft.set(fields::PROCESSED_DATE, Value::from(processed_at));
    draft.set(
        fields::SCHEMA_VERSION,
        Value::from(schema.schema_version.as_str()),
    );
    draft.set(fields::PROCESSING_VERSION, Value::from(PROCESSING_VERSION));
}
