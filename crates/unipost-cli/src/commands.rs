use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, ensure};
use comfy_table::Table;
use tracing::{debug, info, info_span, warn};

use unipost_model::{Platform, fields};
use unipost_pipeline::{
    BatchResult, NdjsonSink, PipelineOptions, PlatformRouter, RowResult, TransformationPipeline,
};
use unipost_schema::{SchemaRegistry, SchemaReport, SharedSchemas};

use unipost_cli::config::{DEFAULT_SCHEMA_DIR, EngineConfig};
use unipost_cli::io::{read_metadata, read_posts, write_rejects};
use unipost_cli::logging::redact_content;

use crate::cli::ProcessArgs;
use crate::summary::apply_table_style;
use crate::types::{IssueRollup, ProcessOutcome};

pub fn run_process(args: &ProcessArgs) -> Result<ProcessOutcome> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let schema_dir = args.schema_dir.clone().unwrap_or(config.schema_dir);
    let output_dir = args.output_dir.clone().unwrap_or(config.output_dir);
    let concurrency = args.concurrency.unwrap_or(config.concurrency);
    ensure!(concurrency > 0, "concurrency must be at least 1");
    let deadline = args
        .deadline_secs
        .or(config.deadline_secs)
        .map(Duration::from_secs);

    let run_span = info_span!("process", platform = %args.platform);
    let _run_guard = run_span.enter();

    let posts = read_posts(&args.input)?;
    let metadata = read_metadata(&args.metadata)?;
    info!(
        posts = posts.len(),
        crawl_id = %metadata.crawl_id,
        snapshot_id = %metadata.snapshot_id,
        "crawler dump loaded"
    );

    let load_start = Instant::now();
    let (registry, load) = SchemaRegistry::load_dir(&schema_dir)?;
    info!(
        platforms = load.platform_count,
        mappings = load.mapping_count,
        computed = load.computed_count,
        duration_ms = load_start.elapsed().as_millis(),
        "schema registry loaded"
    );
    let shared = Arc::new(SharedSchemas::new(registry));
    let route = PlatformRouter::new(shared.load_full()).resolve(&args.platform)?;
    let platform = route.schema.platform;
    let table = route.table.name.clone();
    let schema_version = route.schema.schema_version.clone();

    let pipeline = TransformationPipeline::with_options(
        shared,
        PipelineOptions {
            concurrency,
            deadline,
        },
    );
    let runtime = tokio::runtime::Runtime::new().context("build async runtime")?;

    let sink = NdjsonSink::new(output_dir.clone());
    let mut errors = Vec::new();
    let (batch, output_file) = if args.dry_run {
        let batch =
            runtime.block_on(pipeline.transform_batch(posts, &metadata, &args.platform))?;
        (batch, None)
    } else {
        let insert = runtime.block_on(pipeline.transform_and_insert(
            posts,
            &metadata,
            &args.platform,
            &sink,
        ))?;
        for (row, transformed) in insert.rows.iter().zip(&insert.batch.valid) {
            if let RowResult::Failed { reason } = row {
                errors.push(format!(
                    "post {}: sink insert failed: {reason}",
                    transformed.index
                ));
            }
        }
        let output_file = (!insert.rows.is_empty()).then(|| sink.file_for(&route.table));
        (insert.batch, output_file)
    };

    for reject in &batch.invalid {
        debug!(
            index = reject.index,
            errors = reject.invalid.errors().count(),
            draft = %redact_content(&reject.invalid.draft.to_json().to_string()),
            "post rejected"
        );
    }
    let rejects_file = if batch.invalid.is_empty() || args.dry_run {
        None
    } else {
        let path = output_dir.join(format!("{platform}.rejects.ndjson"));
        write_rejects(&path, &batch.invalid)?;
        info!(path = %path.display(), rejects = batch.invalid.len(), "reject file written");
        Some(path)
    };

    if !batch.abandoned.is_empty() {
        warn!(
            abandoned = batch.abandoned.len(),
            "deadline expired before every post finished"
        );
        errors.push(format!(
            "{} posts abandoned at the deadline; rerun with a larger --deadline-secs",
            batch.abandoned.len()
        ));
    }
    if !args.no_fail_on_invalid && !batch.invalid.is_empty() {
        errors.push(format!(
            "{} posts failed validation. Use --no-fail-on-invalid to exit 0 anyway.",
            batch.invalid.len()
        ));
    }

    let issues = rollup_issues(&batch);
    let has_errors = !errors.is_empty();

    Ok(ProcessOutcome {
        platform,
        table,
        schema_version,
        output_file,
        rejects_file,
        total: batch.total(),
        valid: batch.valid.len(),
        invalid: batch.invalid.len(),
        abandoned: batch.abandoned.len(),
        warning_count: batch.warning_count(),
        issues,
        errors,
        has_errors,
    })
}

/// Aggregate per-record field issues by field, kind, and severity.
fn rollup_issues(batch: &BatchResult) -> Vec<IssueRollup> {
    let mut rollups: BTreeMap<(String, &'static str, bool), IssueRollup> = BTreeMap::new();
    let warnings = batch
        .valid
        .iter()
        .flat_map(|record| record.warnings.iter());
    let rejected = batch
        .invalid
        .iter()
        .flat_map(|record| record.invalid.issues.iter());
    for issue in warnings.chain(rejected) {
        let key = (issue.field.clone(), issue.kind.as_str(), issue.is_error());
        rollups
            .entry(key)
            .and_modify(|rollup| rollup.count += 1)
            .or_insert_with(|| IssueRollup {
                field: issue.field.clone(),
                kind: issue.kind,
                severity: issue.severity,
                count: 1,
                example: issue.message.clone(),
            });
    }
    rollups.into_values().collect()
}

pub fn run_schema_check(schema_dir: Option<&Path>, json: bool) -> Result<()> {
    let schema_dir = resolve_schema_dir(schema_dir);
    let (registry, load) = SchemaRegistry::load_dir(&schema_dir)?;
    let report = SchemaReport::from_registry(&registry);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Schema dir: {}", schema_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        "Platform",
        "Version",
        "Table",
        "Mappings",
        "Computed",
        "Expected",
        "Unproduced",
    ]);
    apply_table_style(&mut table);
    for platform in &report.platforms {
        table.add_row(vec![
            platform.platform.to_string(),
            platform.declared_version.clone(),
            platform.table.name.clone(),
            platform.counts.mapped.to_string(),
            platform.counts.computed.to_string(),
            platform.counts.expected.to_string(),
            if platform.unproduced_expected.is_empty() {
                "-".to_string()
            } else {
                platform.unproduced_expected.join(", ")
            },
        ]);
    }
    println!("{table}");
    info!(
        platforms = load.platform_count,
        mappings = load.mapping_count,
        "schema check passed"
    );
    Ok(())
}

pub fn run_schema_show(schema_dir: Option<&Path>, platform: &str) -> Result<()> {
    let schema_dir = resolve_schema_dir(schema_dir);
    let (registry, _) = SchemaRegistry::load_dir(&schema_dir)?;
    let parsed: Platform = platform.parse().map_err(anyhow::Error::msg)?;
    let definition = registry.get(parsed).ok_or_else(|| {
        anyhow!(
            "no schema config for {parsed} under {}",
            schema_dir.display()
        )
    })?;

    println!("Platform: {}", definition.platform);
    println!("Version: {}", definition.schema_version);
    println!("Fingerprint: {}", definition.fingerprint);
    println!(
        "Table: {} (partitioned by {}, clustered by {})",
        definition.table.name,
        definition.table.partition_field,
        definition.table.cluster_fields.join(", ")
    );
    let mut table = Table::new();
    table.set_header(vec!["Field", "Type", "Mode", "Origin", "Source"]);
    apply_table_style(&mut table);
    for mapping in definition.mappings() {
        table.add_row(vec![
            mapping.target_field.clone(),
            mapping.target_type.to_string(),
            mapping.mode().to_string(),
            "mapped".to_string(),
            mapping.source_field.clone(),
        ]);
    }
    for computed in definition.computed_in_order() {
        table.add_row(vec![
            computed.target_field.clone(),
            computed.target_type.to_string(),
            computed.mode().to_string(),
            "computed".to_string(),
            computed.dependencies.join(", "),
        ]);
    }
    for name in fields::RESERVED {
        let Some((target_type, mode)) = fields::injected_declaration(name) else {
            continue;
        };
        table.add_row(vec![
            name.to_string(),
            target_type.to_string(),
            mode.to_string(),
            "injected".to_string(),
            "-".to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_platforms(schema_dir: Option<&Path>) -> Result<()> {
    let schema_dir = resolve_schema_dir(schema_dir);
    let (registry, _) = SchemaRegistry::load_dir(&schema_dir)?;
    let mut table = Table::new();
    table.set_header(vec!["Platform", "Schema", "Version", "Table"]);
    apply_table_style(&mut table);
    for platform in Platform::ALL {
        match registry.get(platform) {
            Some(definition) => table.add_row(vec![
                platform.to_string(),
                "loaded".to_string(),
                definition.schema_version.clone(),
                definition.table.name.clone(),
            ]),
            None => table.add_row(vec![
                platform.to_string(),
                "missing".to_string(),
                "-".to_string(),
                platform.default_table(),
            ]),
        };
    }
    println!("{table}");
    Ok(())
}

fn resolve_schema_dir(flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| PathBuf::from(DEFAULT_SCHEMA_DIR), Path::to_path_buf)
}
