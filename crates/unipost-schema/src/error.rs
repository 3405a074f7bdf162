#![deny(unsafe_code)]

use std::path::PathBuf;
use unipost_model::Platform;

/// Structural problems found while loading schema configs. All of these are
/// fatal for the offending platform's load; none are recoverable at runtime.
#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema directory does not exist: {path}")]
    MissingSchemaDir { path: PathBuf },

    #[error("unknown platform '{platform}' declared in {path}")]
    UnknownPlatform { path: PathBuf, platform: String },

    #[error("platform '{platform}' is declared by more than one schema file")]
    DuplicatePlatform { platform: Platform },

    #[error("duplicate target field '{field}' in {platform} schema")]
    DuplicateTargetField { platform: Platform, field: String },

    #[error("target field '{field}' in {platform} schema collides with an engine-injected core field")]
    ReservedTargetField { platform: Platform, field: String },

    #[error("unknown target type '{value}' for field '{field}' in {platform} schema")]
    UnknownTargetType {
        platform: Platform,
        field: String,
        value: String,
    },

    #[error("unknown preprocessing step '{step}' for field '{field}' in {platform} schema")]
    UnknownPreprocessStep {
        platform: Platform,
        field: String,
        step: String,
    },

    #[error("unknown compute function '{function}' for field '{field}' in {platform} schema")]
    UnknownComputeFunction {
        platform: Platform,
        field: String,
        function: String,
    },

    #[error("computed field '{field}' in {platform} schema depends on undeclared field '{dependency}'")]
    UnknownDependency {
        platform: Platform,
        field: String,
        dependency: String,
    },

    #[error("computed fields in {platform} schema form a dependency cycle: {fields}")]
    DependencyCycle { platform: Platform, fields: String },

    #[error("{platform} schema does not produce core field '{field}'")]
    MissingCoreField { platform: Platform, field: String },
}

impl SchemaLoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
