#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::definition::SchemaDefinition;
use crate::error::SchemaLoadError;
use unipost_model::Platform;

/// What a successful load found, for logging and the doctor report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadSummary {
    pub schema_dir: PathBuf,
    pub platform_count: usize,
    pub mapping_count: usize,
    pub computed_count: usize,
}

/// Verified schemas for every platform found in a schema directory.
///
/// Loading is all-or-nothing: one broken config fails the whole directory,
/// so a registry in hand always means every schema in it passed
/// verification. Definitions are shared as `Arc`s; a transformation keeps
/// its schema alive even while a reload swaps the registry underneath.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<Platform, Arc<SchemaDefinition>>,
    schema_dir: PathBuf,
}

impl SchemaRegistry {
    /// Load and verify every `*.json` schema under `schema_dir`.
    pub fn load_dir(schema_dir: &Path) -> Result<(Self, LoadSummary), SchemaLoadError> {
        if !schema_dir.is_dir() {
            return Err(SchemaLoadError::MissingSchemaDir {
                path: schema_dir.to_path_buf(),
            });
        }

        let mut paths: BTreeSet<PathBuf> = BTreeSet::new();
        let entries =
            std::fs::read_dir(schema_dir).map_err(|e| SchemaLoadError::io(schema_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SchemaLoadError::io(schema_dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.insert(path);
            }
        }

        let mut schemas: BTreeMap<Platform, Arc<SchemaDefinition>> = BTreeMap::new();
        for path in &paths {
            let definition = load_schema_file(path)?;
            debug!(
                platform = %definition.platform,
                version = %definition.schema_version,
                mappings = definition.mapping_count(),
                computed = definition.computed.len(),
                "schema verified"
            );
            let platform = definition.platform;
            if schemas.insert(platform, Arc::new(definition)).is_some() {
                return Err(SchemaLoadError::DuplicatePlatform { platform });
            }
        }

        let summary = LoadSummary {
            schema_dir: schema_dir.to_path_buf(),
            platform_count: schemas.len(),
            mapping_count: schemas.values().map(|s| s.mapping_count()).sum(),
            computed_count: schemas.values().map(|s| s.computed.len()).sum(),
        };

        Ok((
            Self {
                schemas,
                schema_dir: schema_dir.to_path_buf(),
            },
            summary,
        ))
    }

    /// Schema for a platform, if this directory ships one.
    pub fn get(&self, platform: Platform) -> Option<Arc<SchemaDefinition>> {
        self.schemas.get(&platform).cloned()
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.schemas.keys().copied()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.schemas.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }
}

fn load_schema_file(path: &Path) -> Result<SchemaDefinition, SchemaLoadError> {
    let bytes = std::fs::read(path).map_err(|e| SchemaLoadError::io(path, e))?;
    SchemaDefinition::from_slice(&bytes, path)
}
