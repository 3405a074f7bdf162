#![deny(unsafe_code)]

use crate::definition::{SchemaDefinition, TableTarget};
use crate::registry::SchemaRegistry;
use std::path::PathBuf;
use unipost_model::{Platform, fields};

/// Machine-readable health report over a loaded registry, one entry per
/// platform. Emitted by `schema check --json`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaReport {
    pub schema: String,
    pub schema_version: u32,
    pub schema_dir: PathBuf,
    pub platforms: Vec<PlatformReport>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PlatformReport {
    pub platform: Platform,
    pub declared_version: String,
    pub fingerprint: String,
    pub table: TableTarget,
    pub counts: SchemaCounts,
    /// Expected fields that neither a mapping, a computed entry, nor the
    /// engine itself produces. These drag the quality score down for every
    /// record, so they are almost always config mistakes.
    pub unproduced_expected: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaCounts {
    pub mapped: usize,
    pub computed: usize,
    pub expected: usize,
}

impl SchemaReport {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        Self {
            schema: "unipost.schema-doctor".to_string(),
            schema_version: 1,
            schema_dir: registry.schema_dir().to_path_buf(),
            platforms: registry
                .definitions()
                .map(PlatformReport::from_definition)
                .collect(),
        }
    }
}

impl PlatformReport {
    fn from_definition(definition: &SchemaDefinition) -> Self {
        let unproduced_expected = definition
            .expected_fields
            .iter()
            .filter(|name| {
                definition.declaration(name).is_none() && !fields::ALL.contains(&name.as_str())
            })
            .cloned()
            .collect();
        Self {
            platform: definition.platform,
            declared_version: definition.schema_version.clone(),
            fingerprint: definition.fingerprint.clone(),
            table: definition.table.clone(),
            counts: SchemaCounts {
                mapped: definition.mapping_count(),
                computed: definition.computed.len(),
                expected: definition.expected_fields.len(),
            },
            unproduced_expected,
        }
    }
}
