#![deny(unsafe_code)]

//! Verified, in-memory form of a platform schema.
//!
//! `SchemaDefinition::build` is where every static guarantee is enforced:
//! unique target fields, no reserved-name collisions, recognized types,
//! steps and functions, resolvable dependencies, and an acyclic computed
//! graph. Downstream stages assume all of it and never re-check.

use crate::config::{ComputedDoc, FieldMappingDoc, SchemaDoc, TableDoc};
use crate::error::SchemaLoadError;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use unipost_model::{ComputeFunction, FieldMode, Platform, PreprocessStep, TargetType, fields};

/// Destination table for a platform's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableTarget {
    pub name: String,
    pub partition_field: String,
    pub cluster_fields: Vec<String>,
}

impl TableTarget {
    fn from_doc(platform: Platform, doc: Option<TableDoc>) -> Self {
        let doc = doc.unwrap_or(TableDoc {
            name: None,
            partition_field: None,
            cluster_fields: None,
        });
        TableTarget {
            name: doc.name.unwrap_or_else(|| platform.default_table()),
            partition_field: doc
                .partition_field
                .unwrap_or_else(|| fields::DATE_POSTED.to_string()),
            cluster_fields: doc.cluster_fields.unwrap_or_else(|| {
                vec![fields::BRAND.to_string(), fields::COMPETITOR.to_string()]
            }),
        }
    }
}

/// One verified field mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Dot path into the raw payload.
    pub source_field: String,
    pub target_field: String,
    pub target_type: TargetType,
    pub required: bool,
    pub preprocessing: Vec<PreprocessStep>,
    /// Used verbatim when the source value is absent or empty.
    pub default_value: Option<Value>,
}

impl FieldMapping {
    pub fn mode(&self) -> FieldMode {
        FieldMode::derive(&self.target_type, self.required)
    }
}

/// A named group of mappings, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingCategory {
    pub name: String,
    pub mappings: Vec<FieldMapping>,
}

/// One verified computed field.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedField {
    pub target_field: String,
    pub target_type: TargetType,
    pub dependencies: Vec<String>,
    pub function: ComputeFunction,
}

impl ComputedField {
    pub fn mode(&self) -> FieldMode {
        FieldMode::derive(&self.target_type, false)
    }
}

/// A platform schema after verification.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    pub platform: Platform,
    /// Declared config version, or a fingerprint prefix when undeclared.
    pub schema_version: String,
    /// Hex sha256 of the config file's bytes.
    pub fingerprint: String,
    pub categories: Vec<MappingCategory>,
    pub computed: Vec<ComputedField>,
    /// Indices into `computed`, topologically sorted with declaration-order
    /// tie-breaks. Resolved once at load; evaluation never re-sorts.
    pub evaluation_order: Vec<usize>,
    /// Field set the data-quality score counts against.
    pub expected_fields: Vec<String>,
    pub table: TableTarget,
    declarations: BTreeMap<String, (TargetType, FieldMode)>,
}

impl SchemaDefinition {
    /// Builds and verifies a definition from raw config bytes.
    ///
    /// `origin` labels the source in errors; the registry passes the
    /// file path, tests typically pass a bare name.
    pub fn from_slice(bytes: &[u8], origin: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let origin = origin.as_ref();
        let doc: SchemaDoc =
            serde_json::from_slice(bytes).map_err(|e| SchemaLoadError::Parse {
                path: origin.to_path_buf(),
                source: e,
            })?;
        SchemaDefinition::build(doc, origin, crate::hash::sha256_hex(bytes))
    }

    pub(crate) fn build(
        doc: SchemaDoc,
        path: &Path,
        fingerprint: String,
    ) -> Result<Self, SchemaLoadError> {
        let platform: Platform =
            doc.platform
                .parse()
                .map_err(|_| SchemaLoadError::UnknownPlatform {
                    path: path.to_path_buf(),
                    platform: doc.platform.clone(),
                })?;

        let mut targets: BTreeSet<String> = BTreeSet::new();
        let mut declarations: BTreeMap<String, (TargetType, FieldMode)> = BTreeMap::new();

        let mut categories = Vec::with_capacity(doc.field_mappings.len());
        for (category_name, entries) in doc.field_mappings.0 {
            let mut mappings = Vec::with_capacity(entries.len());
            for (entry_name, mapping_doc) in entries.0 {
                let mapping = build_mapping(platform, &entry_name, mapping_doc)?;
                register_target(
                    platform,
                    &mapping.target_field,
                    &mapping.target_type,
                    mapping.mode(),
                    &mut targets,
                    &mut declarations,
                )?;
                mappings.push(mapping);
            }
            categories.push(MappingCategory {
                name: category_name,
                mappings,
            });
        }

        let mut computed = Vec::with_capacity(doc.computed_fields.len());
        for (entry_name, computed_doc) in doc.computed_fields.0 {
            let field = build_computed(platform, &entry_name, computed_doc)?;
            register_target(
                platform,
                &field.target_field,
                &field.target_type,
                field.mode(),
                &mut targets,
                &mut declarations,
            )?;
            computed.push(field);
        }

        // Dependencies resolve against everything populated before the
        // computed stage runs: mapped targets, other computed targets, and
        // the engine-injected core fields.
        for field in &computed {
            for dependency in &field.dependencies {
                if !targets.contains(dependency.as_str()) && !fields::is_reserved(dependency) {
                    return Err(SchemaLoadError::UnknownDependency {
                        platform,
                        field: field.target_field.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        let evaluation_order =
            evaluation_order(&computed).map_err(|cycle| SchemaLoadError::DependencyCycle {
                platform,
                fields: cycle.join(", "),
            })?;

        for name in fields::SCHEMA_OBLIGATIONS {
            if !targets.contains(name) {
                return Err(SchemaLoadError::MissingCoreField {
                    platform,
                    field: name.to_string(),
                });
            }
        }

        let schema_version = doc
            .schema_version
            .unwrap_or_else(|| format!("sha256:{}", &fingerprint[..12]));
        let table = TableTarget::from_doc(platform, doc.table);

        Ok(SchemaDefinition {
            platform,
            schema_version,
            fingerprint,
            categories,
            computed,
            evaluation_order,
            expected_fields: doc.expected_fields,
            table,
            declarations,
        })
    }

    /// All mappings, flattened in category declaration order.
    pub fn mappings(&self) -> impl Iterator<Item = &FieldMapping> {
        self.categories
            .iter()
            .flat_map(|category| category.mappings.iter())
    }

    pub fn mapping_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.mappings.len())
            .sum()
    }

    /// Computed fields in evaluation order.
    pub fn computed_in_order(&self) -> impl Iterator<Item = &ComputedField> {
        self.evaluation_order.iter().map(|&i| &self.computed[i])
    }

    /// Declared type and mode of a schema-produced target field.
    pub fn declaration(&self, field: &str) -> Option<(&TargetType, FieldMode)> {
        self.declarations
            .get(field)
            .map(|(target_type, mode)| (target_type, *mode))
    }

    /// Schema-produced target fields in deterministic (sorted) order.
    pub fn declared_fields(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }
}

fn build_mapping(
    platform: Platform,
    name: &str,
    doc: FieldMappingDoc,
) -> Result<FieldMapping, SchemaLoadError> {
    let target_type =
        TargetType::parse(&doc.target_type).map_err(|_| SchemaLoadError::UnknownTargetType {
            platform,
            field: name.to_string(),
            value: doc.target_type.clone(),
        })?;
    let mut preprocessing = Vec::with_capacity(doc.preprocessing.len());
    for step in &doc.preprocessing {
        let parsed = step
            .parse::<PreprocessStep>()
            .map_err(|_| SchemaLoadError::UnknownPreprocessStep {
                platform,
                field: name.to_string(),
                step: step.clone(),
            })?;
        preprocessing.push(parsed);
    }
    Ok(FieldMapping {
        source_field: doc.source_field,
        target_field: doc.target_field,
        target_type,
        required: doc.required,
        preprocessing,
        default_value: doc.default_value,
    })
}

fn build_computed(
    platform: Platform,
    name: &str,
    doc: ComputedDoc,
) -> Result<ComputedField, SchemaLoadError> {
    let function_name = doc.function.unwrap_or_else(|| name.to_string());
    let function =
        function_name
            .parse::<ComputeFunction>()
            .map_err(|_| SchemaLoadError::UnknownComputeFunction {
                platform,
                field: name.to_string(),
                function: function_name.clone(),
            })?;
    let target_type =
        TargetType::parse(&doc.target_type).map_err(|_| SchemaLoadError::UnknownTargetType {
            platform,
            field: name.to_string(),
            value: doc.target_type.clone(),
        })?;
    Ok(ComputedField {
        target_field: doc.target_field,
        target_type,
        dependencies: doc.dependencies,
        function,
    })
}

fn register_target(
    platform: Platform,
    target_field: &str,
    target_type: &TargetType,
    mode: FieldMode,
    targets: &mut BTreeSet<String>,
    declarations: &mut BTreeMap<String, (TargetType, FieldMode)>,
) -> Result<(), SchemaLoadError> {
    if fields::is_reserved(target_field) {
        return Err(SchemaLoadError::ReservedTargetField {
            platform,
            field: target_field.to_string(),
        });
    }
    if !targets.insert(target_field.to_string()) {
        return Err(SchemaLoadError::DuplicateTargetField {
            platform,
            field: target_field.to_string(),
        });
    }
    declarations.insert(target_field.to_string(), (target_type.clone(), mode));
    Ok(())
}

/// Stable topological order over the computed fields: dependencies first,
/// declaration order among ready fields. Only edges between computed fields
/// matter; mapped and injected dependencies are populated before this stage.
fn evaluation_order(computed: &[ComputedField]) -> Result<Vec<usize>, Vec<String>> {
    let index_of: BTreeMap<&str, usize> = computed
        .iter()
        .enumerate()
        .map(|(i, field)| (field.target_field.as_str(), i))
        .collect();

    let mut indegree = vec![0usize; computed.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); computed.len()];
    for (i, field) in computed.iter().enumerate() {
        for dependency in &field.dependencies {
            if let Some(&j) = index_of.get(dependency.as_str()) {
                dependents[j].push(i);
                indegree[i] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(i, _)| i)
        .collect();
    let mut order = Vec::with_capacity(computed.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &dependent in &dependents[i] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != computed.len() {
        let cycle: Vec<String> = indegree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(i, _)| computed[i].target_field.clone())
            .collect();
        return Err(cycle);
    }
    Ok(order)
}
