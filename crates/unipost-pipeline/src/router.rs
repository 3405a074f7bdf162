//! Platform routing from crawler identifiers to schemas and tables.

use std::sync::Arc;

use unipost_model::Platform;
use unipost_schema::{SchemaDefinition, SchemaRegistry, TableTarget};

use crate::error::PipelineError;

/// Resolved destination for one platform's records.
#[derive(Debug, Clone)]
pub struct RouteTarget {
    pub schema: Arc<SchemaDefinition>,
    pub table: TableTarget,
}

/// Maps raw platform identifiers onto loaded schemas.
///
/// Routing is closed over the registry snapshot it was built from. An
/// identifier that parses but has no schema in this snapshot is rejected
/// the same way as one that does not parse at all, before any record
/// work starts.
#[derive(Debug, Clone)]
pub struct PlatformRouter {
    registry: Arc<SchemaRegistry>,
}

impl PlatformRouter {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a raw platform identifier to its schema and table.
    pub fn resolve(&self, platform: &str) -> Result<RouteTarget, PipelineError> {
        let parsed: Platform =
            platform
                .parse()
                .map_err(|_| PipelineError::UnsupportedPlatform {
                    platform: platform.to_string(),
                })?;
        let schema =
            self.registry
                .get(parsed)
                .ok_or_else(|| PipelineError::UnsupportedPlatform {
                    platform: platform.to_string(),
                })?;
        let table = schema.table.clone();
        Ok(RouteTarget { schema, table })
    }

    /// Platforms this router can serve.
    pub fn platforms(&self) -> Vec<Platform> {
        self.registry.platforms().collect()
    }
}
