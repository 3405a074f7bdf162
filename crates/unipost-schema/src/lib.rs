#![deny(unsafe_code)]

pub mod config;
pub mod definition;
pub mod doctor;
pub mod error;
pub mod hash;
pub mod registry;
pub mod shared;

pub use definition::{ComputedField, FieldMapping, MappingCategory, SchemaDefinition, TableTarget};
pub use doctor::{PlatformReport, SchemaCounts, SchemaReport};
pub use error::SchemaLoadError;
pub use registry::{LoadSummary, SchemaRegistry};
pub use shared::SharedSchemas;
