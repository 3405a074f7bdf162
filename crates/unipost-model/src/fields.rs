//! Core fields shared by every normalized record regardless of platform.
//!
//! Three groups: fields injected by the engine from crawl metadata and
//! version stamps, fields every schema must map from the payload (`id`,
//! `date_posted`), and fields every schema must compute (`grouped_date`,
//! `data_quality_score`). Registry verification enforces the map/compute
//! obligations at load time.

use crate::target::{FieldMode, TargetType};

pub const ID: &str = "id";
pub const CRAWL_ID: &str = "crawl_id";
pub const SNAPSHOT_ID: &str = "snapshot_id";
pub const PLATFORM: &str = "platform";
pub const COMPETITOR: &str = "competitor";
pub const BRAND: &str = "brand";
pub const CATEGORY: &str = "category";
pub const DATE_POSTED: &str = "date_posted";
pub const CRAWL_DATE: &str = "crawl_date";
pub const PROCESSED_DATE: &str = "processed_date";
pub const GROUPED_DATE: &str = "grouped_date";
pub const SCHEMA_VERSION: &str = "schema_version";
pub const PROCESSING_VERSION: &str = "processing_version";
pub const DATA_QUALITY_SCORE: &str = "data_quality_score";

/// Every core field, in output order.
pub const ALL: [&str; 14] = [
    ID,
    CRAWL_ID,
    SNAPSHOT_ID,
    PLATFORM,
    COMPETITOR,
    BRAND,
    CATEGORY,
    DATE_POSTED,
    CRAWL_DATE,
    PROCESSED_DATE,
    GROUPED_DATE,
    SCHEMA_VERSION,
    PROCESSING_VERSION,
    DATA_QUALITY_SCORE,
];

/// Fields the engine injects itself. Schemas may not map or compute into
/// these names.
pub const RESERVED: [&str; 10] = [
    CRAWL_ID,
    SNAPSHOT_ID,
    PLATFORM,
    COMPETITOR,
    BRAND,
    CATEGORY,
    CRAWL_DATE,
    PROCESSED_DATE,
    SCHEMA_VERSION,
    PROCESSING_VERSION,
];

/// Core fields each schema must produce via a mapping or a computed entry.
pub const SCHEMA_OBLIGATIONS: [&str; 4] = [ID, DATE_POSTED, GROUPED_DATE, DATA_QUALITY_SCORE];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Declared type and mode of an engine-injected core field. Schema-produced
/// core fields carry their declaration in the schema itself.
pub fn injected_declaration(name: &str) -> Option<(TargetType, FieldMode)> {
    match name {
        CRAWL_ID | SNAPSHOT_ID | PLATFORM | COMPETITOR | BRAND | CATEGORY | SCHEMA_VERSION
        | PROCESSING_VERSION => Some((TargetType::String, FieldMode::Required)),
        CRAWL_DATE => Some((TargetType::Date, FieldMode::Required)),
        PROCESSED_DATE => Some((TargetType::Timestamp, FieldMode::Required)),
        _ => None,
    }
}
