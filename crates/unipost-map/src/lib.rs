//! Field extraction and preprocessing for raw crawler payloads.
//!
//! This crate turns one platform-shaped JSON document into a flat
//! [`unipost_model::RecordDraft`] by walking the schema's mapping
//! categories: resolve the dot path, run the declared preprocessing
//! chain, fall back to defaults, and record an issue for anything a
//! required column could not produce. Failures never abort a record;
//! they accumulate so operators see the whole payload's problems at
//! once.

pub mod mapper;
pub mod path;
pub mod preprocess;

pub use mapper::{MapOutcome, map_record};
pub use path::{extract, resolve_path};
