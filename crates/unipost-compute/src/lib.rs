//! Derived analytic fields.
//!
//! Evaluates a schema's computed fields against the mapped draft in the
//! dependency order resolved at load time: engagement aggregates, video
//! aspect buckets, text analytics, the calendar grouping date, and the
//! data-quality score.

pub mod engine;
pub mod functions;
pub mod text;

pub use engine::compute_fields;
pub use functions::evaluate;
