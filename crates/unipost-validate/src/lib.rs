//! Type coercion and mode enforcement for finished record drafts.
//!
//! [`validate`] turns a [`unipost_model::RecordDraft`] into either a
//! [`unipost_model::NormalizedRecord`] or an
//! [`unipost_model::InvalidRecord`], coercing every declared column to
//! its target type and applying REQUIRED / NULLABLE / REPEATED
//! semantics.

pub mod coerce;
pub mod validator;

pub use coerce::{coerce_repeated, coerce_scalar};
pub use validator::{ValidationOutcome, validate};
