//! This module defines the strongly-typed column classification used throughout
//! the munging pipeline.
//!
//! It currently includes the `FieldKind` registry that decides whether a canonical
//! column is stored as `Float64` or `Utf8`, and the schema builder that applies it.

pub mod field_kind;

// Re-export the main type(s) for easier access.
pub use field_kind::{build_schema, canonical_field, FieldKind, NUMERIC_COLUMNS};
