// In: src/error.rs

//! This module defines the single, unified error type for the munging pipeline.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant is fatal: the driver never retries and never emits a partial table.
//! Per-row filtering decisions are not errors; they are counted in `FilterStats`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MungeError>;

#[derive(Error, Debug)]
pub enum MungeError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to the munging logic)
    // =========================================================================
    /// Ambiguous, missing or duplicated column mapping. Raised before any chunk is read.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A malformed numeric or boolean option.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Undefined arithmetic while deriving the sample size.
    #[error("Sample-size derivation failed: {0}")]
    Derivation(String),

    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library (schema mismatch, concat, CSV decode).
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the ingestion or emission collaborator's I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while reading options or writing the report.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl MungeError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        MungeError::Schema(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        MungeError::Parse(msg.into())
    }

    pub(crate) fn derivation(msg: impl Into<String>) -> Self {
        MungeError::Derivation(msg.into())
    }
}
