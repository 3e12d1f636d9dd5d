// In: src/pipeline/report.rs

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::FilterStats;
use crate::sample_size::SampleSizeOutcome;

/// A summary of one successful munging run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MungeReport {
    pub rows_read: usize,
    /// `(source, canonical)` pairs that were applied.
    pub translation: Vec<(String, String)>,
    /// The null value of `SIGNED_SUMSTAT`, when a signed statistic was resolved.
    pub signed_null: Option<f64>,
    pub value_filters: FilterStats,
    pub duplicates: usize,
    pub sample_size: SampleSizeOutcome,
    pub rows_written: usize,
    pub output_schema: Schema,
    pub writer_version: String,
}

impl MungeReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
