// In: src/filter/engine.rs

//! The Row Filter Engine.
//!
//! For each chunk, every column that has a predicate is scanned and the offending
//! row positions are unioned into one drop set. The chunk is then rebuilt once from
//! the resulting keep-ranges. Chunks are independent of each other here, so
//! `filter_batch` can be called on chunks in any order (or in parallel) as long as
//! the results are put back in chunk order.

use std::collections::BTreeMap;

use arrow::array::{Array, AsArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::keep_ranges::filter_by_drops;
use super::predicates::{PredicateSet, RowPredicate};
use crate::error::{MungeError, Result};
use crate::log_metric;
use crate::observability::StageTimer;
use crate::table::ChunkedTable;

/// Per-label drop counters. A row rejected by two predicates counts under both.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub dropped: BTreeMap<String, usize>,
}

impl FilterStats {
    pub fn record(&mut self, label: &str, count: usize) {
        if count > 0 {
            *self.dropped.entry(label.to_string()).or_insert(0) += count;
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.dropped.get(label).copied().unwrap_or(0)
    }

    pub fn merge(&mut self, other: &FilterStats) {
        for (label, count) in &other.dropped {
            self.record(label, *count);
        }
    }
}

/// Applies a `PredicateSet` to chunks.
#[derive(Debug)]
pub struct RowFilter {
    predicates: PredicateSet,
}

impl RowFilter {
    pub fn new(predicates: PredicateSet) -> Self {
        Self { predicates }
    }

    /// Collects the rows of `batch` that at least one predicate drops, recording
    /// per-predicate counts into `stats`. Unsorted, may contain repeats.
    pub fn drop_indices(&self, batch: &RecordBatch, stats: &mut FilterStats) -> Result<Vec<usize>> {
        let schema = batch.schema();
        let mut drops = Vec::new();
        for (col_idx, field) in schema.fields().iter().enumerate() {
            let Some(predicate) = self.predicates.get(field.name()) else {
                continue;
            };
            let column = batch.column(col_idx);
            let before = drops.len();
            match (predicate, column.data_type()) {
                (RowPredicate::Numeric { drops: rule, .. }, DataType::Float64) => {
                    let values = column.as_primitive::<arrow::datatypes::Float64Type>();
                    for (row, value) in values.iter().enumerate() {
                        if matches!(value, Some(v) if rule(v)) {
                            drops.push(row);
                        }
                    }
                }
                (RowPredicate::Text { drops: rule, .. }, DataType::Utf8) => {
                    let values = column.as_string::<i32>();
                    for (row, value) in values.iter().enumerate() {
                        if matches!(value, Some(v) if rule(v)) {
                            drops.push(row);
                        }
                    }
                }
                (predicate, dt) => {
                    return Err(MungeError::Internal(format!(
                        "predicate {:?} cannot be applied to column {} of type {}",
                        predicate,
                        field.name(),
                        dt
                    )))
                }
            }
            stats.record(predicate.label(), drops.len() - before);
        }
        Ok(drops)
    }

    /// Filters one chunk. Returns the chunk unchanged when nothing is dropped.
    pub fn filter_batch(&self, batch: &RecordBatch, stats: &mut FilterStats) -> Result<RecordBatch> {
        let drops = self.drop_indices(batch, stats)?;
        filter_by_drops(batch, &drops)
    }

    /// Filters every chunk of `table`, preserving chunk order.
    pub fn filter_table(&self, table: ChunkedTable) -> Result<(ChunkedTable, FilterStats)> {
        let _timer = StageTimer::start("row_filter");
        let schema = table.schema();
        let rows_in = table.num_rows();
        let mut stats = FilterStats::default();

        let mut out = Vec::with_capacity(table.num_chunks());
        for (chunk_idx, batch) in table.into_batches().into_iter().enumerate() {
            let mut chunk_stats = FilterStats::default();
            let filtered = self.filter_batch(&batch, &mut chunk_stats)?;
            if filtered.num_rows() != batch.num_rows() {
                debug!(
                    "chunk {}: kept {} of {} rows. Dropped: {:?}",
                    chunk_idx,
                    filtered.num_rows(),
                    batch.num_rows(),
                    chunk_stats.dropped
                );
            }
            stats.merge(&chunk_stats);
            out.push(filtered);
        }

        let filtered = ChunkedTable::try_new(schema, out)?;
        for (label, count) in &stats.dropped {
            log_metric!("event"="row_filter", "predicate"=label, "dropped"=count);
        }
        info!(
            "Value filters kept {} of {} rows. Dropped: {:?}",
            filtered.num_rows(),
            rows_in,
            stats.dropped
        );
        Ok((filtered, stats))
    }
}
