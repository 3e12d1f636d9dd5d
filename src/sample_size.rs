// In: src/sample_size.rs

//! The Sample-Size Deriver.
//!
//! Picks exactly one strategy from the columns that survived resolution:
//!
//! 1. `Direct`: an `N` column is present and kept as-is.
//! 2. `CaseControl`: `N_CAS` and `N_CON` are present. The effective N is the mean of
//!    `total * proportion / proportion_max` over every row of the dataset.
//! 3. `StudyCount`: `NSTUDY` is present. Its dataset maximum becomes the row-inclusion
//!    threshold; the N value itself comes from the explicit arguments.
//! 4. `Explicit`: a constant N, or a case/control pair, given on the command line.
//!
//! Rows whose N-bearing column is below `nmin` are removed with the keep-range
//! rebuild. Strategies 2 to 4 then collapse every sample-size field into a single
//! numeric `N` column holding one scalar for the whole table.

use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array};
use arrow::datatypes::{Float64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ExplicitN;
use crate::error::{MungeError, Result};
use crate::filter::filter_by_drops;
use crate::log_metric;
use crate::observability::StageTimer;
use crate::table::ChunkedTable;
use crate::types::{canonical_field, FieldKind};
use crate::utils::{max_of, mean_of};

/// Every canonical column that carries sample-size information.
pub const N_COLUMNS: [&str; 4] = ["N", "N_CAS", "N_CON", "NSTUDY"];

//==================================================================================
// 1. Strategy Selection
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSizeStrategy {
    Direct,
    CaseControl,
    StudyCount,
    Explicit,
}

impl SampleSizeStrategy {
    /// Chooses the strategy from the columns present in `schema`.
    pub fn choose(schema: &Schema, explicit: &ExplicitN) -> Result<Self> {
        let has = |name: &str| schema.index_of(name).is_ok();
        if has("N") {
            Ok(Self::Direct)
        } else if has("N_CAS") && has("N_CON") {
            Ok(Self::CaseControl)
        } else if explicit.scalar().is_none() {
            Err(MungeError::schema("Could not determine N."))
        } else if has("NSTUDY") {
            Ok(Self::StudyCount)
        } else {
            Ok(Self::Explicit)
        }
    }

    /// Whether the output carries one scalar N for every row.
    pub fn broadcasts(&self) -> bool {
        !matches!(self, Self::Direct)
    }
}

/// What the deriver did, for the run report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampleSizeOutcome {
    pub strategy: SampleSizeStrategy,
    /// The broadcast N, absent under `Direct`.
    pub n_value: Option<f64>,
    pub nmin: f64,
    /// Rows removed by the `nmin` threshold.
    pub dropped: usize,
}

//==================================================================================
// 2. Dataset-Wide Aggregates
//==================================================================================

/// Non-null values of one numeric column, in table order.
fn numeric_values(table: &ChunkedTable, col_idx: usize) -> impl Iterator<Item = f64> + '_ {
    table
        .column_chunks(col_idx)
        .flat_map(|column| column.as_primitive::<Float64Type>().iter().flatten().collect::<Vec<_>>())
}

fn numeric_index(table: &ChunkedTable, name: &str) -> Result<usize> {
    let idx = table
        .column_index(name)
        .ok_or_else(|| MungeError::schema(format!("missing sample-size column: {}", name)))?;
    let schema = table.schema();
    let data_type = schema.field(idx).data_type();
    if FieldKind::from_arrow_type(data_type)?.is_numeric() {
        Ok(idx)
    } else {
        Err(MungeError::Internal(format!(
            "sample-size column {} has type {}",
            name, data_type
        )))
    }
}

/// One row with both counts present, remembered with its position for errors.
#[derive(Debug, Clone, Copy)]
struct CaseControlRow {
    chunk: usize,
    row: usize,
    total: f64,
    proportion: f64,
}

fn not_finite(what: &str, chunk: usize, row: usize) -> MungeError {
    MungeError::derivation(format!("{} is not finite at chunk {}, row {}", what, chunk, row))
}

/// Every row where both counts are present. Zero or non-finite totals are fatal.
fn case_control_rows(table: &ChunkedTable) -> Result<Vec<CaseControlRow>> {
    let cas_idx = numeric_index(table, "N_CAS")?;
    let con_idx = numeric_index(table, "N_CON")?;
    let mut rows = Vec::with_capacity(table.num_rows());
    for (chunk_idx, batch) in table.batches().iter().enumerate() {
        let cas = batch.column(cas_idx).as_primitive::<Float64Type>();
        let con = batch.column(con_idx).as_primitive::<Float64Type>();
        for (row, pair) in cas.iter().zip(con.iter()).enumerate() {
            let (Some(cas), Some(con)) = pair else {
                continue;
            };
            let total = cas + con;
            if !total.is_finite() {
                return Err(not_finite("N_CAS + N_CON", chunk_idx, row));
            }
            if total == 0.0 {
                return Err(MungeError::derivation(format!(
                    "N_CAS + N_CON is zero at chunk {}, row {}",
                    chunk_idx, row
                )));
            }
            let proportion = cas / total;
            if !proportion.is_finite() {
                return Err(not_finite("the case proportion", chunk_idx, row));
            }
            rows.push(CaseControlRow {
                chunk: chunk_idx,
                row,
                total,
                proportion,
            });
        }
    }
    Ok(rows)
}

/// The effective sample size of an unbalanced case/control dataset.
pub fn effective_case_control_n(table: &ChunkedTable) -> Result<f64> {
    let rows = case_control_rows(table)?;
    let proportion_max = max_of(rows.iter().map(|r| r.proportion))
        .ok_or_else(|| MungeError::derivation("no row has both N_CAS and N_CON"))?;
    if proportion_max == 0.0 {
        return Err(MungeError::derivation(
            "every row has zero cases; the case proportion cannot be normalized",
        ));
    }
    let mut contributions = Vec::with_capacity(rows.len());
    for r in &rows {
        let contribution = r.total * (r.proportion / proportion_max);
        if !contribution.is_finite() {
            return Err(not_finite("the effective sample size", r.chunk, r.row));
        }
        contributions.push(contribution);
    }
    let n = mean_of(contributions)
        .ok_or_else(|| MungeError::derivation("no case/control rows"))?;
    if !n.is_finite() {
        return Err(MungeError::derivation("the mean effective sample size is not finite"));
    }
    Ok(n)
}

/// The largest `NSTUDY` value in the dataset, if any row has one.
pub fn nstudy_max(table: &ChunkedTable) -> Result<Option<f64>> {
    let idx = numeric_index(table, "NSTUDY")?;
    Ok(max_of(numeric_values(table, idx)))
}

//==================================================================================
// 3. Threshold and Collapse
//==================================================================================

/// Removes rows whose `column` value is below `nmin`. Nulls are kept.
fn drop_below(table: ChunkedTable, column: &str, nmin: f64) -> Result<(ChunkedTable, usize)> {
    let idx = numeric_index(&table, column)?;
    let schema = table.schema();
    let mut dropped = 0;
    let mut out = Vec::with_capacity(table.num_chunks());
    for batch in table.into_batches() {
        let drops: Vec<usize> = batch
            .column(idx)
            .as_primitive::<Float64Type>()
            .iter()
            .enumerate()
            .filter_map(|(row, v)| matches!(v, Some(n) if n < nmin).then_some(row))
            .collect();
        dropped += drops.len();
        out.push(filter_by_drops(&batch, &drops)?);
    }
    Ok((ChunkedTable::try_new(schema, out)?, dropped))
}

/// The output schema with all sample-size fields replaced by one numeric `N`,
/// placed where the first of them was (appended when there were none).
fn collapsed_schema(schema: &Schema) -> (SchemaRef, Vec<Option<usize>>) {
    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    let mut sources = Vec::with_capacity(schema.fields().len() + 1);
    let mut placed = false;
    for (idx, field) in schema.fields().iter().enumerate() {
        if N_COLUMNS.contains(&field.name().as_str()) {
            if !placed {
                fields.push(Arc::new(canonical_field("N")));
                sources.push(None);
                placed = true;
            }
            continue;
        }
        fields.push(field.clone());
        sources.push(Some(idx));
    }
    if !placed {
        fields.push(Arc::new(canonical_field("N")));
        sources.push(None);
    }
    (Arc::new(Schema::new(fields)), sources)
}

/// Rewrites every chunk so that `N` holds `n_value` on every row.
pub fn broadcast_n(table: ChunkedTable, n_value: f64) -> Result<ChunkedTable> {
    let (schema, sources) = collapsed_schema(&table.schema());
    let batches = table
        .into_batches()
        .into_iter()
        .map(|batch| {
            let n: ArrayRef = Arc::new(Float64Array::from_value(n_value, batch.num_rows()));
            let columns = sources
                .iter()
                .map(|src| match src {
                    Some(idx) => batch.column(*idx).clone(),
                    None => n.clone(),
                })
                .collect();
            Ok(RecordBatch::try_new(schema.clone(), columns)?)
        })
        .collect::<Result<Vec<_>>>()?;
    ChunkedTable::try_new(schema, batches)
}

//==================================================================================
// 4. Entry Point
//==================================================================================

/// Derives (or validates) the sample size of `table` and applies the N threshold.
pub fn derive_sample_size(
    table: ChunkedTable,
    explicit: &ExplicitN,
) -> Result<(ChunkedTable, SampleSizeOutcome)> {
    let _timer = StageTimer::start("sample_size");
    let strategy = SampleSizeStrategy::choose(&table.schema(), explicit)?;

    // TODO: a quantile rule (0.9 quantile of N divided by 1.5) would slot in here as a
    // third nmin source once there is a flag that selects it.
    let (table, n_value, nmin, dropped) = match strategy {
        SampleSizeStrategy::Direct => {
            let (table, dropped) = drop_below(table, "N", 0.0)?;
            (table, None, 0.0, dropped)
        }
        SampleSizeStrategy::CaseControl => {
            let n = effective_case_control_n(&table)?;
            (table, Some(n), 0.0, 0)
        }
        SampleSizeStrategy::StudyCount => {
            let nmin = nstudy_max(&table)?.unwrap_or(0.0);
            let (table, dropped) = drop_below(table, "NSTUDY", nmin)?;
            (table, explicit.scalar(), nmin, dropped)
        }
        SampleSizeStrategy::Explicit => (table, explicit.scalar(), 0.0, 0),
    };

    let table = if strategy.broadcasts() {
        let n = n_value.ok_or_else(|| MungeError::Internal("no scalar N to broadcast".into()))?;
        broadcast_n(table, n)?
    } else {
        table
    };

    log_metric!("event"="sample_size", "strategy"=format!("{:?}", strategy), "nmin"=nmin, "dropped"=dropped);
    match n_value {
        Some(n) => info!("Using N = {:.3} for every row ({:?}).", n, strategy),
        None => info!("Using the N column as-is."),
    }
    if dropped > 0 {
        info!("Removed {} SNPs with N < {}.", dropped, nmin);
    }

    Ok((
        table,
        SampleSizeOutcome {
            strategy,
            n_value,
            nmin,
            dropped,
        },
    ))
}
