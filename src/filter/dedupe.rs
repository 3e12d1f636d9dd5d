// In: src/filter/dedupe.rs

//! The Duplicate Key Filter.
//!
//! First-seen-wins on one key column across the whole table. The seen-set lives
//! for exactly one `dedupe` call and is threaded through the chunks in their
//! original order, which is what defines "first". Rows are removed with the same
//! keep-range rebuild as the value filters.

use std::hash::Hash;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use hashbrown::HashSet;
use log::{info, warn};

use super::keep_ranges::filter_by_drops;
use crate::error::{MungeError, Result};
use crate::log_metric;
use crate::observability::StageTimer;
use crate::table::ChunkedTable;

/// Marks the positions of keys already in `seen`, inserting new keys as it goes.
/// Null keys are never marked and never recorded. Returns `(drops, null_count)`.
fn mark_repeats<K, I>(keys: I, seen: &mut HashSet<K>) -> (Vec<usize>, usize)
where
    K: Eq + Hash,
    I: IntoIterator<Item = Option<K>>,
{
    let mut drops = Vec::new();
    let mut nulls = 0;
    for (row, key) in keys.into_iter().enumerate() {
        match key {
            Some(k) => {
                if !seen.insert(k) {
                    drops.push(row);
                }
            }
            None => nulls += 1,
        }
    }
    (drops, nulls)
}

/// The key set of one pass, typed by the key column.
enum SeenKeys {
    Text(HashSet<String>),
    // Keyed by bit pattern; -0.0 and 0.0 are distinct keys.
    Numeric(HashSet<u64>),
}

impl SeenKeys {
    fn for_type(dt: &DataType) -> Result<Self> {
        match dt {
            DataType::Utf8 => Ok(SeenKeys::Text(HashSet::new())),
            DataType::Float64 => Ok(SeenKeys::Numeric(HashSet::new())),
            dt => Err(MungeError::Internal(format!(
                "cannot deduplicate on a column of type {}",
                dt
            ))),
        }
    }

    fn mark(&mut self, batch: &RecordBatch, key_idx: usize) -> (Vec<usize>, usize) {
        let column = batch.column(key_idx);
        match self {
            SeenKeys::Text(seen) => mark_repeats(
                column.as_string::<i32>().iter().map(|k| k.map(str::to_string)),
                seen,
            ),
            SeenKeys::Numeric(seen) => mark_repeats(
                column
                    .as_primitive::<Float64Type>()
                    .iter()
                    .map(|k| k.map(f64::to_bits)),
                seen,
            ),
        }
    }
}

/// Removes second-and-later occurrences of each `key_column` value.
///
/// Returns the deduplicated table and the number of rows removed.
pub fn dedupe(table: ChunkedTable, key_column: &str) -> Result<(ChunkedTable, usize)> {
    let _timer = StageTimer::start("dedupe");
    let schema = table.schema();
    let key_idx = table
        .column_index(key_column)
        .ok_or_else(|| MungeError::schema(format!("missing key column: {}", key_column)))?;
    let mut seen = SeenKeys::for_type(schema.field(key_idx).data_type())?;

    let mut duplicates = 0;
    let mut null_keys = 0;
    let mut out = Vec::with_capacity(table.num_chunks());
    for batch in table.into_batches() {
        let (drops, nulls) = seen.mark(&batch, key_idx);
        duplicates += drops.len();
        null_keys += nulls;
        out.push(filter_by_drops(&batch, &drops)?);
    }

    if null_keys > 0 {
        warn!("{} rows have a null {}; they were kept as-is.", null_keys, key_column);
    }
    log_metric!("event"="dedupe", "column"=key_column, "dropped"=duplicates);
    info!("Dropped {} duplicate {}s.", duplicates, key_column);
    Ok((ChunkedTable::try_new(schema, out)?, duplicates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema, SchemaRef};
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("SNP", DataType::Utf8, true),
            Field::new("P", DataType::Float64, true),
        ]))
    }

    fn batch(snps: Vec<Option<&str>>, ps: Vec<f64>) -> RecordBatch {
        RecordBatch::try_new(
            schema(),
            vec![Arc::new(StringArray::from(snps)), Arc::new(Float64Array::from(ps))],
        )
        .unwrap()
    }

    fn collect(table: &ChunkedTable) -> Vec<(Option<String>, f64)> {
        table
            .batches()
            .iter()
            .flat_map(|b| {
                let snps = b.column(0).as_string::<i32>().clone();
                let ps = b.column(1).as_primitive::<Float64Type>().clone();
                (0..b.num_rows())
                    .map(move |i| {
                        let snp = (!snps.is_null(i)).then(|| snps.value(i).to_string());
                        (snp, ps.value(i))
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_first_occurrence_wins_across_chunks() {
        let table = ChunkedTable::try_new(
            schema(),
            vec![
                batch(vec![Some("rs1"), Some("rs2"), Some("rs1")], vec![0.1, 0.2, 0.3]),
                batch(vec![Some("rs3"), Some("rs2")], vec![0.4, 0.5]),
            ],
        )
        .unwrap();

        let (out, duplicates) = dedupe(table, "SNP").unwrap();

        assert_eq!(duplicates, 2);
        assert_eq!(out.num_rows(), 3);
        assert_eq!(out.num_chunks(), 2);
        assert_eq!(
            collect(&out),
            vec![
                (Some("rs1".to_string()), 0.1),
                (Some("rs2".to_string()), 0.2),
                (Some("rs3".to_string()), 0.4),
            ]
        );
    }

    #[test]
    fn test_null_keys_are_kept() {
        let table = ChunkedTable::try_new(
            schema(),
            vec![batch(vec![None, Some("rs1"), None, Some("rs1")], vec![0.1, 0.2, 0.3, 0.4])],
        )
        .unwrap();
        let (out, duplicates) = dedupe(table, "SNP").unwrap();
        assert_eq!(duplicates, 1);
        assert_eq!(out.num_rows(), 3);
    }

    #[test]
    fn test_numeric_key_column() {
        let table = ChunkedTable::try_new(
            schema(),
            vec![
                batch(vec![Some("a"), Some("b")], vec![0.5, 0.5]),
                batch(vec![Some("c")], vec![0.7]),
            ],
        )
        .unwrap();
        let (out, duplicates) = dedupe(table, "P").unwrap();
        assert_eq!(duplicates, 1);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn test_missing_key_column_is_schema_error() {
        let table = ChunkedTable::empty(schema());
        assert!(matches!(dedupe(table, "RSID"), Err(MungeError::Schema(_))));
    }

    #[test]
    fn test_seen_set_does_not_leak_between_calls() {
        let make = || {
            ChunkedTable::try_new(schema(), vec![batch(vec![Some("rs1")], vec![0.1])]).unwrap()
        };
        let (_, first) = dedupe(make(), "SNP").unwrap();
        let (out, second) = dedupe(make(), "SNP").unwrap();
        assert_eq!((first, second), (0, 0));
        assert_eq!(out.num_rows(), 1);
    }
}
