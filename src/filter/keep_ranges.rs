// In: src/filter/keep_ranges.rs

//! Keep-range computation and column reconstruction.
//!
//! A drop set is turned into sorted, non-overlapping, non-adjacent half-open
//! `[start, end)` ranges. Every column of the chunk is then rebuilt from the same
//! ranges: each range is an `Array::slice` view over the original buffers, and the
//! views are concatenated in range order. A single surviving range is returned as
//! the view itself, without any copy.

use arrow::array::{Array, ArrayRef};
use arrow::compute::concat;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::Result;
use crate::utils::sort_dedup;

/// A half-open interval of rows `[start, end)` retained from one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepRange {
    pub start: usize,
    pub end: usize,
}

impl KeepRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Converts the row indices to drop into keep-ranges over `0..row_count`.
///
/// Empty ranges between consecutive drops are skipped. When the final row is
/// dropped the result ends with the empty range `[row_count, row_count)`, so the
/// output always holds at least one range. Indices at or past `row_count` are ignored.
pub fn keep_ranges(row_count: usize, drops: &[usize]) -> Vec<KeepRange> {
    let mut drops: Vec<usize> = drops.iter().copied().filter(|&d| d < row_count).collect();
    sort_dedup(&mut drops);

    let mut ranges = Vec::with_capacity(drops.len() + 1);
    let mut start = 0;
    for drop_idx in drops {
        if drop_idx == start {
            start += 1;
            continue;
        }
        ranges.push(KeepRange::new(start, drop_idx));
        start = drop_idx + 1;
    }
    if start < row_count {
        ranges.push(KeepRange::new(start, row_count));
    } else {
        ranges.push(KeepRange::new(start, start));
    }
    ranges
}

/// Rebuilds a column from the retained ranges.
fn rebuild_column(column: &ArrayRef, ranges: &[KeepRange]) -> Result<ArrayRef> {
    let slices: Vec<ArrayRef> = ranges
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| column.slice(r.start, r.len()))
        .collect();
    match slices.len() {
        0 => Ok(column.slice(0, 0)),
        1 => Ok(slices[0].clone()),
        _ => {
            let views: Vec<&dyn Array> = slices.iter().map(|s| s.as_ref()).collect();
            Ok(concat(&views)?)
        }
    }
}

/// Rebuilds every column of `batch` from the same keep-ranges, preserving row alignment.
pub fn rebuild_batch(batch: &RecordBatch, ranges: &[KeepRange]) -> Result<RecordBatch> {
    let row_count: usize = ranges.iter().map(KeepRange::len).sum();
    let columns = batch
        .columns()
        .iter()
        .map(|col| rebuild_column(col, ranges))
        .collect::<Result<Vec<_>>>()?;
    let options = RecordBatchOptions::new().with_row_count(Some(row_count));
    Ok(RecordBatch::try_new_with_options(batch.schema(), columns, &options)?)
}

/// Drops the given rows from `batch`. An empty drop set returns the chunk unchanged.
pub fn filter_by_drops(batch: &RecordBatch, drops: &[usize]) -> Result<RecordBatch> {
    if drops.is_empty() {
        return Ok(batch.clone());
    }
    rebuild_batch(batch, &keep_ranges(batch.num_rows(), drops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use std::sync::Arc;
    use arrow::datatypes::{DataType, Field, Schema};

    fn ranges(pairs: &[(usize, usize)]) -> Vec<KeepRange> {
        pairs.iter().map(|&(s, e)| KeepRange::new(s, e)).collect()
    }

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("SNP", DataType::Utf8, true),
            Field::new("P", DataType::Float64, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["rs0", "rs1", "rs2", "rs3", "rs4", "rs5"])),
                Arc::new(Float64Array::from(vec![
                    Some(0.0),
                    Some(0.1),
                    None,
                    Some(0.3),
                    Some(0.4),
                    Some(0.5),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_keep_ranges_middle_drops() {
        assert_eq!(keep_ranges(6, &[2, 4]), ranges(&[(0, 2), (3, 4), (5, 6)]));
    }

    #[test]
    fn test_keep_ranges_unsorted_with_duplicates() {
        assert_eq!(keep_ranges(6, &[4, 2, 4, 2]), ranges(&[(0, 2), (3, 4), (5, 6)]));
    }

    #[test]
    fn test_keep_ranges_leading_and_adjacent_drops() {
        assert_eq!(keep_ranges(6, &[0, 1, 3]), ranges(&[(2, 3), (4, 6)]));
    }

    #[test]
    fn test_keep_ranges_last_row_dropped_emits_empty_tail() {
        assert_eq!(keep_ranges(4, &[1, 3]), ranges(&[(0, 1), (2, 3), (4, 4)]));
        assert_eq!(keep_ranges(2, &[0, 1]), ranges(&[(2, 2)]));
    }

    #[test]
    fn test_keep_ranges_no_drops_is_single_full_range() {
        assert_eq!(keep_ranges(5, &[]), ranges(&[(0, 5)]));
    }

    #[test]
    fn test_keep_ranges_union_is_complement_of_drops() {
        let drops = [0usize, 3, 4, 9, 11];
        let kept: Vec<usize> = keep_ranges(12, &drops)
            .iter()
            .flat_map(|r| r.start..r.end)
            .collect();
        let expected: Vec<usize> = (0..12).filter(|i| !drops.contains(i)).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_rebuild_preserves_alignment_and_nulls() {
        let batch = sample_batch();
        let out = filter_by_drops(&batch, &[1, 4]).unwrap();

        assert_eq!(out.num_rows(), 4);
        let snps = out.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        let ps = out.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(
            snps.iter().collect::<Vec<_>>(),
            vec![Some("rs0"), Some("rs2"), Some("rs3"), Some("rs5")]
        );
        assert_eq!(
            ps.iter().collect::<Vec<_>>(),
            vec![Some(0.0), None, Some(0.3), Some(0.5)]
        );
    }

    #[test]
    fn test_rebuild_keeps_cell_count_invariant() {
        let batch = sample_batch();
        let out = filter_by_drops(&batch, &[0, 5]).unwrap();
        let cells: usize = out.columns().iter().map(|c| c.len()).sum();
        assert_eq!(cells, out.num_rows() * out.num_columns());
        assert_eq!(out.schema(), batch.schema());
    }

    #[test]
    fn test_empty_drop_set_is_identity() {
        let batch = sample_batch();
        let out = filter_by_drops(&batch, &[]).unwrap();
        assert_eq!(out, batch);
    }

    #[test]
    fn test_dropping_every_row_yields_empty_batch() {
        let batch = sample_batch();
        let out = filter_by_drops(&batch, &[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.num_columns(), 2);
    }

    #[test]
    fn test_single_range_is_a_zero_copy_slice() {
        let batch = sample_batch();
        let out = filter_by_drops(&batch, &[0]).unwrap();
        let original = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        let sliced = out.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        // Same underlying buffer, offset by one value.
        assert_eq!(
            sliced.values().as_ptr(),
            original.values()[1..].as_ptr()
        );
    }
}
