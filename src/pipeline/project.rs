// In: src/pipeline/project.rs

//! Select + rename: turns the ingested table (source names, every header column)
//! into the canonical table (canonical names, retained columns only).
//!
//! Columns with a single source are moved over as the same `ArrayRef`; no value is
//! copied. Several `INFO_LIST` sources are folded into their row-wise mean.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array};
use arrow::datatypes::{Float64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::cnames::CnameResolution;
use crate::error::{MungeError, Result};
use crate::table::ChunkedTable;
use crate::types::canonical_field;
use crate::utils::mean_of;

/// For each output column, the ingest-schema indices that feed it.
struct Projection {
    schema: SchemaRef,
    sources: Vec<Vec<usize>>,
}

impl Projection {
    fn plan(ingest: &Schema, resolution: &CnameResolution) -> Result<Self> {
        let mut fields = Vec::new();
        let mut sources = Vec::new();
        for canonical in resolution.output_columns() {
            let indices = resolution
                .translation
                .iter()
                .filter(|(_, c)| c == canonical)
                .map(|(source, _)| ingest.index_of(source))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            fields.push(canonical_field(canonical));
            sources.push(indices);
        }
        Ok(Self {
            schema: Arc::new(Schema::new(fields)),
            sources,
        })
    }

    fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let columns = self
            .sources
            .iter()
            .map(|indices| match indices.as_slice() {
                [single] => Ok(batch.column(*single).clone()),
                many => row_mean(batch, many),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }
}

/// Row-wise mean of several numeric columns, skipping nulls. All-null rows stay null.
fn row_mean(batch: &RecordBatch, indices: &[usize]) -> Result<ArrayRef> {
    if indices.is_empty() {
        return Err(MungeError::Internal("output column without a source".into()));
    }
    let columns: Vec<_> = indices
        .iter()
        .map(|&i| batch.column(i).as_primitive::<Float64Type>())
        .collect();
    let means: Float64Array = (0..batch.num_rows())
        .map(|row| mean_of(columns.iter().filter_map(|c| c.is_valid(row).then(|| c.value(row)))))
        .collect();
    Ok(Arc::new(means))
}

/// Projects every chunk of `table` onto the canonical columns of `resolution`.
pub fn project(table: ChunkedTable, resolution: &CnameResolution) -> Result<ChunkedTable> {
    let projection = Projection::plan(&table.schema(), resolution)?;
    let batches = table
        .batches()
        .iter()
        .map(|b| projection.apply(b))
        .collect::<Result<Vec<_>>>()?;
    ChunkedTable::try_new(projection.schema.clone(), batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;
    use arrow::datatypes::{DataType, Field};

    fn resolution(translation: &[(&str, &str)], header: &[&str]) -> CnameResolution {
        CnameResolution {
            header: header.iter().map(|s| s.to_string()).collect(),
            translation: translation
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
            signed_null: None,
        }
    }

    fn ingest_table() -> ChunkedTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new("MARKER", DataType::Utf8, true),
            Field::new("CHR", DataType::Utf8, true),
            Field::new("PVAL", DataType::Float64, true),
            Field::new("INFO1", DataType::Float64, true),
            Field::new("INFO2", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["rs1", "rs2", "rs3"])),
                Arc::new(StringArray::from(vec!["1", "1", "2"])),
                Arc::new(Float64Array::from(vec![0.1, 0.2, 0.3])),
                Arc::new(Float64Array::from(vec![Some(0.8), None, None])),
                Arc::new(Float64Array::from(vec![Some(0.6), Some(0.9), None])),
            ],
        )
        .unwrap();
        ChunkedTable::try_new(schema, vec![batch]).unwrap()
    }

    #[test]
    fn test_projection_renames_and_drops_unmapped_columns() {
        let input = ingest_table();
        let res = resolution(
            &[("MARKER", "SNP"), ("PVAL", "P")],
            &["MARKER", "CHR", "PVAL", "INFO1", "INFO2"],
        );
        let out = project(input.clone(), &res).unwrap();

        let names: Vec<_> = out.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["SNP", "P"]);
        // Same buffers, new names.
        assert!(Arc::ptr_eq(out.batches()[0].column(1), input.batches()[0].column(2)));
    }

    #[test]
    fn test_info_list_sources_fold_into_row_mean() {
        let res = resolution(
            &[("MARKER", "SNP"), ("INFO1", "INFO_LIST"), ("INFO2", "INFO_LIST")],
            &["MARKER", "CHR", "PVAL", "INFO1", "INFO2"],
        );
        let out = project(ingest_table(), &res).unwrap();
        let info = out.batches()[0].column(1).as_primitive::<Float64Type>().clone();

        assert_eq!(out.schema().field(1).name(), "INFO_LIST");
        assert!((info.value(0) - 0.7).abs() < 1e-12);
        assert_eq!(info.value(1), 0.9);
        assert!(info.is_null(2));
    }

    #[test]
    fn test_unknown_source_is_arrow_error() {
        let res = resolution(&[("RSID", "SNP")], &["RSID"]);
        assert!(matches!(project(ingest_table(), &res), Err(MungeError::Arrow(_))));
    }
}
