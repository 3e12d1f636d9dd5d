// In: src/table.rs

//! The Chunked Table: an ordered sequence of `RecordBatch`es sharing one schema.
//!
//! This is the unit every pipeline stage consumes and produces. Stages take the
//! table by value and hand back a new one; batches themselves are never mutated.

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::{MungeError, Result};

#[derive(Debug, Clone)]
pub struct ChunkedTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl ChunkedTable {
    /// Builds a table, checking that every batch carries exactly `schema`.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for (idx, batch) in batches.iter().enumerate() {
            if batch.schema() != schema {
                return Err(MungeError::Internal(format!(
                    "chunk {} has schema {:?}, table expects {:?}",
                    idx,
                    batch.schema(),
                    schema
                )));
            }
        }
        Ok(Self { schema, batches })
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    pub fn num_chunks(&self) -> usize {
        self.batches.len()
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// The index of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name).ok()
    }

    /// All chunks of one column, in order.
    pub fn column_chunks(&self, idx: usize) -> impl Iterator<Item = &ArrayRef> + '_ {
        self.batches.iter().map(move |b| b.column(idx))
    }

    /// Total value slots across all columns of all chunks.
    pub fn total_cells(&self) -> usize {
        self.batches
            .iter()
            .map(|b| b.columns().iter().map(|c| c.len()).sum::<usize>())
            .sum()
    }
}
