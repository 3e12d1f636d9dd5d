// In: src/pipeline/sink.rs

//! The emission collaborator. A sink is handed the finished table exactly once.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::table::ChunkedTable;

pub trait TableSink {
    fn write_table(&mut self, table: &ChunkedTable) -> Result<()>;
}

/// Writes a tab-delimited file with a header line.
#[derive(Debug)]
pub struct TsvSink<W: Write> {
    writer: W,
}

impl<W: Write> TsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TsvSink<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TableSink for TsvSink<W> {
    fn write_table(&mut self, table: &ChunkedTable) -> Result<()> {
        let mut csv = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(b'\t')
            .build(&mut self.writer);
        for batch in table.batches() {
            csv.write(batch)?;
        }
        // The writer only emits the header on its first write.
        if table.num_chunks() == 0 {
            csv.write(&RecordBatch::new_empty(table.schema()))?;
        }
        csv.into_inner().flush()?;
        Ok(())
    }
}

/// Keeps the emitted table in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    table: Option<ChunkedTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&ChunkedTable> {
        self.table.as_ref()
    }

    pub fn into_table(self) -> Option<ChunkedTable> {
        self.table
    }
}

impl TableSink for MemorySink {
    fn write_table(&mut self, table: &ChunkedTable) -> Result<()> {
        self.table = Some(table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn two_chunk_table() -> ChunkedTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new("SNP", DataType::Utf8, true),
            Field::new("N", DataType::Float64, true),
        ]));
        let chunk = |snp: &str, n: f64| {
            RecordBatch::try_new(
                schema.clone(),
                vec![
                    Arc::new(StringArray::from(vec![snp])),
                    Arc::new(Float64Array::from(vec![n])),
                ],
            )
            .unwrap()
        };
        ChunkedTable::try_new(schema.clone(), vec![chunk("rs1", 75.25), chunk("rs2", 75.5)]).unwrap()
    }

    #[test]
    fn test_tsv_sink_writes_one_header() {
        let mut sink = TsvSink::new(Vec::new());
        sink.write_table(&two_chunk_table()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "SNP\tN\nrs1\t75.25\nrs2\t75.5\n");
    }

    #[test]
    fn test_empty_table_still_writes_header() {
        let schema = two_chunk_table().schema();
        let mut sink = TsvSink::new(Vec::new());
        sink.write_table(&ChunkedTable::empty(schema)).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "SNP\tN\n");
    }

    #[test]
    fn test_memory_sink_keeps_table() {
        let mut sink = MemorySink::new();
        assert!(sink.table().is_none());
        sink.write_table(&two_chunk_table()).unwrap();
        assert_eq!(sink.table().map(|t| t.num_rows()), Some(2));
    }
}
