// In: src/pipeline/source.rs

//! The ingestion collaborator.
//!
//! A source exposes its raw header before any data is read, so the resolver can
//! decide the schema, and then streams the body into same-schema chunks.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use arrow::csv::ReaderBuilder;
use arrow::datatypes::SchemaRef;
use log::debug;

use crate::error::{MungeError, Result};
use crate::table::ChunkedTable;

const DELIMITER: u8 = b'\t';

/// Anything the driver can read a summary-statistics table from.
pub trait SumstatsSource {
    /// The raw (un-normalized) header names, in column order.
    fn header(&self) -> &[String];

    /// Reads the body with `schema`, in chunks of at most `chunk_rows` rows.
    /// `schema` has one field per header column, in header order.
    fn read_table(&mut self, schema: SchemaRef, chunk_rows: usize) -> Result<ChunkedTable>;
}

/// A tab-delimited text source with a single header line.
///
/// Empty fields are read as nulls.
pub struct TsvSource<R: Read> {
    reader: Option<BufReader<R>>,
    header: Vec<String>,
}

impl<R: Read> TsvSource<R> {
    /// Consumes the header line of `reader`, leaving the body for `read_table`.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(MungeError::schema("the summary statistics file is empty"));
        }
        let header: Vec<String> = line
            .trim_end_matches(['\r', '\n'])
            .split(DELIMITER as char)
            .map(str::to_string)
            .collect();
        debug!("read header with {} columns", header.len());
        Ok(Self {
            reader: Some(reader),
            header,
        })
    }
}

impl TsvSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read> SumstatsSource for TsvSource<R> {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn read_table(&mut self, schema: SchemaRef, chunk_rows: usize) -> Result<ChunkedTable> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| MungeError::Internal("the source body was already read".into()))?;
        if schema.fields().len() != self.header.len() {
            return Err(MungeError::Internal(format!(
                "ingest schema has {} fields for a {}-column header",
                schema.fields().len(),
                self.header.len()
            )));
        }

        let csv = ReaderBuilder::new(schema.clone())
            .with_header(false)
            .with_delimiter(DELIMITER)
            .with_batch_size(chunk_rows)
            .build(reader)?;
        let batches = csv.collect::<std::result::Result<Vec<_>, _>>()?;
        ChunkedTable::try_new(schema, batches)
    }
}
