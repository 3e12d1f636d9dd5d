// In: src/pipeline/driver.rs

//! The Pipeline Driver.
//!
//! Runs the stages strictly in order: resolve names → ingest → project → value
//! filters → duplicate-key filter → sample size → emit. Each stage consumes the whole
//! table produced by the previous one. The sink is only reached after every stage has
//! succeeded, so a failed run never leaves partial output behind.

use log::info;

use super::project::project;
use super::report::MungeReport;
use super::sink::TableSink;
use super::source::SumstatsSource;
use crate::cnames::resolve;
use crate::config::MungeConfig;
use crate::error::Result;
use crate::filter::{dedupe, PredicateSet, RowFilter};
use crate::observability::StageTimer;
use crate::sample_size::derive_sample_size;

/// The column duplicates are detected on.
pub const KEY_COLUMN: &str = "SNP";

/// A configured munging run.
#[derive(Debug)]
pub struct Munger {
    config: MungeConfig,
    filter: RowFilter,
}

impl Munger {
    pub fn new(config: MungeConfig) -> Self {
        let filter = RowFilter::new(PredicateSet::from_config(&config));
        Self { config, filter }
    }

    /// Replaces the value predicates derived from the configuration.
    pub fn with_predicates(mut self, predicates: PredicateSet) -> Self {
        self.filter = RowFilter::new(predicates);
        self
    }

    /// Executes every stage and hands the cleaned table to `sink`.
    pub fn run(&self, source: &mut dyn SumstatsSource, sink: &mut dyn TableSink) -> Result<MungeReport> {
        let _timer = StageTimer::start("munge");

        // --- 1. Resolve column names; nothing is read before this succeeds ---
        let resolution = resolve(source.header(), &self.config)?;
        resolution.log_interpretation();

        // --- 2. Ingest ---
        let table = source.read_table(resolution.ingest_schema()?, self.config.chunk_rows)?;
        let rows_read = table.num_rows();
        info!("Read summary statistics for {} SNPs.", rows_read);

        // --- 3. Project onto canonical columns ---
        let table = project(table, &resolution)?;

        // --- 4. Value filters ---
        let (table, value_filters) = self.filter.filter_table(table)?;

        // --- 5. Duplicate keys ---
        let (table, duplicates) = dedupe(table, KEY_COLUMN)?;

        // --- 6. Sample size ---
        let (table, sample_size) = derive_sample_size(table, &self.config.explicit_n)?;

        // --- 7. Emit ---
        sink.write_table(&table)?;
        info!("Writing summary statistics for {} SNPs.", table.num_rows());

        Ok(MungeReport {
            rows_read,
            signed_null: resolution.signed_null,
            translation: resolution.translation,
            value_filters,
            duplicates,
            sample_size,
            rows_written: table.num_rows(),
            output_schema: table.schema().as_ref().clone(),
            writer_version: crate::VERSION.to_string(),
        })
    }
}
