//! This file is the root of the `sumstats_munge` Rust crate.
//!
//! The crate cleans GWAS summary statistics held as chunked Arrow record batches:
//! column names are mapped onto a canonical schema, invalid values and duplicate
//! SNPs are removed, and a sample-size column is derived. Its responsibilities
//! here are strictly limited to:
//! 1.  Declaring all the top-level modules of the library.
//! 2.  Re-exporting the public entry points.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod cnames;
pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod sample_size;
pub mod table;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{MungeArgs, MungeConfig};
pub use error::{MungeError, Result};
pub use observability::init_logging;
pub use pipeline::{MemorySink, MungeReport, Munger, SumstatsSource, TableSink, TsvSink, TsvSource};
pub use table::ChunkedTable;

/// Runs the whole pipeline from a file on disk to a file on disk, using the
/// `sumstats` and `out` paths of `config`. Nothing is written when the run fails.
pub fn munge_file(config: MungeConfig) -> Result<MungeReport> {
    let input = config
        .sumstats
        .clone()
        .ok_or_else(|| MungeError::Parse("--sumstats is required".into()))?;
    let output = config
        .out
        .clone()
        .ok_or_else(|| MungeError::Parse("--out is required".into()))?;

    let mut source = TsvSource::open(&input)?;
    log::info!("Munging {} into {}", input.display(), output.display());

    // The output file is only created once every stage has succeeded.
    let mut cleaned = MemorySink::new();
    let report = Munger::new(config).run(&mut source, &mut cleaned)?;
    if let Some(table) = cleaned.table() {
        TsvSink::create(&output)?.write_table(table)?;
    }
    Ok(report)
}
