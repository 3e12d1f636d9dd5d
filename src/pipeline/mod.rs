//! The end-to-end munging pipeline and its ingestion/emission collaborators.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod driver;
pub mod project;
pub mod report;
pub mod sink;
pub mod source;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::driver::{Munger, KEY_COLUMN};
pub use self::report::MungeReport;
pub use self::sink::{MemorySink, TableSink, TsvSink};
pub use self::source::{SumstatsSource, TsvSource};
