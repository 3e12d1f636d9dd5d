//! The Row Filter Engine and its specializations.
//!
//! All row removal in the crate goes through one mechanism: collect the row
//! indices to drop for a chunk, turn them into keep-ranges, and rebuild every
//! column from zero-copy slices of the retained ranges (see `keep_ranges`).
//!
//! - `predicates`: the fixed value rules (`P`, `FRQ`, `INFO`, alleles).
//! - `engine`: applies a `PredicateSet` chunk by chunk and counts drops.
//! - `dedupe`: first-seen-wins on a key column, with a seen-set spanning chunks.

pub mod dedupe;
pub mod engine;
pub mod keep_ranges;
pub mod predicates;

pub use dedupe::dedupe;
pub use engine::{FilterStats, RowFilter};
pub use keep_ranges::{filter_by_drops, keep_ranges, rebuild_batch, KeepRange};
pub use predicates::{filter_allele, filter_frq, filter_info, filter_p, PredicateSet, RowPredicate};
