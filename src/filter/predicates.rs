//! Per-value drop rules.
//!
//! Every rule answers "should this row be dropped?" for one value. The free
//! functions are the fixed policy; `RowPredicate` wraps a rule together with the
//! label its drops are counted under, and `PredicateSet` maps canonical column
//! names to predicates.
//!
//! `A1` and `A2` share one allele predicate, and `INFO` and `INFO_LIST` share one
//! INFO predicate; both pairs count their drops under a single label.

use crate::config::MungeConfig;
use crate::utils::in_list;

const VALID_ALLELES: [&str; 4] = ["A", "C", "G", "T"];

//==================================================================================
// 1. Fixed Policy
//==================================================================================

/// Drops p-values outside `[0, 1)`.
pub fn filter_p(p: f64) -> bool {
    p >= 1.0 || p < 0.0
}

/// Drops frequencies outside `[0, 1]` and those at or below `maf_min`.
pub fn filter_frq(frq: f64, maf_min: f64) -> bool {
    frq > 1.0 || frq < 0.0 || frq <= maf_min
}

/// Drops INFO scores outside `[0, 2]` and those at or below `info_min`.
pub fn filter_info(info: f64, info_min: f64) -> bool {
    info > 2.0 || info < 0.0 || info <= info_min
}

/// Drops anything that is not a single A/C/G/T base, case-insensitively.
pub fn filter_allele(allele: &str) -> bool {
    let upper = allele.to_ascii_uppercase();
    !in_list(&upper.as_str(), &VALID_ALLELES)
}

//==================================================================================
// 2. Predicates
//==================================================================================

type NumericRule = Box<dyn Fn(f64) -> bool + Send + Sync>;
type TextRule = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A drop rule over one column's values. Null values are never dropped by a predicate.
pub enum RowPredicate {
    Numeric { label: String, drops: NumericRule },
    Text { label: String, drops: TextRule },
}

impl RowPredicate {
    pub fn numeric(label: &str, drops: impl Fn(f64) -> bool + Send + Sync + 'static) -> Self {
        RowPredicate::Numeric {
            label: label.to_string(),
            drops: Box::new(drops),
        }
    }

    pub fn text(label: &str, drops: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        RowPredicate::Text {
            label: label.to_string(),
            drops: Box::new(drops),
        }
    }

    pub fn p() -> Self {
        Self::numeric("P", filter_p)
    }

    pub fn frq(maf_min: f64) -> Self {
        Self::numeric("FRQ", move |v| filter_frq(v, maf_min))
    }

    pub fn info(info_min: f64) -> Self {
        Self::numeric("INFO", move |v| filter_info(v, info_min))
    }

    pub fn allele() -> Self {
        Self::text("A", filter_allele)
    }

    /// The counter this predicate's drops are reported under.
    pub fn label(&self) -> &str {
        match self {
            RowPredicate::Numeric { label, .. } | RowPredicate::Text { label, .. } => label,
        }
    }
}

impl std::fmt::Debug for RowPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowPredicate::Numeric { label, .. } => write!(f, "Numeric({})", label),
            RowPredicate::Text { label, .. } => write!(f, "Text({})", label),
        }
    }
}

/// Canonical column name → predicate.
#[derive(Debug, Default)]
pub struct PredicateSet {
    entries: Vec<(String, RowPredicate)>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed value policy with the given thresholds.
    pub fn standard(maf_min: f64, info_min: f64) -> Self {
        Self::new()
            .with("P", RowPredicate::p())
            .with("FRQ", RowPredicate::frq(maf_min))
            .with("INFO", RowPredicate::info(info_min))
            .with("INFO_LIST", RowPredicate::info(info_min))
            .with("A1", RowPredicate::allele())
            .with("A2", RowPredicate::allele())
    }

    pub fn from_config(config: &MungeConfig) -> Self {
        Self::standard(config.maf_min, config.info_min)
    }

    /// Adds (or replaces) the predicate for `column`.
    pub fn with(mut self, column: &str, predicate: RowPredicate) -> Self {
        self.entries.retain(|(c, _)| c != column);
        self.entries.push((column.to_string(), predicate));
        self
    }

    pub fn get(&self, column: &str) -> Option<&RowPredicate> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, p)| p)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
