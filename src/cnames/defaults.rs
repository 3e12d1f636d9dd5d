//! Built-in column spelling tables.
//!
//! Keys of `DEFAULT_CNAMES` are already in normalized form (see `normalize_name`),
//! so they can be compared directly against a normalized header.

/// Source spelling → canonical name.
pub const DEFAULT_CNAMES: &[(&str, &str)] = &[
    // RS NUMBER
    ("SNP", "SNP"),
    ("MARKERNAME", "SNP"),
    ("SNPID", "SNP"),
    ("RS", "SNP"),
    ("RSID", "SNP"),
    ("RS_NUMBER", "SNP"),
    ("RS_NUMBERS", "SNP"),
    // NUMBER OF STUDIES
    ("NSTUDY", "NSTUDY"),
    ("N_STUDY", "NSTUDY"),
    ("NSTUDIES", "NSTUDY"),
    ("N_STUDIES", "NSTUDY"),
    // P-VALUE
    ("P", "P"),
    ("PVALUE", "P"),
    ("P_VALUE", "P"),
    ("PVAL", "P"),
    ("P_VAL", "P"),
    ("GC_PVALUE", "P"),
    // ALLELE 1
    ("A1", "A1"),
    ("ALLELE1", "A1"),
    ("ALLELE_1", "A1"),
    ("EFFECT_ALLELE", "A1"),
    ("REFERENCE_ALLELE", "A1"),
    ("INC_ALLELE", "A1"),
    ("EA", "A1"),
    // ALLELE 2
    ("A2", "A2"),
    ("ALLELE2", "A2"),
    ("ALLELE_2", "A2"),
    ("OTHER_ALLELE", "A2"),
    ("NON_EFFECT_ALLELE", "A2"),
    ("DEC_ALLELE", "A2"),
    ("NEA", "A2"),
    // N
    ("N", "N"),
    ("WEIGHT", "N"),
    ("NCASE", "N_CAS"),
    ("CASES_N", "N_CAS"),
    ("N_CASE", "N_CAS"),
    ("N_CASES", "N_CAS"),
    ("N_CAS", "N_CAS"),
    ("NCONTROL", "N_CON"),
    ("CONTROLS_N", "N_CON"),
    ("N_CONTROL", "N_CON"),
    ("N_CONTROLS", "N_CON"),
    ("N_CON", "N_CON"),
    // SIGNED STATISTICS
    ("ZSCORE", "Z"),
    ("Z_SCORE", "Z"),
    ("GC_ZSCORE", "Z"),
    ("Z", "Z"),
    ("OR", "OR"),
    ("B", "BETA"),
    ("BETA", "BETA"),
    ("LOG_ODDS", "LOG_ODDS"),
    ("EFFECTS", "BETA"),
    ("EFFECT", "BETA"),
    ("SIGNED_SUMSTAT", "SIGNED_SUMSTAT"),
    // INFO
    ("INFO", "INFO"),
    // FREQUENCY
    ("EAF", "FRQ"),
    ("FRQ", "FRQ"),
    ("MAF", "FRQ"),
    ("FRQ_U", "FRQ"),
    ("F_U", "FRQ"),
];

/// Signed statistics and the value that means "no effect".
pub const NULL_VALUES: &[(&str, f64)] = &[("LOG_ODDS", 0.0), ("BETA", 0.0), ("OR", 1.0), ("Z", 0.0)];

const DESCRIBE_CNAME: &[(&str, &str)] = &[
    ("SNP", "Variant ID (e.g., rs number)"),
    ("P", "p-Value"),
    ("A1", "Allele 1, interpreted as ref allele for signed sumstat."),
    ("A2", "Allele 2, interpreted as non-ref allele for signed sumstat."),
    ("N", "Sample size"),
    ("N_CAS", "Number of cases"),
    ("N_CON", "Number of controls"),
    ("Z", "Z-score (0 --> no effect; above 0 --> A1 is trait/risk increasing)"),
    ("OR", "Odds ratio (1 --> no effect; above 1 --> A1 is risk increasing)"),
    (
        "BETA",
        "[linear/logistic] regression coefficient (0 --> no effect; above 0 --> A1 is trait/risk increasing)",
    ),
    ("LOG_ODDS", "Log odds ratio (0 --> no effect; above 0 --> A1 is risk increasing)"),
    ("INFO", "INFO score (imputation quality; higher --> better imputation)"),
    ("INFO_LIST", "Mean of the INFO columns listed with --infolist"),
    ("FRQ", "Allele frequency"),
    ("SIGNED_SUMSTAT", "Directional summary statistic as specified by --signedsumstat."),
    ("NSTUDY", "Number of studies in which the SNP was genotyped."),
];

/// Human-readable description of a canonical column, for the resolution log.
pub fn describe_cname(canonical: &str) -> &'static str {
    DESCRIBE_CNAME
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, desc)| *desc)
        .unwrap_or("")
}

/// The "no effect" value of a signed statistic, or `None` if `canonical` is not one.
pub fn null_value(canonical: &str) -> Option<f64> {
    NULL_VALUES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, v)| *v)
}

pub fn is_signed_stat(canonical: &str) -> bool {
    null_value(canonical).is_some()
}

/// Normalizes a column name: whitespace is removed, every run of other
/// non-alphanumeric characters becomes a single `_` (none at either end), and the
/// result is upper-cased.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
