// In: src/cnames/resolver.rs

//! The Column Name Resolver.
//!
//! Merges the user's overrides, the built-in spelling table and the ignore list into
//! one source → canonical mapping for the columns actually present in the header,
//! then validates it. Every validation failure is a `MungeError::Schema` and aborts
//! the run before any data is read.

use arrow::datatypes::SchemaRef;
use hashbrown::{HashMap, HashSet};
use log::info;

use super::defaults::{describe_cname, is_signed_stat, normalize_name, null_value, DEFAULT_CNAMES};
use crate::config::MungeConfig;
use crate::error::{MungeError, Result};
use crate::types::{build_schema, FieldKind};
use crate::utils::count_occurrences;

/// Canonical name given to every `--infolist` column. Several sources may share it;
/// projection folds them into one column.
pub const INFO_LIST: &str = "INFO_LIST";
pub const SIGNED_SUMSTAT: &str = "SIGNED_SUMSTAT";

//==================================================================================
// 1. Resolution Result
//==================================================================================

/// The validated outcome of column-name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CnameResolution {
    /// Normalized header names, in source order. Unique.
    pub header: Vec<String>,
    /// `(source, canonical)` pairs for the retained columns, in source order.
    pub translation: Vec<(String, String)>,
    /// The "no effect" value of the `SIGNED_SUMSTAT` column, when one resolved.
    pub signed_null: Option<f64>,
}

impl CnameResolution {
    pub fn canonical_of(&self, source: &str) -> Option<&str> {
        self.translation
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, c)| c.as_str())
    }

    pub fn has_canonical(&self, canonical: &str) -> bool {
        self.translation.iter().any(|(_, c)| c == canonical)
    }

    /// Canonical names of the retained columns in output order, `INFO_LIST` once.
    pub fn output_columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.translation.len());
        for (_, canonical) in &self.translation {
            if !out.contains(&canonical.as_str()) {
                out.push(canonical);
            }
        }
        out
    }

    /// The schema the ingestion collaborator should read the source with: every header
    /// column, typed by the kind of its canonical target (text when unmapped).
    pub fn ingest_schema(&self) -> Result<SchemaRef> {
        build_schema(self.header.iter().map(|name| {
            let kind = self
                .canonical_of(name)
                .map(FieldKind::for_column)
                .unwrap_or(FieldKind::Text);
            (name.as_str(), kind)
        }))
    }

    /// Logs the "interpreting column names" summary.
    pub fn log_interpretation(&self) {
        info!("Interpreting column names as follows:");
        for (source, canonical) in &self.translation {
            info!("{}:\t{}", source, describe_cname(canonical));
        }
    }
}

//==================================================================================
// 2. Resolution
//==================================================================================

/// Resolves a raw header against the configured overrides, defaults and ignore list.
pub fn resolve(raw_header: &[String], config: &MungeConfig) -> Result<CnameResolution> {
    if config.a1_inc && config.signed_sumstat.is_some() {
        return Err(MungeError::schema(
            "--a1inc and --signedsumstat are mutually exclusive",
        ));
    }

    let header: Vec<String> = raw_header.iter().map(|h| normalize_name(h)).collect();
    for name in &header {
        if count_occurrences(name, &header) > 1 {
            return Err(MungeError::schema(format!(
                "column name {} occurs more than once in the header",
                name
            )));
        }
    }

    let ignore: HashSet<String> = config.ignore.iter().map(|c| normalize_name(c)).collect();
    let flag_cnames = flag_cname_map(config)?;
    let cname_map = merge_cname_maps(&flag_cnames, &default_cname_map(config), &ignore);

    let mut translation: Vec<(String, String)> = header
        .iter()
        .filter_map(|name| cname_map.get(name).map(|c| (name.clone(), c.clone())))
        .collect();

    let signed_null = resolve_signed_sumstat(&mut translation, config)?;

    check_duplicate_targets(&translation)?;
    check_required(&translation, config)?;

    let present = |c: &str| translation.iter().any(|(_, t)| t == c);
    let has_n = present("N");
    let has_case_control = present("N_CAS") && present("N_CON");
    if !has_n && !has_case_control && config.explicit_n.scalar().is_none() {
        return Err(MungeError::schema("Could not determine N."));
    }
    if (has_n || has_case_control) && present("NSTUDY") {
        info!("Dropping NSTUDY: a direct sample-size column is present.");
        translation.retain(|(_, c)| c != "NSTUDY");
    }

    let has_allele = translation.iter().any(|(_, c)| c == "A1" || c == "A2");
    if config.require_alleles && !has_allele {
        return Err(MungeError::schema("Could not find A1/A2 columns."));
    }

    Ok(CnameResolution {
        header,
        translation,
        signed_null,
    })
}

/// Builds the override submap: normalized source name → canonical name.
fn flag_cname_map(config: &MungeConfig) -> Result<HashMap<String, String>> {
    let o = &config.overrides;
    let mut entries: Vec<(&str, &str)> = [
        (&o.nstudy, "NSTUDY"),
        (&o.snp, "SNP"),
        (&o.n, "N"),
        (&o.n_cas, "N_CAS"),
        (&o.n_con, "N_CON"),
        (&o.a1, "A1"),
        (&o.a2, "A2"),
        (&o.p, "P"),
        (&o.frq, "FRQ"),
        (&o.info, "INFO"),
    ]
    .into_iter()
    .filter_map(|(source, canonical)| source.as_deref().map(|s| (s, canonical)))
    .collect();
    entries.extend(o.info_list.iter().map(|s| (s.as_str(), INFO_LIST)));
    if let Some(signed) = &config.signed_sumstat {
        entries.push((signed.column.as_str(), SIGNED_SUMSTAT));
    }

    let mut map: HashMap<String, String> = HashMap::new();
    for (source, canonical) in entries {
        let source = normalize_name(source);
        if source.is_empty() {
            continue;
        }
        if let Some(previous) = map.insert(source.clone(), canonical.to_string()) {
            if previous != canonical {
                return Err(MungeError::schema(format!(
                    "column {} was given for both {} and {}",
                    source, previous, canonical
                )));
            }
        }
    }
    Ok(map)
}

/// The default spelling table, minus the signed statistics when the user has
/// already said how effect direction is carried.
fn default_cname_map(config: &MungeConfig) -> HashMap<String, String> {
    let drop_signed = config.a1_inc || config.signed_sumstat.is_some();
    DEFAULT_CNAMES
        .iter()
        .filter(|(_, canonical)| !(drop_signed && is_signed_stat(canonical)))
        .map(|(source, canonical)| (source.to_string(), canonical.to_string()))
        .collect()
}

/// Overrides win over defaults; anything whose source or target is ignored is dropped.
fn merge_cname_maps(
    flags: &HashMap<String, String>,
    defaults: &HashMap<String, String>,
    ignore: &HashSet<String>,
) -> HashMap<String, String> {
    let kept = |source: &String, canonical: &String| {
        !ignore.contains(source) && !ignore.contains(canonical)
    };
    let mut merged: HashMap<String, String> = flags
        .iter()
        .filter(|(s, c)| kept(*s, *c))
        .map(|(s, c)| (s.clone(), c.clone()))
        .collect();
    for (source, canonical) in defaults {
        if kept(source, canonical) && !flags.contains_key(source) {
            merged.insert(source.clone(), canonical.clone());
        }
    }
    merged
}

/// Re-points the signed statistic to `SIGNED_SUMSTAT` and returns its null value.
///
/// An explicit `--signedsumstat` is already mapped by the overrides. Otherwise a single
/// default signed column (`Z`, `OR`, `BETA`, `LOG_ODDS`) is picked up automatically.
fn resolve_signed_sumstat(
    translation: &mut [(String, String)],
    config: &MungeConfig,
) -> Result<Option<f64>> {
    if let Some(signed) = &config.signed_sumstat {
        return Ok(Some(signed.null_value));
    }
    if config.a1_inc {
        return Ok(None);
    }

    let signed: Vec<usize> = translation
        .iter()
        .enumerate()
        .filter(|(_, (_, c))| is_signed_stat(c))
        .map(|(i, _)| i)
        .collect();
    match signed.as_slice() {
        [] => Ok(None),
        [idx] => {
            let null = null_value(&translation[*idx].1);
            translation[*idx].1 = SIGNED_SUMSTAT.to_string();
            Ok(null)
        }
        _ => {
            let names: Vec<&str> = signed.iter().map(|i| translation[*i].0.as_str()).collect();
            Err(MungeError::schema(format!(
                "found {} signed summary statistic columns ({}); choose one with --signedsumstat",
                names.len(),
                names.join(", ")
            )))
        }
    }
}

fn check_duplicate_targets(translation: &[(String, String)]) -> Result<()> {
    let targets: Vec<&str> = translation.iter().map(|(_, c)| c.as_str()).collect();
    for (source, canonical) in translation {
        if canonical == INFO_LIST {
            continue;
        }
        if count_occurrences(&canonical.as_str(), &targets) > 1 {
            let sources: Vec<&str> = translation
                .iter()
                .filter(|(_, c)| c == canonical)
                .map(|(s, _)| s.as_str())
                .collect();
            return Err(MungeError::schema(format!(
                "column name {} is produced by more than one source column ({}); first seen at {}",
                canonical,
                sources.join(", "),
                source
            )));
        }
    }
    Ok(())
}

fn check_required(translation: &[(String, String)], config: &MungeConfig) -> Result<()> {
    let mut required = vec!["SNP", "P"];
    if config.signed_sumstat.is_some() {
        required.push(SIGNED_SUMSTAT);
    }
    for col in required {
        if !translation.iter().any(|(_, c)| c == col) {
            return Err(MungeError::schema(format!("missing required column: {}", col)));
        }
    }
    Ok(())
}
