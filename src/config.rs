// In: src/config.rs

//! The single source of truth for all munging configuration.
//!
//! Options arrive at the application boundary as a flat map of strings (the way a
//! flag parser hands them over). `MungeArgs` is that raw map, deserialized with
//! `serde`; `MungeConfig::from_args` turns it into typed settings once, raising
//! `MungeError::Parse` for anything malformed. The typed config is then passed
//! down read-only to the resolver, the filters and the sample-size deriver.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MungeError, Result};

//==================================================================================
// I. Raw Options
//==================================================================================

/// The raw, string-valued option map. Every field is optional; an empty string is
/// treated the same as an absent option. Unknown keys are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MungeArgs {
    #[serde(default)]
    pub sumstats: Option<String>,
    #[serde(default)]
    pub out: Option<String>,
    /// `column,null_value`
    #[serde(default)]
    pub signedsumstat: Option<String>,
    #[serde(default)]
    pub ncol: Option<String>,
    #[serde(default)]
    pub nstudy: Option<String>,
    #[serde(default)]
    pub snp: Option<String>,
    #[serde(default)]
    pub ncascol: Option<String>,
    #[serde(default)]
    pub nconcol: Option<String>,
    #[serde(default)]
    pub a1: Option<String>,
    #[serde(default)]
    pub a2: Option<String>,
    #[serde(default)]
    pub p: Option<String>,
    #[serde(default)]
    pub frq: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    /// Comma-separated list of INFO columns.
    #[serde(default)]
    pub infolist: Option<String>,
    #[serde(default)]
    pub a1inc: Option<String>,
    /// Comma-separated list of columns to ignore.
    #[serde(default)]
    pub ignore: Option<String>,
    #[serde(default)]
    pub mafmin: Option<String>,
    #[serde(default)]
    pub infomin: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub ncas: Option<String>,
    #[serde(default)]
    pub ncon: Option<String>,
    #[serde(default)]
    pub noalleles: Option<String>,
    #[serde(default)]
    pub chunksize: Option<String>,
}

impl MungeArgs {
    /// Builds the raw options from a flag-name → value map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::to_value(map)?)?)
    }

    /// Builds the raw options from a JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

//==================================================================================
// II. Typed Configuration
//==================================================================================

/// User overrides naming which source column feeds a canonical column.
/// Values are raw (un-normalized) source column names.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ColumnOverrides {
    pub snp: Option<String>,
    pub p: Option<String>,
    pub a1: Option<String>,
    pub a2: Option<String>,
    pub frq: Option<String>,
    pub info: Option<String>,
    pub info_list: Vec<String>,
    pub n: Option<String>,
    pub n_cas: Option<String>,
    pub n_con: Option<String>,
    pub nstudy: Option<String>,
}

/// A source column declared as the signed summary statistic, with the value that
/// means "no effect".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SignedSumstat {
    pub column: String,
    pub null_value: f64,
}

/// Sample-size values supplied on the command line rather than read from the data.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplicitN {
    pub n: Option<f64>,
    pub n_cas: Option<f64>,
    pub n_con: Option<f64>,
}

impl ExplicitN {
    /// The scalar sample size these arguments describe, if any. A constant `n`
    /// wins over a case/control pair.
    pub fn scalar(&self) -> Option<f64> {
        match (self.n, self.n_cas, self.n_con) {
            (Some(n), _, _) => Some(n),
            (None, Some(cas), Some(con)) => Some(cas + con),
            _ => None,
        }
    }
}

/// The unified configuration for one munging run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MungeConfig {
    pub sumstats: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub overrides: ColumnOverrides,
    pub signed_sumstat: Option<SignedSumstat>,
    /// Raw names of columns to ignore, matched against both source and canonical names.
    pub ignore: Vec<String>,
    /// A1 is the increasing allele; no signed statistic is required.
    pub a1_inc: bool,
    /// At least one of `A1`/`A2` must resolve.
    pub require_alleles: bool,
    /// `FRQ` values at or below this are dropped.
    pub maf_min: f64,
    /// `INFO` values at or below this are dropped.
    pub info_min: f64,
    pub explicit_n: ExplicitN,
    /// Maximum rows per chunk handed out by the ingestion collaborator.
    pub chunk_rows: usize,
}

impl Default for MungeConfig {
    fn default() -> Self {
        Self {
            sumstats: None,
            out: None,
            overrides: ColumnOverrides::default(),
            signed_sumstat: None,
            ignore: Vec::new(),
            a1_inc: false,
            require_alleles: true,
            maf_min: default_maf_min(),
            info_min: default_info_min(),
            explicit_n: ExplicitN::default(),
            chunk_rows: default_chunk_rows(),
        }
    }
}

impl MungeConfig {
    /// Parses the raw option map into typed settings.
    pub fn from_args(args: &MungeArgs) -> Result<Self> {
        let explicit_n = ExplicitN {
            n: parse_f64("n", &args.n)?,
            n_cas: parse_f64("ncas", &args.ncas)?,
            n_con: parse_f64("ncon", &args.ncon)?,
        };
        if explicit_n.n.is_none() && (explicit_n.n_cas.is_some() != explicit_n.n_con.is_some()) {
            return Err(MungeError::parse("--ncas and --ncon must be given together"));
        }

        let chunk_rows = match non_empty(&args.chunksize) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| MungeError::parse(format!("chunksize: invalid value '{}'", raw)))?,
            None => default_chunk_rows(),
        };

        Ok(Self {
            sumstats: non_empty(&args.sumstats).map(PathBuf::from),
            out: non_empty(&args.out).map(PathBuf::from),
            overrides: ColumnOverrides {
                snp: non_empty(&args.snp).map(str::to_string),
                p: non_empty(&args.p).map(str::to_string),
                a1: non_empty(&args.a1).map(str::to_string),
                a2: non_empty(&args.a2).map(str::to_string),
                frq: non_empty(&args.frq).map(str::to_string),
                info: non_empty(&args.info).map(str::to_string),
                info_list: split_list(&args.infolist),
                n: non_empty(&args.ncol).map(str::to_string),
                n_cas: non_empty(&args.ncascol).map(str::to_string),
                n_con: non_empty(&args.nconcol).map(str::to_string),
                nstudy: non_empty(&args.nstudy).map(str::to_string),
            },
            signed_sumstat: non_empty(&args.signedsumstat)
                .map(parse_signed_sumstat)
                .transpose()?,
            ignore: split_list(&args.ignore),
            a1_inc: parse_bool("a1inc", &args.a1inc)?.unwrap_or(false),
            require_alleles: !parse_bool("noalleles", &args.noalleles)?.unwrap_or(false),
            maf_min: parse_f64("mafmin", &args.mafmin)?.unwrap_or_else(default_maf_min),
            info_min: parse_f64("infomin", &args.infomin)?.unwrap_or_else(default_info_min),
            explicit_n,
            chunk_rows,
        })
    }
}

fn default_maf_min() -> f64 {
    0.0
}

fn default_info_min() -> f64 {
    0.05
}

fn default_chunk_rows() -> usize {
    200
}

//==================================================================================
// III. Option Parsing Helpers
//==================================================================================

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn split_list(raw: &Option<String>) -> Vec<String> {
    non_empty(raw)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_f64(option: &str, raw: &Option<String>) -> Result<Option<f64>> {
    non_empty(raw)
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| MungeError::parse(format!("{}: invalid number '{}' ({})", option, s, e)))
        })
        .transpose()
}

fn parse_bool(option: &str, raw: &Option<String>) -> Result<Option<bool>> {
    non_empty(raw)
        .map(|s| match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Ok(true),
            "false" | "f" | "0" | "no" => Ok(false),
            _ => Err(MungeError::parse(format!("{}: invalid boolean '{}'", option, s))),
        })
        .transpose()
}

fn parse_signed_sumstat(raw: &str) -> Result<SignedSumstat> {
    let mut parts = raw.splitn(2, ',');
    let column = parts.next().map(str::trim).unwrap_or_default();
    let null_raw = parts.next().map(str::trim).unwrap_or_default();
    if column.is_empty() || null_raw.is_empty() {
        return Err(MungeError::parse(format!(
            "signedsumstat: expected 'column,null_value', got '{}'",
            raw
        )));
    }
    let null_value = null_raw.parse::<f64>().map_err(|e| {
        MungeError::parse(format!("signedsumstat: invalid null value '{}' ({})", null_raw, e))
    })?;
    Ok(SignedSumstat {
        column: column.to_string(),
        null_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> MungeArgs {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MungeArgs::from_map(&map).unwrap()
    }

    #[test]
    fn test_defaults_from_empty_args() {
        let config = MungeConfig::from_args(&MungeArgs::default()).unwrap();
        assert_eq!(config.chunk_rows, 200);
        assert_eq!(config.maf_min, 0.0);
        assert_eq!(config.info_min, 0.05);
        assert!(config.require_alleles);
        assert!(!config.a1_inc);
        assert_eq!(config.explicit_n.scalar(), None);
    }

    #[test]
    fn test_full_option_map_is_typed() {
        let config = MungeConfig::from_args(&args(&[
            ("sumstats", "study.tsv"),
            ("snp", "MarkerName"),
            ("infolist", "INFO1, INFO2"),
            ("ignore", "CHR,BP"),
            ("a1inc", "true"),
            ("noalleles", "true"),
            ("mafmin", "0.01"),
            ("ncas", "1000"),
            ("ncon", "4000"),
            ("chunksize", "50"),
            ("unknown_flag", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.sumstats, Some(PathBuf::from("study.tsv")));
        assert_eq!(config.overrides.snp.as_deref(), Some("MarkerName"));
        assert_eq!(config.overrides.info_list, vec!["INFO1", "INFO2"]);
        assert_eq!(config.ignore, vec!["CHR", "BP"]);
        assert!(config.a1_inc);
        assert!(!config.require_alleles);
        assert_eq!(config.maf_min, 0.01);
        assert_eq!(config.explicit_n.scalar(), Some(5000.0));
        assert_eq!(config.chunk_rows, 50);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let config = MungeConfig::from_args(&args(&[("n", ""), ("signedsumstat", "")])).unwrap();
        assert_eq!(config.explicit_n.n, None);
        assert_eq!(config.signed_sumstat, None);
    }

    #[test]
    fn test_malformed_numbers_are_parse_errors() {
        for (k, v) in [("n", "lots"), ("mafmin", "0.o1"), ("chunksize", "0"), ("a1inc", "maybe")] {
            let result = MungeConfig::from_args(&args(&[(k, v)]));
            assert!(matches!(result, Err(MungeError::Parse(_))), "{}={}", k, v);
        }
    }

    #[test]
    fn test_signed_sumstat_parsing() {
        let config = MungeConfig::from_args(&args(&[("signedsumstat", "OR,1")])).unwrap();
        assert_eq!(
            config.signed_sumstat,
            Some(SignedSumstat { column: "OR".into(), null_value: 1.0 })
        );

        let missing_null = MungeConfig::from_args(&args(&[("signedsumstat", "OR")]));
        assert!(matches!(missing_null, Err(MungeError::Parse(_))));
    }

    #[test]
    fn test_half_case_control_pair_is_rejected() {
        let result = MungeConfig::from_args(&args(&[("ncas", "10")]));
        assert!(matches!(result, Err(MungeError::Parse(_))));
    }

    #[test]
    fn test_from_json() {
        let raw = MungeArgs::from_json(r#"{"p": "PVAL", "mafmin": "0.05"}"#).unwrap();
        let config = MungeConfig::from_args(&raw).unwrap();
        assert_eq!(config.overrides.p.as_deref(), Some("PVAL"));
        assert_eq!(config.maf_min, 0.05);
    }
}
