//! The Field Registry: a fixed classification of canonical column names into
//! numeric and text kinds, used to pick the Arrow storage type of a column.

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field, Schema, SchemaRef};
use serde::{Deserialize, Serialize};

use crate::error::{MungeError, Result};

/// Canonical columns stored as 64-bit floats. Everything else is text.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "P", "FRQ", "INFO", "INFO_LIST", "N", "N_CAS", "N_CON", "NSTUDY",
];

/// The semantic kind of a column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Numeric,
    Text,
}

impl FieldKind {
    /// Looks up the kind of a canonical column name.
    pub fn for_column(canonical: &str) -> Self {
        if NUMERIC_COLUMNS.contains(&canonical) {
            Self::Numeric
        } else {
            Self::Text
        }
    }

    /// Converts an Arrow `DataType` into a `FieldKind`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self> {
        match arrow_type {
            ArrowDataType::Float64 => Ok(Self::Numeric),
            ArrowDataType::Utf8 => Ok(Self::Text),
            dt => Err(MungeError::Internal(format!(
                "Arrow type {:?} has no FieldKind",
                dt
            ))),
        }
    }

    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Numeric => ArrowDataType::Float64,
            Self::Text => ArrowDataType::Utf8,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A nullable field named after a canonical column, typed by the registry.
pub fn canonical_field(canonical: &str) -> Field {
    Field::new(
        canonical,
        FieldKind::for_column(canonical).to_arrow_type(),
        true,
    )
}

/// Builds a schema from `(name, kind)` pairs, rejecting repeated names.
pub fn build_schema<'a, I>(columns: I) -> Result<SchemaRef>
where
    I: IntoIterator<Item = (&'a str, FieldKind)>,
{
    let mut fields: Vec<Field> = Vec::new();
    for (name, kind) in columns {
        if fields.iter().any(|f| f.name() == name) {
            return Err(MungeError::schema(format!(
                "column name {} occurs more than once",
                name
            )));
        }
        fields.push(Field::new(name, kind.to_arrow_type(), true));
    }
    Ok(Arc::new(Schema::new(fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_classification() {
        for name in ["P", "FRQ", "INFO", "N", "N_CAS", "N_CON", "NSTUDY"] {
            assert_eq!(FieldKind::for_column(name), FieldKind::Numeric, "{}", name);
        }
        for name in ["SNP", "A1", "A2", "SIGNED_SUMSTAT", "CHR"] {
            assert_eq!(FieldKind::for_column(name), FieldKind::Text, "{}", name);
        }
    }

    #[test]
    fn test_arrow_type_roundtrip() {
        for kind in [FieldKind::Numeric, FieldKind::Text] {
            assert_eq!(FieldKind::from_arrow_type(&kind.to_arrow_type()).unwrap(), kind);
        }
        assert!(FieldKind::from_arrow_type(&ArrowDataType::Int32).is_err());
    }

    #[test]
    fn test_build_schema_rejects_duplicate_names() {
        let ok = build_schema([("SNP", FieldKind::Text), ("P", FieldKind::Numeric)]).unwrap();
        assert_eq!(ok.fields().len(), 2);
        assert_eq!(ok.field(1).data_type(), &ArrowDataType::Float64);
        assert!(ok.field(0).is_nullable());

        let dup = build_schema([("SNP", FieldKind::Text), ("SNP", FieldKind::Text)]);
        assert!(matches!(dup, Err(MungeError::Schema(_))));
    }
}
