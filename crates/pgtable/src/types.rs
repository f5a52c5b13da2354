//! Logical column types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a database-native column type.
///
/// The logical type decides how caller values are coerced before binding and
/// which comparison operator a predicate uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Null,
    Int,
    String,
    Date,
    Bit,
    Enum,
    Double,
    Blob,
    Float,
}

/// Substring rules, checked in order against the upper-cased native type name.
const NATIVE_RULES: [(&str, LogicalType); 8] = [
    ("VARCHAR", LogicalType::String),
    ("INT", LogicalType::Int),
    ("DATE", LogicalType::Date),
    ("BIT", LogicalType::Bit),
    ("ENUM", LogicalType::Enum),
    ("DOUBLE", LogicalType::Double),
    ("BLOB", LogicalType::Blob),
    ("FLOAT", LogicalType::Float),
];

/// Postgres spellings, consulted only when no rule in `NATIVE_RULES` matched.
const PG_SYNONYMS: [(&str, LogicalType); 6] = [
    ("CHAR", LogicalType::String),
    ("TEXT", LogicalType::String),
    ("BYTEA", LogicalType::Blob),
    ("REAL", LogicalType::Float),
    ("BOOL", LogicalType::Bit),
    ("TIMESTAMP", LogicalType::Date),
];

impl LogicalType {
    /// Classify a native type name such as `integer`, `character varying(20)` or `bit(1)`.
    ///
    /// Matching is by case-insensitive substring, so `interval` classifies as `Int`.
    pub fn from_native(native: &str) -> Self {
        let upper = native.to_uppercase();
        NATIVE_RULES
            .iter()
            .chain(PG_SYNONYMS.iter())
            .find(|(needle, _)| upper.contains(needle))
            .map(|(_, ty)| *ty)
            .unwrap_or(Self::Null)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int => "int",
            Self::String => "string",
            Self::Date => "date",
            Self::Bit => "bit",
            Self::Enum => "enum",
            Self::Double => "double",
            Self::Blob => "blob",
            Self::Float => "float",
        }
    }

    /// Whether predicates on this type use `LIKE` instead of `=`.
    pub fn uses_pattern_match(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// Postgres types the driver binds and decodes itself, by base name with type
/// modifiers removed. Values of any other type travel as text and are
/// converted by the server.
const WIRE_TYPES: &[&str] = &[
    "smallint",
    "integer",
    "bigint",
    "int",
    "int2",
    "int4",
    "int8",
    "real",
    "double precision",
    "float4",
    "float8",
    "boolean",
    "bool",
    "bytea",
    "bit",
    "bit varying",
    "varbit",
    "date",
    "timestamp",
    "timestamp without time zone",
    "timestamp with time zone",
    "timestamptz",
    "uuid",
    "json",
    "jsonb",
    "text",
    "character varying",
    "varchar",
    "character",
    "char",
    "bpchar",
    "name",
    "citext",
    "enum",
];

/// Whether values of `native` (as `format_type` prints it) are exchanged in
/// binary form. `numeric(10,2)`, `time`, `interval` and arrays are not.
pub fn is_wire_native(native: &str) -> bool {
    WIRE_TYPES.contains(&base_type_name(native).as_str())
}

/// `timestamp(3) with time zone` -> `timestamp with time zone`.
fn base_type_name(native: &str) -> String {
    let mut out = String::with_capacity(native.len());
    let mut depth = 0usize;
    for c in native.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_ascii_lowercase()
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
