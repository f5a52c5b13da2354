//! Result row decoding.
//!
//! Rows come back from the driver as [`Record`]s. Two caller-facing shapes are
//! produced from them:
//!
//! - [`StringRow`]: every selected column as text; NULL becomes `""`.
//! - [`ByteRow`]: every selected column as bytes, encoded by logical type.
//!   A cell that does not match its column's logical type is left out of the
//!   row instead of failing it.
//!
//! Byte encodings:
//!
//! | logical type            | bytes                                   |
//! |-------------------------|-----------------------------------------|
//! | String / Enum / Date    | UTF-16LE code units; NULL is empty      |
//! | Int                     | `i32` little-endian                     |
//! | Double                  | `f64` little-endian                     |
//! | Float                   | `f32` little-endian                     |
//! | Bit                     | one byte, `0` or `1`                    |
//! | Blob                    | raw                                     |
//! | Null                    | never present                           |

use crate::catalog::ColumnInfo;
use crate::driver::{Cell, Record};
use crate::types::LogicalType;
use std::collections::HashMap;

/// Column name to text.
pub type StringRow = HashMap<String, String>;

/// Column name to bytes.
pub type ByteRow = HashMap<String, Vec<u8>>;

pub fn decode_string_row(record: &Record, columns: &[&ColumnInfo]) -> StringRow {
    columns
        .iter()
        .map(|col| {
            let value = record.get_string(&col.name).unwrap_or_default();
            (col.name.clone(), value)
        })
        .collect()
}

pub fn decode_byte_row(record: &Record, columns: &[&ColumnInfo]) -> ByteRow {
    let mut row = ByteRow::with_capacity(columns.len());
    for col in columns {
        let Some(cell) = record.cell(&col.name) else {
            continue;
        };
        match encode_cell(col.logical_type, cell) {
            Some(bytes) => {
                row.insert(col.name.clone(), bytes);
            }
            None => {
                tracing::debug!(
                    target: "pgtable",
                    column = %col.name,
                    logical_type = %col.logical_type,
                    cell = cell.kind_name(),
                    "cell omitted from byte row"
                );
            }
        }
    }
    row
}

/// Encode one cell, or `None` when it has no byte form for `ty`.
pub fn encode_cell(ty: LogicalType, cell: &Cell) -> Option<Vec<u8>> {
    match (ty, cell) {
        (LogicalType::String | LogicalType::Enum | LogicalType::Date, Cell::Null) => Some(Vec::new()),
        (LogicalType::String | LogicalType::Enum | LogicalType::Date, Cell::Text(s)) => {
            Some(utf16le(s))
        }
        (LogicalType::Int, Cell::Int(v)) => Some(v.to_le_bytes().to_vec()),
        (LogicalType::Double, Cell::Double(v)) => Some(v.to_le_bytes().to_vec()),
        (LogicalType::Float, Cell::Float(v)) => Some(v.to_le_bytes().to_vec()),
        (LogicalType::Bit, Cell::Bool(b)) => Some(vec![u8::from(*b)]),
        (LogicalType::Blob, Cell::Bytes(b)) => Some(b.clone()),
        _ => None,
    }
}

fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
