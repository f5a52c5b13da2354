use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use pgtable::{ByteRow, StringRow, TableSchema};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

pub fn tables_table<'a>(schemas: impl IntoIterator<Item = &'a TableSchema>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["table", "columns"]);
    for schema in schemas {
        table.add_row(vec![
            schema.name().to_string(),
            schema.columns().len().to_string(),
        ]);
    }
    table
}

pub fn describe_table(schema: &TableSchema) -> Table {
    let mut table = new_table();
    table.set_header(vec!["column", "native type", "logical type"]);
    for column in schema.columns() {
        table.add_row(vec![
            column.name.clone(),
            column.native_type.clone(),
            column.logical_type.to_string(),
        ]);
    }
    table
}

/// Rows laid out in `columns` order; a column missing from a row prints empty.
pub fn string_rows_table(columns: &[&str], rows: &[StringRow]) -> Table {
    let mut table = new_table();
    table.set_header(columns.to_vec());
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| row.get(*c).cloned().unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Byte cells print as lowercase hex; an omitted cell prints as `-`.
pub fn byte_rows_table(columns: &[&str], rows: &[ByteRow]) -> Table {
    let mut table = new_table();
    table.set_header(columns.to_vec());
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| row.get(*c).map(|b| hex(b)).unwrap_or_else(|| "-".to_string()))
                .collect::<Vec<_>>(),
        );
    }
    table
}

pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
