//! In-memory snapshot of table and column metadata.
//!
//! The catalog is loaded once per [`Database`](crate::Database) and never
//! mutated afterwards. Every builder resolves table and column names through
//! it, so a typo surfaces as [`TableError::UnknownTable`] or
//! [`TableError::UnknownColumn`] before any SQL is sent.

use crate::driver::{ColumnDescription, Driver};
use crate::error::{DriverResult, TableError, TableResult};
use crate::types::{LogicalType, is_wire_native};
use serde::Serialize;
use std::collections::HashMap;


/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Type name as reported by the database (e.g. `character varying(20)`).
    pub native_type: String,
    pub logical_type: LogicalType,
}

impl ColumnInfo {
    pub fn from_description(desc: ColumnDescription) -> Self {
        let logical_type = LogicalType::from_native(&desc.native_type);
        Self {
            name: desc.name,
            native_type: desc.native_type,
            logical_type,
        }
    }

    /// Whether the server converts this column to and from text; reads
    /// select `col::text`.
    pub fn is_server_converted(&self) -> bool {
        !is_wire_native(&self.native_type)
    }

    /// The type to cast a text parameter to, for server-converted columns.
    ///
    /// `None` for wire-native types, and for type names that are not plain
    /// type syntax.
    pub fn text_cast(&self) -> Option<&str> {
        if !self.is_server_converted() {
            return None;
        }
        let plain = !self.native_type.is_empty()
            && self.native_type.chars().all(|c| {
                c.is_ascii_alphanumeric()
                    || matches!(c, '_' | ' ' | ',' | '(' | ')' | '[' | ']' | '.' | '"')
            });
        plain.then_some(self.native_type.as_str())
    }
}

/// Columns of one table, in table order.
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnInfo>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescription>) -> Self {
        let columns: Vec<ColumnInfo> = columns
            .into_iter()
            .map(ColumnInfo::from_description)
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            name: name.into(),
            columns,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column(&self, column: &str) -> Option<&ColumnInfo> {
        self.index.get(column).map(|&i| &self.columns[i])
    }

    pub fn type_of(&self, column: &str) -> Option<LogicalType> {
        self.column(column).map(|c| c.logical_type)
    }

    /// Checked lookup of a column.
    pub fn resolve_column(&self, column: &str) -> TableResult<&ColumnInfo> {
        self.column(column)
            .ok_or_else(|| TableError::unknown_column(&self.name, column))
    }

    /// Checked lookup of a column's logical type.
    pub fn resolve(&self, column: &str) -> TableResult<LogicalType> {
        self.type_of(column)
            .ok_or_else(|| TableError::unknown_column(&self.name, column))
    }
}

/// All tables of the connected schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// A catalog with no tables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-described tables, keeping their order.
    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<ColumnDescription>)>,
        S: Into<String>,
    {
        let tables: Vec<TableSchema> = tables
            .into_iter()
            .map(|(name, cols)| TableSchema::new(name, cols))
            .collect();
        let index = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self { tables, index }
    }

    /// Introspect every table through `driver`.
    ///
    /// All or nothing: if listing tables or describing any one of them fails,
    /// the error is returned and no partial catalog is produced.
    pub async fn load<D: Driver>(driver: &D) -> DriverResult<Self> {
        let names = driver.list_tables().await?;
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = driver.describe_columns(&name).await?;
            tables.push((name, columns));
        }
        Ok(Self::from_tables(tables))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.index.contains_key(table)
    }

    /// Table names in load order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Checked table lookup.
    pub fn table(&self, table: &str) -> TableResult<&TableSchema> {
        self.index
            .get(table)
            .map(|&i| &self.tables[i])
            .ok_or_else(|| TableError::UnknownTable(table.to_string()))
    }

    /// Column names of `table`, in table order.
    pub fn columns_of(&self, table: &str) -> TableResult<Vec<&str>> {
        Ok(self.table(table)?.column_names().collect())
    }

    /// Logical type of `table.column`.
    pub fn resolve_type(&self, table: &str, column: &str) -> TableResult<LogicalType> {
        self.table(table)?.resolve(column)
    }
}
