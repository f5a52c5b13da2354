//! INSERT / UPDATE / DELETE / SELECT construction.
//!
//! Builders take a [`TableSchema`] so every referenced column is checked and
//! typed before text is produced. Values are coerced with the rules in
//! [`crate::value`] and bound in the order their placeholders appear.

use crate::catalog::{ColumnInfo, TableSchema};
use crate::error::{OpKind, TableError, TableResult};
use crate::predicate::{Predicate, build_where, build_where_all_and, build_where_greater_than};
use crate::sql::Sql;
use crate::types::LogicalType;
use crate::value::{BoundValue, coerce, coerce_bytes, coerce_for_update};


/// Values to write: string-valued pairs followed by byte-valued pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAssignment {
    text: Vec<(String, String)>,
    bytes: Vec<(String, Vec<u8>)>,
}

impl RowAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// String-valued pairs only.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            text: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            bytes: Vec::new(),
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((column.into(), value.into()));
        self
    }

    pub fn set_bytes(mut self, column: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.bytes.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len() + self.bytes.len()
    }

    /// Column names in emission order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.text
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.bytes.iter().map(|(c, _)| c.as_str()))
    }

    /// Resolve every column and coerce every value, string pairs first.
    fn bind_values<'t>(
        &self,
        table: &'t TableSchema,
        coerce_text: fn(LogicalType, &str) -> BoundValue,
    ) -> TableResult<Vec<(&'t ColumnInfo, BoundValue)>> {
        let mut out = Vec::with_capacity(self.len());
        for (column, value) in &self.text {
            let info = table.resolve_column(column)?;
            out.push((info, coerce_text(info.logical_type, value)));
        }
        for (column, value) in &self.bytes {
            out.push((table.resolve_column(column)?, coerce_bytes(value)));
        }
        Ok(out)
    }
}

/// Ordering and row cap for a sorted search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    pub column: Option<String>,
    pub ascending: bool,
    pub limit: Option<u64>,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
            limit: None,
        }
    }
}

impl SortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort ascending by `column`.
    pub fn by(column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            ..Self::default()
        }
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
}

/// A SELECT together with the columns its rows will carry.
#[derive(Debug)]
pub struct SelectPlan<'a> {
    pub sql: Sql,
    pub columns: Vec<&'a ColumnInfo>,
}

/// `INSERT INTO t (a, b) VALUES ($1, $2)`.
pub fn insert(table: &TableSchema, row: &RowAssignment) -> TableResult<Sql> {
    if row.is_empty() {
        return Err(TableError::EmptyAssignment(OpKind::Insert));
    }
    let values = row.bind_values(table, coerce)?;

    let mut sql = Sql::new("INSERT INTO ");
    sql.push_ident(table.name()).push(" (");
    sql.push_ident_list(values.iter().map(|(c, _)| c.name.as_str()));
    sql.push(") VALUES (");
    for (i, (column, value)) in values.into_iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_column_bind(value, column.text_cast());
    }
    sql.push(")");
    Ok(sql)
}

/// `UPDATE t SET a = $1, b = $2 WHERE ...`. SET parameters are bound before WHERE parameters.
///
/// Filter conditions are always joined with `AND`.
pub fn update(table: &TableSchema, row: &RowAssignment, filter: &Predicate) -> TableResult<Sql> {
    if row.is_empty() {
        return Err(TableError::EmptyAssignment(OpKind::Update));
    }
    let values = row.bind_values(table, coerce_for_update)?;
    let where_sql = build_where_all_and(table, filter)?;

    let mut sql = Sql::new("UPDATE ");
    sql.push_ident(table.name()).push(" SET ");
    for (i, (column, value)) in values.into_iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_ident(&column.name)
            .push(" = ")
            .push_column_bind(value, column.text_cast());
    }
    sql.push_sql(where_sql);
    Ok(sql)
}

/// `DELETE FROM t WHERE a = $1 AND ...`; with an empty predicate every row is targeted.
pub fn delete(table: &TableSchema, filter: &Predicate) -> TableResult<Sql> {
    let where_sql = build_where_all_and(table, filter)?;
    let mut sql = Sql::new("DELETE FROM ");
    sql.push_ident(table.name()).push_sql(where_sql);
    Ok(sql)
}

/// `DELETE FROM t WHERE a > $1 AND ...`.
pub fn delete_greater_than(table: &TableSchema, filter: &Predicate) -> TableResult<Sql> {
    let where_sql = build_where_greater_than(table, filter)?;
    let mut sql = Sql::new("DELETE FROM ");
    sql.push_ident(table.name()).push_sql(where_sql);
    Ok(sql)
}

/// Select `columns` from `table`.
///
/// `["*"]` (or an empty list) expands to every column in table order.
pub fn select<'a, S: AsRef<str>>(
    table: &'a TableSchema,
    filter: &Predicate,
    columns: &[S],
) -> TableResult<SelectPlan<'a>> {
    let wildcard = columns.is_empty() || (columns.len() == 1 && columns[0].as_ref() == "*");
    let selected: Vec<&ColumnInfo> = if wildcard {
        table.columns().iter().collect()
    } else {
        columns
            .iter()
            .map(|c| table.resolve_column(c.as_ref()))
            .collect::<TableResult<_>>()?
    };
    let where_sql = build_where(table, filter)?;

    Ok(SelectPlan {
        sql: select_sql(table, &selected, where_sql),
        columns: selected,
    })
}

/// Select every column, optionally ordered and limited.
///
/// A sort column that is absent or unknown produces no `ORDER BY`.
pub fn select_sorted<'a>(
    table: &'a TableSchema,
    filter: &Predicate,
    sort: &SortOptions,
) -> TableResult<SelectPlan<'a>> {
    let selected: Vec<&ColumnInfo> = table.columns().iter().collect();
    let where_sql = build_where(table, filter)?;

    let mut sql = select_sql(table, &selected, where_sql);
    if let Some(column) = sort.column.as_deref().and_then(|c| table.column(c)) {
        sql.push(" ORDER BY ");
        // The bare name would pick the `::text` output alias.
        if column.is_server_converted() {
            sql.push_ident(table.name()).push(".");
        }
        sql.push_ident(&column.name)
            .push(if sort.ascending { " ASC" } else { " DESC" });
    }
    if let Some(n) = sort.limit {
        sql.limit(n);
    }
    Ok(SelectPlan {
        sql,
        columns: selected,
    })
}

/// Server-converted columns are read as `col::text AS col`.
fn select_sql(table: &TableSchema, columns: &[&ColumnInfo], where_sql: Sql) -> Sql {
    let mut sql = Sql::new("SELECT ");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_ident(&column.name);
        if column.is_server_converted() {
            sql.push("::text AS ").push_ident(&column.name);
        }
    }
    sql.push(" FROM ")
        .push_ident(table.name())
        .push_sql(where_sql);
    sql
}
