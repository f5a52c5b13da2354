//! WHERE-clause construction.
//!
//! A [`Predicate`] is an ordered list of `(column, value, combinator)`
//! conditions. Each condition compares a column against one bound parameter:
//! `LIKE` for String columns (so callers can pass `%` wildcards), `=` for
//! everything else. The combinator stored on a condition is the connective
//! placed *before* it; the first condition's combinator is never read.
//!
//! ```
//! use pgtable::{Combinator, Predicate};
//!
//! let p = Predicate::new()
//!     .and("name", "A%")
//!     .or("id", "3");
//! assert_eq!(p.len(), 2);
//! assert_eq!(p.conditions()[1].combinator, Combinator::Or);
//! ```

use crate::catalog::TableSchema;
use crate::error::TableResult;
use crate::sql::Sql;
use crate::value::{BoundValue, coerce};

#[cfg(test)]
mod tests;

/// Connective between two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// One comparison against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub value: String,
    /// Connective to the previous condition.
    pub combinator: Combinator,
}

impl Condition {
    pub fn new(column: impl Into<String>, value: impl Into<String>, combinator: Combinator) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            combinator,
        }
    }
}

/// How conditions are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredicateMode {
    /// Every joiner is `AND`; stored combinators are ignored.
    AllAnd,
    /// Every joiner is `OR`; stored combinators are ignored.
    AllOr,
    /// Each condition's own combinator joins it to the previous one.
    #[default]
    Mixed,
}

/// An ordered set of WHERE conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    mode: PredicateMode,
    conditions: Vec<Condition>,
}

impl Predicate {
    /// An empty mixed-mode predicate, to be extended with [`and`](Self::and) / [`or`](Self::or).
    pub fn new() -> Self {
        Self::default()
    }

    /// No conditions: the statement applies to every row.
    pub fn none() -> Self {
        Self::default()
    }

    /// Column/value pairs joined with `AND`.
    pub fn all_and<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_pairs(PredicateMode::AllAnd, Combinator::And, pairs)
    }

    /// Column/value pairs joined with `OR`.
    pub fn all_or<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_pairs(PredicateMode::AllOr, Combinator::Or, pairs)
    }

    /// Explicit `(column, value, combinator)` triples.
    pub fn mixed<I, K, V>(triples: I) -> Self
    where
        I: IntoIterator<Item = (K, V, Combinator)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mode: PredicateMode::Mixed,
            conditions: triples
                .into_iter()
                .map(|(k, v, c)| Condition::new(k, v, c))
                .collect(),
        }
    }

    fn from_pairs<I, K, V>(mode: PredicateMode, combinator: Combinator, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mode,
            conditions: pairs
                .into_iter()
                .map(|(k, v)| Condition::new(k, v, combinator))
                .collect(),
        }
    }

    /// Append a condition joined with `AND`.
    pub fn and(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::new(column, value, Combinator::And));
        self
    }

    /// Append a condition joined with `OR`.
    pub fn or(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::new(column, value, Combinator::Or));
        self
    }

    pub fn mode(&self) -> PredicateMode {
        self.mode
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Joiner placed before condition `i` (`i >= 1`) under `mode`.
    fn joiner(&self, mode: PredicateMode, i: usize) -> Combinator {
        match mode {
            PredicateMode::AllAnd => Combinator::And,
            PredicateMode::AllOr => Combinator::Or,
            PredicateMode::Mixed => self.conditions[i].combinator,
        }
    }
}

/// Render ` WHERE ...` for `predicate` against `table`.
///
/// An empty predicate renders nothing and binds nothing. Every column is
/// resolved first, so an unknown column fails before any text is produced.
pub fn build_where(table: &TableSchema, predicate: &Predicate) -> TableResult<Sql> {
    render_where(table, predicate, predicate.mode())
}

/// Like [`build_where`], but every joiner is `AND` whatever the predicate's
/// mode. UPDATE and DELETE filter this way.
pub fn build_where_all_and(table: &TableSchema, predicate: &Predicate) -> TableResult<Sql> {
    render_where(table, predicate, PredicateMode::AllAnd)
}

fn render_where(table: &TableSchema, predicate: &Predicate, mode: PredicateMode) -> TableResult<Sql> {
    let mut sql = Sql::empty();
    if predicate.is_empty() {
        return Ok(sql);
    }

    sql.push(" WHERE ");
    for (i, cond) in predicate.conditions().iter().enumerate() {
        let column = table.resolve_column(&cond.column)?;
        let ty = column.logical_type;
        if i > 0 {
            sql.push(predicate.joiner(mode, i).as_sql());
        }
        sql.push_ident(&cond.column);
        match column.text_cast() {
            // Pattern match on the text rendering of a server-converted column.
            Some(_) if ty.uses_pattern_match() => {
                sql.push("::text LIKE ").push_bind(coerce(ty, &cond.value));
            }
            cast => {
                sql.push(if ty.uses_pattern_match() {
                    " LIKE "
                } else {
                    " = "
                });
                sql.push_column_bind(coerce(ty, &cond.value), cast);
            }
        }
    }
    Ok(sql)
}

/// Render ` WHERE a > $1 AND b > $2 ...`.
///
/// The column must exist, but its logical type is not consulted: values bind
/// as the raw string and the server decides how to compare.
pub fn build_where_greater_than(table: &TableSchema, predicate: &Predicate) -> TableResult<Sql> {
    let mut sql = Sql::empty();
    if predicate.is_empty() {
        return Ok(sql);
    }

    sql.push(" WHERE ");
    for (i, cond) in predicate.conditions().iter().enumerate() {
        let column = table.resolve_column(&cond.column)?;
        if i > 0 {
            sql.push(Combinator::And.as_sql());
        }
        sql.push_ident(&cond.column)
            .push(" > ")
            .push_column_bind(BoundValue::Text(cond.value.clone()), column.text_cast());
    }
    Ok(sql)
}
