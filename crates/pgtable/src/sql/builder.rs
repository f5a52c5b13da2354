use crate::ident::write_ident;
use crate::value::BoundValue;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe SQL statement under construction.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<BoundValue>,
}

impl Sql {
    /// Start a statement with `initial_sql`.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// A statement with no text yet; used for fragments such as WHERE clauses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing (text or parameter) has been pushed.
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, SqlPart::Raw(s) if s.is_empty()))
    }

    /// Append trusted SQL text. Never pass caller values here.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append one placeholder; `value` binds to it.
    pub fn push_bind(&mut self, value: BoundValue) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    /// Append a placeholder for a column value. With `cast`, the value travels
    /// as text and the server converts it: `CAST($n::text AS <cast>)`.
    pub fn push_column_bind(&mut self, value: BoundValue, cast: Option<&str>) -> &mut Self {
        match cast {
            None => self.push_bind(value),
            Some(ty) => self
                .push("CAST(")
                .push_bind(value)
                .push("::text AS ")
                .push(ty)
                .push(")"),
        }
    }

    /// Append an identifier taken from the catalog, quoting it when needed.
    pub fn push_ident(&mut self, name: &str) -> &mut Self {
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => write_ident(last, name),
            _ => {
                let mut s = String::new();
                write_ident(&mut s, name);
                self.parts.push(SqlPart::Raw(s));
            }
        }
        self
    }

    /// Append a comma-separated identifier list.
    pub fn push_ident_list<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_ident(name);
        }
        self
    }

    /// Append another `Sql` fragment, consuming it.
    ///
    /// The fragment's placeholders are renumbered after the ones already present.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        for part in other.parts.drain(..) {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.append(&mut other.params);
        self
    }

    /// Append `LIMIT $n` with a bound parameter.
    pub fn limit(&mut self, n: u64) -> &mut Self {
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        self.push(" LIMIT ").push_bind(BoundValue::Int(n))
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[BoundValue] {
        &self.params
    }

    /// Render the text, numbering placeholders `$1, $2, ...` in push order.
    pub fn to_sql(&self) -> String {
        let cap = self
            .parts
            .iter()
            .map(|p| match p {
                SqlPart::Raw(s) => s.len(),
                SqlPart::Param => 4,
            })
            .sum();

        let mut out = String::with_capacity(cap);
        let mut next = 1usize;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    let _ = write!(out, "${next}");
                    next += 1;
                }
            }
        }
        out
    }

    /// Split into rendered text and bound values.
    pub fn into_parts(self) -> (String, Vec<BoundValue>) {
        let sql = self.to_sql();
        (sql, self.params)
    }
}
