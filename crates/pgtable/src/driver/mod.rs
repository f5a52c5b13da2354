//! The driver boundary.
//!
//! Everything the core needs from a database connection goes through [`Driver`]:
//! listing tables, describing columns, and running parameterized statements.
//! Result rows come back as [`Record`]s whose cells are already decoded into
//! a small set of native values, so the core never touches wire formats.

mod postgres;
mod record;

pub use postgres::{PgDriver, connect};
pub use record::{Cell, Record};

use crate::error::DriverResult;
use crate::value::BoundValue;
use serde::{Deserialize, Serialize};

/// One column as reported by the database: its name and native type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub native_type: String,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
        }
    }
}

/// A connection-like handle the core can introspect and run statements on.
///
/// Implementations are not required to support overlapping calls; the core
/// issues one statement at a time per logical operation.
pub trait Driver: Send + Sync {
    /// List table names, in a stable order.
    fn list_tables(&self) -> impl std::future::Future<Output = DriverResult<Vec<String>>> + Send;

    /// Describe the columns of `table`, in table order.
    fn describe_columns(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = DriverResult<Vec<ColumnDescription>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[BoundValue],
    ) -> impl std::future::Future<Output = DriverResult<u64>> + Send;

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[BoundValue],
    ) -> impl std::future::Future<Output = DriverResult<Vec<Record>>> + Send;
}
