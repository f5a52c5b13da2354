//! # pgtable
//!
//! Schema-aware, string-typed table access for PostgreSQL.
//!
//! ## Features
//!
//! - **Catalog first**: tables and column types are introspected once; every name is checked against them
//! - **String in, string out**: callers pass values as strings (or bytes for binary columns)
//! - **Bound parameters only**: values never become part of SQL text
//! - **Composable predicates**: all-AND, all-OR, or per-condition AND/OR chains
//! - **Pattern matching on text**: text columns compare with `LIKE`, everything else with `=`
//! - **Diagnostic log**: every failed operation is returned and also recorded
//!
//! ## Example
//!
//! ```ignore
//! use pgtable::{ConnectConfig, Database, Predicate, RowAssignment};
//!
//! let db = Database::connect(&ConnectConfig::from_url("postgres://localhost/app")).await?;
//!
//! db.insert(
//!     "users",
//!     &RowAssignment::from_pairs([("id", "1"), ("name", "Ann"), ("active", "true")]),
//! )
//! .await?;
//!
//! let rows = db
//!     .search("users", &Predicate::all_and([("name", "A%")]), &["*"])
//!     .await?;
//! assert_eq!(rows[0]["active"], "1");
//!
//! db.close().await;
//! ```

pub mod catalog;
pub mod config;
pub mod database;
pub mod decode;
pub mod driver;
pub mod error;
pub mod ident;
pub mod predicate;
pub mod sql;
pub mod statement;
pub mod types;
pub mod value;

#[cfg(test)]
mod testing;

pub use catalog::{ColumnInfo, SchemaCatalog, TableSchema};
pub use config::{ConnectConfig, DangerousDmlPolicy, TableOptions};
pub use database::{Database, ErrorLog, ErrorRecord, with_database};
pub use decode::{ByteRow, StringRow};
pub use driver::{Cell, ColumnDescription, Driver, PgDriver, Record};
pub use error::{DriverError, DriverResult, OpKind, TableError, TableResult};
pub use predicate::{Combinator, Condition, Predicate, PredicateMode};
pub use sql::Sql;
pub use statement::{RowAssignment, SortOptions};
pub use types::LogicalType;
pub use value::BoundValue;
