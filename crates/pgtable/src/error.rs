//! Error types for pgtable

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for driver-level calls.
pub type DriverResult<T> = Result<T, DriverError>;

/// Result type alias for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised at the driver boundary.
///
/// `tokio_postgres::Error` is not `Clone`, so it is shared behind an `Arc`. This
/// lets the error log keep a copy of every failure that is also returned to the caller.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(Arc<tokio_postgres::Error>),

    /// Cell decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// SQLSTATE code reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Query(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}

impl From<tokio_postgres::Error> for DriverError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Query(Arc::new(err))
    }
}

/// The logical operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Connect,
    Introspect,
    Insert,
    Update,
    Delete,
    Select,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Introspect => "Introspect",
            Self::Insert => "Insert",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Select => "Select",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by table operations.
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// Could not open the connection.
    #[error("Connect failed: {0}")]
    Connect(#[source] DriverError),

    /// Listing tables or describing columns failed.
    #[error("Schema introspection failed: {0}")]
    Introspection(#[source] DriverError),

    /// The table is not in the catalog.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The column is not in the catalog entry for the table.
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Insert/update called without any column values.
    #[error("No column values given for {0}")]
    EmptyAssignment(OpKind),

    /// The statement was refused by a configured safety policy.
    #[error("Refused by policy: {0}")]
    Policy(String),

    #[error("Insert failed: {0}")]
    Insert(#[source] DriverError),

    #[error("Update failed: {0}")]
    Update(#[source] DriverError),

    #[error("Delete failed: {0}")]
    Delete(#[source] DriverError),

    #[error("Select failed: {0}")]
    Select(#[source] DriverError),
}

impl TableError {
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Wrap a driver error in the variant matching `op`.
    pub fn from_driver(op: OpKind, err: DriverError) -> Self {
        match op {
            OpKind::Connect => Self::Connect(err),
            OpKind::Introspect => Self::Introspection(err),
            OpKind::Insert => Self::Insert(err),
            OpKind::Update => Self::Update(err),
            OpKind::Delete => Self::Delete(err),
            OpKind::Select => Self::Select(err),
        }
    }

    /// The underlying driver error, if this failure came from the driver.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Connect(e)
            | Self::Introspection(e)
            | Self::Insert(e)
            | Self::Update(e)
            | Self::Delete(e)
            | Self::Select(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a catalog lookup failure (unknown table or column).
    pub fn is_unknown_name(&self) -> bool {
        matches!(self, Self::UnknownTable(_) | Self::UnknownColumn { .. })
    }
}
