//! Scripted in-memory driver for unit tests.

use crate::driver::{ColumnDescription, Driver, Record};
use crate::error::{DriverError, DriverResult};
use crate::value::BoundValue;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One statement as the driver received it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Executed {
    pub sql: String,
    pub params: Vec<BoundValue>,
}

/// Replays queued results and records every statement it is given.
///
/// With nothing queued, `query` returns no rows and `execute` reports one affected row.
#[derive(Default)]
pub(crate) struct MockDriver {
    tables: Vec<(String, Vec<ColumnDescription>)>,
    introspection_error: Option<DriverError>,
    rows: Mutex<VecDeque<DriverResult<Vec<Record>>>>,
    affected: Mutex<VecDeque<DriverResult<u64>>>,
    executed: Mutex<Vec<Executed>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: &str, columns: &[(&str, &str)]) -> Self {
        let cols = columns
            .iter()
            .map(|(n, t)| ColumnDescription::new(*n, *t))
            .collect();
        self.tables.push((name.to_string(), cols));
        self
    }

    pub fn failing_introspection(mut self, err: DriverError) -> Self {
        self.introspection_error = Some(err);
        self
    }

    pub fn push_rows(&self, rows: Vec<Record>) {
        self.rows.lock().unwrap().push_back(Ok(rows));
    }

    pub fn push_query_error(&self, err: DriverError) {
        self.rows.lock().unwrap().push_back(Err(err));
    }

    pub fn push_affected(&self, n: u64) {
        self.affected.lock().unwrap().push_back(Ok(n));
    }

    pub fn push_execute_error(&self, err: DriverError) {
        self.affected.lock().unwrap().push_back(Err(err));
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    pub fn last(&self) -> Executed {
        self.executed.lock().unwrap().last().cloned().unwrap()
    }

    fn record(&self, sql: &str, params: &[BoundValue]) {
        self.executed.lock().unwrap().push(Executed {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

/// `users(id integer, name varchar(45), active bit(1))`.
pub(crate) fn users_driver() -> MockDriver {
    MockDriver::new().table(
        "users",
        &[
            ("id", "integer"),
            ("name", "character varying(45)"),
            ("active", "bit(1)"),
        ],
    )
}

/// A table with one column per logical type.
pub(crate) fn mixed_driver() -> MockDriver {
    users_driver().table(
        "assets",
        &[
            ("id", "integer"),
            ("title", "text"),
            ("payload", "bytea"),
            ("score", "double precision"),
            ("ratio", "real"),
            ("created", "date"),
            ("mood", "enum"),
            ("flag", "boolean"),
            ("ref", "uuid"),
        ],
    )
}

/// `prices` with columns the server converts to and from text.
pub(crate) fn priced_driver() -> MockDriver {
    MockDriver::new().table(
        "prices",
        &[
            ("id", "integer"),
            ("price", "numeric(10,2)"),
            ("starts", "time without time zone"),
            ("tags", "text[]"),
        ],
    )
}

impl Driver for MockDriver {
    async fn list_tables(&self) -> DriverResult<Vec<String>> {
        if let Some(err) = &self.introspection_error {
            return Err(err.clone());
        }
        Ok(self.tables.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn describe_columns(&self, table: &str) -> DriverResult<Vec<ColumnDescription>> {
        self.tables
            .iter()
            .find(|(n, _)| n == table)
            .map(|(_, cols)| cols.clone())
            .ok_or_else(|| DriverError::Other(format!("no such table {table}")))
    }

    async fn execute(&self, sql: &str, params: &[BoundValue]) -> DriverResult<u64> {
        self.record(sql, params);
        self.affected.lock().unwrap().pop_front().unwrap_or(Ok(1))
    }

    async fn query(&self, sql: &str, params: &[BoundValue]) -> DriverResult<Vec<Record>> {
        self.record(sql, params);
        self.rows
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
