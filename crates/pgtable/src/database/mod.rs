//! The caller-facing table API.
//!
//! [`Database`] owns one driver, the catalog loaded through it, and a
//! diagnostic [`ErrorLog`]. Every operation resolves names against the
//! catalog, builds one statement, runs it, and returns a [`TableResult`].
//! Failures are returned *and* appended to the log.
//!
//! A `Database` runs one statement at a time per call and holds no
//! per-statement state, so independent calls never share placeholder
//! numbering. It does not serialize calls itself: whether two tasks may use
//! one instance concurrently is up to the driver (a single Postgres
//! connection pipelines them).

mod error_log;


pub use error_log::{ErrorLog, ErrorRecord};

use crate::catalog::SchemaCatalog;
use crate::config::{ConnectConfig, DangerousDmlPolicy, TableOptions};
use crate::decode::{ByteRow, StringRow, decode_byte_row, decode_string_row};
use crate::driver::{self, Driver, PgDriver, Record};
use crate::error::{DriverError, DriverResult, OpKind, TableError, TableResult};
use crate::predicate::Predicate;
use crate::sql::{Sql, truncate_sql_bytes};
use crate::statement::{self, RowAssignment, SortOptions};
use crate::types::LogicalType;
use std::future::Future;

/// Schema-aware access to the tables behind one driver.
pub struct Database<D = PgDriver> {
    driver: D,
    catalog: SchemaCatalog,
    options: TableOptions,
    errors: ErrorLog,
    healthy: bool,
}

impl Database<PgDriver> {
    /// Connect with default [`TableOptions`] and load the catalog.
    pub async fn connect(config: &ConnectConfig) -> TableResult<Self> {
        Self::connect_with(config, TableOptions::default()).await
    }

    /// Connect and load the catalog.
    ///
    /// Only the connection itself can fail here, as `Err(TableError::Connect)`.
    /// No `Database` exists yet at that point, so connect failures are never
    /// recorded in [`all_errors`](Self::all_errors); log or report the returned
    /// error instead.
    ///
    /// A catalog that cannot be loaded leaves the database empty and unhealthy;
    /// see [`is_healthy`](Self::is_healthy). That failure is recorded.
    pub async fn connect_with(config: &ConnectConfig, options: TableOptions) -> TableResult<Self> {
        let driver = driver::connect(config).await.map_err(|e| {
            tracing::warn!(target: "pgtable", op = %OpKind::Connect, error = %e, "connect failed");
            TableError::Connect(e)
        })?;
        Ok(Self::with_options(driver, options).await)
    }

    /// Release the connection and wait for its background task.
    pub async fn close(self) {
        self.driver.close().await;
    }
}

/// Connect, run `f`, and close the connection whatever `f` returns.
pub async fn with_database<F, T>(config: &ConnectConfig, f: F) -> TableResult<T>
where
    F: AsyncFnOnce(&Database<PgDriver>) -> T,
{
    let db = Database::connect(config).await?;
    let out = f(&db).await;
    db.close().await;
    Ok(out)
}

impl<D: Driver> Database<D> {
    /// Wrap `driver` with default options and load the catalog.
    pub async fn new(driver: D) -> Self {
        Self::with_options(driver, TableOptions::default()).await
    }

    /// Wrap `driver` and load the catalog.
    pub async fn with_options(driver: D, options: TableOptions) -> Self {
        let errors = ErrorLog::new();
        let (catalog, healthy) = match SchemaCatalog::load(&driver).await {
            Ok(catalog) => {
                tracing::info!(target: "pgtable", tables = catalog.len(), "schema catalog loaded");
                (catalog, true)
            }
            Err(e) => {
                tracing::warn!(target: "pgtable", op = %OpKind::Introspect, error = %e, "schema introspection failed");
                errors.push(OpKind::Introspect, TableError::Introspection(e));
                (SchemaCatalog::empty(), false)
            }
        };
        Self {
            driver,
            catalog,
            options,
            errors,
            healthy,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Whether the catalog loaded. An unhealthy database rejects every table name.
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    // ==================== Catalog inspection ====================

    pub fn has_table(&self, table: &str) -> bool {
        self.catalog.has_table(table)
    }

    pub fn columns_of(&self, table: &str) -> TableResult<Vec<&str>> {
        self.catalog.columns_of(table)
    }

    pub fn type_of(&self, table: &str, column: &str) -> TableResult<LogicalType> {
        self.catalog.resolve_type(table, column)
    }

    // ==================== Error log ====================

    pub fn all_errors(&self) -> Vec<ErrorRecord> {
        self.errors.all()
    }

    /// One `"<Kind>: <message>"` line per recorded failure.
    pub fn error_messages(&self) -> String {
        self.errors.messages()
    }

    pub fn clear_errors(&self) {
        self.errors.clear();
    }

    // ==================== Writes ====================

    /// Insert one row. Returns the number of rows inserted.
    pub async fn insert(&self, table: &str, row: &RowAssignment) -> TableResult<u64> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let sql = statement::insert(schema, row)?;
            self.execute(OpKind::Insert, table, sql).await
        }
        .await;
        self.record(OpKind::Insert, result)
    }

    /// Insert one row given as separate string and byte pairs; strings are emitted first.
    pub async fn insert_mixed<S, B>(&self, table: &str, strings: S, bytes: B) -> TableResult<u64>
    where
        S: IntoIterator<Item = (String, String)>,
        B: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let row = mixed_row(strings, bytes);
        self.insert(table, &row).await
    }

    /// Update rows matching `filter`. An empty string value sets the column to NULL.
    pub async fn update(
        &self,
        table: &str,
        row: &RowAssignment,
        filter: &Predicate,
    ) -> TableResult<u64> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let sql = statement::update(schema, row, filter)?;
            self.execute(OpKind::Update, table, sql).await
        }
        .await;
        self.record(OpKind::Update, result)
    }

    /// Update with separate string and byte pairs; strings are emitted first.
    pub async fn update_mixed<S, B>(
        &self,
        table: &str,
        strings: S,
        bytes: B,
        filter: &Predicate,
    ) -> TableResult<u64>
    where
        S: IntoIterator<Item = (String, String)>,
        B: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let row = mixed_row(strings, bytes);
        self.update(table, &row, filter).await
    }

    /// Delete rows matching `filter`.
    ///
    /// An empty predicate deletes every row, subject to
    /// [`TableOptions::delete_without_where`]. Use [`delete_all`](Self::delete_all)
    /// to clear a table regardless of that policy.
    pub async fn delete(&self, table: &str, filter: &Predicate) -> TableResult<u64> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let sql = statement::delete(schema, filter)?;
            self.check_unconditional(table, filter)?;
            self.execute(OpKind::Delete, table, sql).await
        }
        .await;
        self.record(OpKind::Delete, result)
    }

    /// Delete every row of `table`. This is the explicit confirmation for an unconditional delete.
    pub async fn delete_all(&self, table: &str) -> TableResult<u64> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let sql = statement::delete(schema, &Predicate::none())?;
            self.execute(OpKind::Delete, table, sql).await
        }
        .await;
        self.record(OpKind::Delete, result)
    }

    /// Delete rows where every listed column is greater than its value.
    ///
    /// Values bind as raw strings regardless of column type.
    pub async fn delete_where_greater_than(
        &self,
        table: &str,
        filter: &Predicate,
    ) -> TableResult<u64> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let sql = statement::delete_greater_than(schema, filter)?;
            self.check_unconditional(table, filter)?;
            self.execute(OpKind::Delete, table, sql).await
        }
        .await;
        self.record(OpKind::Delete, result)
    }

    // ==================== Reads ====================

    /// Select `columns` (`["*"]` for all) from rows matching `filter`, as strings.
    ///
    /// NULL cells come back as `""`.
    pub async fn search<S>(
        &self,
        table: &str,
        filter: &Predicate,
        columns: &[S],
    ) -> TableResult<Vec<StringRow>>
    where
        S: AsRef<str> + Sync,
    {
        let result = async {
            let schema = self.catalog.table(table)?;
            let plan = statement::select(schema, filter, columns)?;
            let records = self.query(table, plan.sql).await?;
            Ok::<_, TableError>(
                records
                    .iter()
                    .map(|r| decode_string_row(r, &plan.columns))
                    .collect(),
            )
        }
        .await;
        self.record(OpKind::Select, result)
    }

    /// Select all columns, ordered by `sort.column` when it is a known column and capped at `sort.limit`.
    pub async fn search_sorted(
        &self,
        table: &str,
        filter: &Predicate,
        sort: &SortOptions,
    ) -> TableResult<Vec<StringRow>> {
        let result = async {
            let schema = self.catalog.table(table)?;
            let plan = statement::select_sorted(schema, filter, sort)?;
            let records = self.query(table, plan.sql).await?;
            Ok::<_, TableError>(
                records
                    .iter()
                    .map(|r| decode_string_row(r, &plan.columns))
                    .collect(),
            )
        }
        .await;
        self.record(OpKind::Select, result)
    }

    /// Like [`search`](Self::search), but every cell is encoded to bytes by
    /// logical type. Cells that cannot be encoded are left out of their row.
    pub async fn search_bytes<S>(
        &self,
        table: &str,
        filter: &Predicate,
        columns: &[S],
    ) -> TableResult<Vec<ByteRow>>
    where
        S: AsRef<str> + Sync,
    {
        let result = async {
            let schema = self.catalog.table(table)?;
            let plan = statement::select(schema, filter, columns)?;
            let records = self.query(table, plan.sql).await?;
            Ok::<_, TableError>(
                records
                    .iter()
                    .map(|r| decode_byte_row(r, &plan.columns))
                    .collect(),
            )
        }
        .await;
        self.record(OpKind::Select, result)
    }

    // ==================== Internals ====================

    fn check_unconditional(&self, table: &str, filter: &Predicate) -> TableResult<()> {
        if !filter.is_empty() {
            return Ok(());
        }
        match self.options.delete_without_where {
            DangerousDmlPolicy::Allow => Ok(()),
            DangerousDmlPolicy::Warn => {
                tracing::warn!(target: "pgtable", table, "DELETE without WHERE removes every row");
                Ok(())
            }
            DangerousDmlPolicy::Error => Err(TableError::Policy(format!(
                "DELETE without WHERE on {table} (use delete_all to confirm)"
            ))),
        }
    }

    fn record<T>(&self, op: OpKind, result: TableResult<T>) -> TableResult<T> {
        if let Err(e) = &result {
            tracing::warn!(target: "pgtable", op = %op, error = %e, "operation failed");
            self.errors.push(op, e.clone());
        }
        result
    }

    fn log_statement(&self, op: OpKind, table: &str, sql: &str, params: usize) {
        tracing::debug!(
            target: "pgtable.sql",
            op = %op,
            table,
            params,
            sql = truncate_sql_bytes(sql, self.options.max_sql_log_length),
            "executing statement"
        );
    }

    async fn execute(&self, op: OpKind, table: &str, sql: Sql) -> TableResult<u64> {
        let (text, params) = sql.into_parts();
        self.log_statement(op, table, &text, params.len());
        self.timed(self.driver.execute(&text, &params))
            .await
            .map_err(|e| TableError::from_driver(op, e))
    }

    async fn query(&self, table: &str, sql: Sql) -> TableResult<Vec<Record>> {
        let (text, params) = sql.into_parts();
        self.log_statement(OpKind::Select, table, &text, params.len());
        self.timed(self.driver.query(&text, &params))
            .await
            .map_err(|e| TableError::from_driver(OpKind::Select, e))
    }

    async fn timed<T>(&self, fut: impl Future<Output = DriverResult<T>>) -> DriverResult<T> {
        match self.options.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(DriverError::Timeout(limit))),
            None => fut.await,
        }
    }
}

fn mixed_row<S, B>(strings: S, bytes: B) -> RowAssignment
where
    S: IntoIterator<Item = (String, String)>,
    B: IntoIterator<Item = (String, Vec<u8>)>,
{
    let row = RowAssignment::from_pairs(strings);
    bytes
        .into_iter()
        .fold(row, |row, (column, value)| row.set_bytes(column, value))
}
