//! [`Driver`] implementation on top of `tokio-postgres`.

use super::{ColumnDescription, Driver};
use super::record::{Cell, Record};
use crate::config::ConnectConfig;
use crate::error::{DriverError, DriverResult};
use crate::value::{BoundValue, is_text_like};
use bit_vec::BitVec;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};

const LIST_TABLES_SQL: &str = r#"
SELECT c.relname AS table_name
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
WHERE c.relkind IN ('r', 'p')
  AND n.nspname = $1
ORDER BY c.relname
"#;

const DESCRIBE_COLUMNS_SQL: &str = r#"
SELECT
  a.attname AS column_name,
  CASE WHEN t.typtype = 'e' THEN 'enum'
       ELSE pg_catalog.format_type(a.atttypid, a.atttypmod)
  END AS data_type
FROM pg_catalog.pg_attribute a
JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
WHERE n.nspname = $1
  AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum
"#;

/// A single Postgres connection scoped to one schema.
///
/// Not internally synchronized beyond what `tokio_postgres::Client` provides:
/// share it across tasks only if interleaved statements are acceptable.
pub struct PgDriver {
    client: Client,
    schema: String,
    connection: Option<JoinHandle<()>>,
}

/// Open a connection and spawn its background task.
pub async fn connect(config: &ConnectConfig) -> DriverResult<PgDriver> {
    let pg_config = config.to_pg_config()?;
    let (client, connection) = pg_config
        .connect(NoTls)
        .await
        .map_err(|e| DriverError::Connection(e.to_string()))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "pgtable", error = %e, "postgres connection error");
        }
    });

    Ok(PgDriver {
        client,
        schema: config.schema.clone(),
        connection: Some(handle),
    })
}

impl PgDriver {
    /// Wrap an existing client. The caller stays responsible for its connection task.
    pub fn from_client(client: Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
            connection: None,
        }
    }

    /// The schema whose tables are introspected.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Drop the client and wait for the connection task to finish.
    pub async fn close(self) {
        let PgDriver {
            client, connection, ..
        } = self;
        drop(client);
        if let Some(handle) = connection {
            if let Err(e) = handle.await {
                tracing::warn!(target: "pgtable", error = %e, "connection task did not shut down cleanly");
            }
        }
    }
}

fn params_ref(params: &[BoundValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

impl Driver for PgDriver {
    async fn list_tables(&self) -> DriverResult<Vec<String>> {
        let rows = self.client.query(LIST_TABLES_SQL, &[&self.schema]).await?;
        rows.iter()
            .map(|row| {
                row.try_get::<_, String>("table_name")
                    .map_err(|e| DriverError::decode("table_name", e.to_string()))
            })
            .collect()
    }

    async fn describe_columns(&self, table: &str) -> DriverResult<Vec<ColumnDescription>> {
        let rows = self
            .client
            .query(DESCRIBE_COLUMNS_SQL, &[&self.schema, &table])
            .await?;
        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("column_name")
                    .map_err(|e| DriverError::decode("column_name", e.to_string()))?;
                let native_type: String = row
                    .try_get("data_type")
                    .map_err(|e| DriverError::decode("data_type", e.to_string()))?;
                Ok(ColumnDescription { name, native_type })
            })
            .collect()
    }

    async fn execute(&self, sql: &str, params: &[BoundValue]) -> DriverResult<u64> {
        let refs = params_ref(params);
        Ok(self.client.execute(sql, &refs).await?)
    }

    async fn query(&self, sql: &str, params: &[BoundValue]) -> DriverResult<Vec<Record>> {
        let refs = params_ref(params);
        let rows = self.client.query(sql, &refs).await?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

/// Text-format cells: text types and enum labels share the same binary layout.
struct RawText(String);

impl<'a> FromSql<'a> for RawText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawText(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        is_text_like(ty)
    }
}

fn bits_cell(bits: BitVec) -> Cell {
    if bits.len() == 1 {
        Cell::Bool(bits[0])
    } else {
        Cell::Text(bits.iter().map(|b| if b { '1' } else { '0' }).collect())
    }
}

/// A cell that fails to decode becomes [`Cell::Unsupported`]; the rest of the
/// row is kept.
fn decode_row(row: &Row) -> Record {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let cell = decode_cell(row, idx, ty).unwrap_or_else(|message| {
            tracing::warn!(
                target: "pgtable",
                column = column.name(),
                pg_type = %ty,
                error = %message,
                "cell not decoded"
            );
            Cell::Unsupported(ty.name().to_string())
        });
        record.push(column.name(), cell);
    }
    record
}

fn decode_cell(row: &Row, idx: usize, ty: &Type) -> Result<Cell, String> {
    fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, String> {
        row.try_get::<_, Option<T>>(idx).map_err(|e| e.to_string())
    }

    let cell = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Cell::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(Cell::SmallInt),
        Type::INT4 => get::<i32>(row, idx)?.map(Cell::Int),
        Type::INT8 => get::<i64>(row, idx)?.map(Cell::BigInt),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(Cell::Float),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Cell::Double),
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Cell::Bytes),
        Type::BIT | Type::VARBIT => get::<BitVec>(row, idx)?.map(bits_cell),
        Type::DATE => get::<NaiveDate>(row, idx)?
            .map(|d| Cell::Text(d.format("%Y-%m-%d").to_string())),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?
            .map(|ts| Cell::Text(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string())),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(|ts| Cell::Text(ts.to_rfc3339())),
        Type::UUID => get::<uuid::Uuid>(row, idx)?.map(|u| Cell::Text(u.to_string())),
        Type::JSON | Type::JSONB => {
            get::<serde_json::Value>(row, idx)?.map(|v| Cell::Text(v.to_string()))
        }
        _ if is_text_like(ty) => get::<RawText>(row, idx)?.map(|t| Cell::Text(t.0)),
        _ => return Err(format!("unsupported column type {ty}")),
    };
    Ok(cell.unwrap_or(Cell::Null))
}
