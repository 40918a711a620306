// db/accessors.rs
// Source database access: table discovery and full-table scans.

use super::models::*;
use super::pg_types::{column_kind, decode_json, decode_numeric, ColumnKind, NumericText};
use crate::error::{ExportError, ExportResult};
use crate::export::literal::quote_identifier;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::{PgColumn, PgConnectOptions, PgRow};
use sqlx::{self, Column, ConnectOptions, Connection, PgConnection, Postgres, Row as _, TypeInfo};
use uuid::Uuid;

pub const PUBLIC_SCHEMA: &str = "public";

/// A source of table data for one export run.
#[async_trait]
pub trait DataSource: Send {
    /// Base tables of the public schema, sorted by name.
    async fn list_tables(&mut self) -> ExportResult<Vec<String>>;

    /// Every row of `table` in the order the database returns them.
    async fn fetch_rows(&mut self, table: &str) -> ExportResult<Vec<Row>>;

    async fn close(&mut self) -> ExportResult<()>;
}

// ------------------- PostgreSQL -------------------
pub struct PostgresSource {
    conn: Option<PgConnection>,
}

impl PostgresSource {
    pub async fn connect(params: &ConnectionParams) -> ExportResult<Self> {
        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.dbname)
            .username(&params.user)
            .password(&params.password);
        let conn = options.connect().await.map_err(|source| ExportError::Connect {
            target: params.to_string(),
            source,
        })?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> Result<&mut PgConnection, sqlx::Error> {
        self.conn
            .as_mut()
            .ok_or_else(|| sqlx::Error::Protocol("connection already closed".to_string()))
    }
}

#[async_trait]
impl DataSource for PostgresSource {
    async fn list_tables(&mut self) -> ExportResult<Vec<String>> {
        let conn = self.conn().map_err(ExportError::Metadata)?;
        let rows = sqlx::query(
            "SELECT table_name::text AS table_name FROM information_schema.tables WHERE table_schema = $1 AND table_type = 'BASE TABLE'"
        )
        .bind(PUBLIC_SCHEMA)
        .fetch_all(conn)
        .await
        .map_err(ExportError::Metadata)?;
        let mut tables = rows
            .iter()
            .map(|r| r.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExportError::Metadata)?;
        // information_schema gives no ordering guarantee
        tables.sort();
        Ok(tables)
    }

    async fn fetch_rows(&mut self, table: &str) -> ExportResult<Vec<Row>> {
        let read_err = |source| ExportError::Read { table: table.to_string(), source };
        let conn = self.conn().map_err(read_err)?;
        let stmt = format!("SELECT * FROM {}", quote_identifier(table));
        let rows = sqlx::query(&stmt).fetch_all(conn).await.map_err(read_err)?;
        rows.iter().map(|row| decode_row(table, row)).collect()
    }

    async fn close(&mut self) -> ExportResult<()> {
        match self.conn.take() {
            Some(conn) => conn.close().await.map_err(ExportError::Close),
            None => Ok(()),
        }
    }
}

fn decode_row(table: &str, row: &PgRow) -> ExportResult<Row> {
    row.columns().iter().map(|col| decode_column(table, row, col)).collect()
}

fn decode_column(table: &str, row: &PgRow, col: &PgColumn) -> ExportResult<Value> {
    let ty = col.type_info();
    let Some(kind) = ty.oid().and_then(|oid| column_kind(oid.0)) else {
        return Err(ExportError::UnsupportedType {
            table: table.to_string(),
            column: col.name().to_string(),
            type_name: ty.name().to_string(),
        });
    };
    decode_value(row, col.ordinal(), kind).map_err(|source| ExportError::Read { table: table.to_string(), source })
}

// The column's OID was checked by `column_kind`, so decoding skips sqlx's
// own type compatibility check.
fn decode_value(row: &PgRow, idx: usize, kind: ColumnKind) -> Result<Value, sqlx::Error> {
    match kind {
        ColumnKind::Bool => get(row, idx, Value::Bool),
        ColumnKind::Int2 => get(row, idx, |n: i16| Value::Int(n.into())),
        ColumnKind::Int4 => get(row, idx, |n: i32| Value::Int(n.into())),
        ColumnKind::Int8 => get(row, idx, Value::Int),
        // shortest decimal form of the f32, not its widened binary value
        ColumnKind::Float4 => get(row, idx, |n: f32| {
            Value::Float(n.to_string().parse().unwrap_or_else(|_| f64::from(n)))
        }),
        ColumnKind::Float8 => get(row, idx, Value::Float),
        ColumnKind::Numeric => get_raw(row, idx, |buf| {
            Ok(match decode_numeric(buf)? {
                NumericText::Number(text) => Value::Numeric(text),
                NumericText::NaN => Value::Float(f64::NAN),
                NumericText::Infinity => Value::Float(f64::INFINITY),
                NumericText::NegInfinity => Value::Float(f64::NEG_INFINITY),
            })
        }),
        ColumnKind::Text => get(row, idx, Value::Text),
        ColumnKind::Date => get::<NaiveDate>(row, idx, Value::Date),
        ColumnKind::Timestamp => get::<NaiveDateTime>(row, idx, Value::Timestamp),
        ColumnKind::TimestampTz => get::<DateTime<Utc>>(row, idx, Value::TimestampTz),
        ColumnKind::Time => get::<NaiveTime>(row, idx, Value::Time),
        ColumnKind::Uuid => get::<Uuid>(row, idx, Value::Uuid),
        ColumnKind::Json => get_raw(row, idx, |buf| decode_json(buf, false).map(Value::Json)),
        ColumnKind::Jsonb => get_raw(row, idx, |buf| decode_json(buf, true).map(Value::Json)),
        ColumnKind::Bytes => get(row, idx, Value::Bytes),
    }
}

fn get<'r, T>(row: &'r PgRow, idx: usize, wrap: impl FnOnce(T) -> Value) -> Result<Value, sqlx::Error>
where
    T: sqlx::Decode<'r, Postgres>,
{
    Ok(row.try_get_unchecked::<Option<T>, _>(idx)?.map(wrap).unwrap_or(Value::Null))
}

/// Hands the value's binary wire bytes to `decode`.
fn get_raw<'r>(
    row: &'r PgRow,
    idx: usize,
    decode: impl FnOnce(&'r [u8]) -> Result<Value, String>,
) -> Result<Value, sqlx::Error> {
    match row.try_get_unchecked::<Option<&'r [u8]>, _>(idx)? {
        Some(buf) => decode(buf).map_err(|msg| sqlx::Error::Decode(msg.into())),
        None => Ok(Value::Null),
    }
}
