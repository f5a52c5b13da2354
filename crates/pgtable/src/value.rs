//! Bound parameter values and the coercion rules that produce them.
//!
//! Callers hand over every value as a string (or raw bytes for binary columns).
//! [`coerce`] turns a string into a [`BoundValue`] based on the column's
//! [`LogicalType`]; the value then travels to the server as a parameter, never
//! as part of the SQL text.
//!
//! Postgres checks parameter types strictly, so the [`ToSql`] impl parses text
//! into whatever type the server inferred for the placeholder (`integer`,
//! `date`, `uuid`, ...). Unparseable text is reported as a bind error by the driver.

use crate::types::LogicalType;
use bit_vec::BitVec;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};

/// A value bound to one statement placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Null,
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl BoundValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Whether a string counts as "true" for a bit column: `TRUE` in any case, or `1`.
pub fn is_truthy(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("TRUE") || raw == "1"
}

/// Coerce a caller string for a column of type `ty`.
///
/// Bit columns bind integer `1` for truthy strings and `0` for anything else,
/// including `"false"`, `"no"` and garbage. Every other type binds the string unchanged.
pub fn coerce(ty: LogicalType, raw: &str) -> BoundValue {
    match ty {
        LogicalType::Bit => BoundValue::Int(if is_truthy(raw) { 1 } else { 0 }),
        _ => BoundValue::Text(raw.to_string()),
    }
}

/// Coerce a value for an UPDATE SET clause: the empty string clears the cell.
pub fn coerce_for_update(ty: LogicalType, raw: &str) -> BoundValue {
    if raw.is_empty() {
        BoundValue::Null
    } else {
        coerce(ty, raw)
    }
}

/// Binary payloads bind as-is.
pub fn coerce_bytes(raw: &[u8]) -> BoundValue {
    BoundValue::Bytes(raw.to_vec())
}

type BindResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

pub(crate) fn is_text_like(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    ) || ty.name() == "citext"
        || matches!(ty.kind(), Kind::Enum(_))
}

fn write_text(s: &str, out: &mut BytesMut) -> BindResult {
    out.extend_from_slice(s.as_bytes());
    Ok(IsNull::No)
}

fn parse_bool(s: &str) -> Result<bool, Box<dyn Error + Sync + Send>> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "y" | "yes" | "on" => Ok(true),
        "f" | "false" | "0" | "n" | "no" | "off" => Ok(false),
        other => Err(format!("invalid boolean literal: {other:?}").into()),
    }
}

fn parse_bits(s: &str) -> Result<BitVec, Box<dyn Error + Sync + Send>> {
    let mut bits = BitVec::new();
    for c in s.trim().chars() {
        match c {
            '0' => bits.push(false),
            '1' => bits.push(true),
            other => return Err(format!("invalid bit digit: {other:?}").into()),
        }
    }
    Ok(bits)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, Box<dyn Error + Sync + Send>> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid timestamp: {s:?}").into())
}

fn parse_timestamptz(s: &str) -> Result<DateTime<Utc>, Box<dyn Error + Sync + Send>> {
    match DateTime::parse_from_rfc3339(s.trim()) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(_) => Ok(parse_timestamp(s)?.and_utc()),
    }
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> BindResult {
    match *ty {
        Type::BOOL => (v != 0).to_sql(ty, out),
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::BIT | Type::VARBIT => BitVec::from_elem(1, v != 0).to_sql(ty, out),
        _ if is_text_like(ty) => write_text(&v.to_string(), out),
        _ => Err(format!("cannot bind an integer to a parameter of type {ty}").into()),
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> BindResult {
    if is_text_like(ty) {
        return write_text(s, out);
    }
    match *ty {
        Type::BOOL => parse_bool(s)?.to_sql(ty, out),
        Type::INT2 => s.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => s.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => s.trim().parse::<i64>()?.to_sql(ty, out),
        Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        Type::BIT | Type::VARBIT => parse_bits(s)?.to_sql(ty, out),
        Type::DATE => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?.to_sql(ty, out),
        Type::TIMESTAMP => parse_timestamp(s)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => parse_timestamptz(s)?.to_sql(ty, out),
        Type::UUID => uuid::Uuid::parse_str(s.trim())?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
        Type::BYTEA => s.as_bytes().to_sql(ty, out),
        _ => Err(format!("cannot bind text to a parameter of type {ty}").into()),
    }
}

fn bytes_to_sql(b: &[u8], ty: &Type, out: &mut BytesMut) -> BindResult {
    match *ty {
        Type::BYTEA => b.to_sql(ty, out),
        _ if is_text_like(ty) => write_text(std::str::from_utf8(b)?, out),
        _ => Err(format!("cannot bind bytes to a parameter of type {ty}").into()),
    }
}

impl ToSql for BoundValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> BindResult {
        match self {
            BoundValue::Null => Ok(IsNull::Yes),
            BoundValue::Int(v) => int_to_sql(*v, ty, out),
            BoundValue::Text(s) => text_to_sql(s, ty, out),
            BoundValue::Bytes(b) => bytes_to_sql(b, ty, out),
        }
    }

    // Conversion is decided per placeholder type inside `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}
