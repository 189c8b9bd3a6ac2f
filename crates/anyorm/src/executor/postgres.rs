//! [`Executor`] for `tokio-postgres` clients and transactions.

use std::error::Error;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

use super::{ExecResult, Executor, ResultSet};
use crate::error::OrmResult;
use crate::value::Value;

// ─── Placeholders ───────────────────────────────────────────────────────────

/// Rewrite `?` placeholders as `$1, $2, ...`, leaving quoted text untouched.
pub(crate) fn renumber_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut n = 0;
    for ch in sql.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                out.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                }
                _ => out.push(ch),
            },
        }
    }
    out
}

fn bind(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

// ─── ToSql ──────────────────────────────────────────────────────────────────

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::BOOL => (*i != 0).to_sql(ty, out),
                Type::NUMERIC => Err("integer parameters cannot bind to NUMERIC; cast the placeholder (e.g. `?::int8`)".into()),
                _ => i.to_sql(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::NUMERIC => Err("float parameters cannot bind to NUMERIC; cast the placeholder (e.g. `?::float8`)".into()),
                _ => f.to_sql(ty, out),
            },
            Value::Text(s) => match *ty {
                Type::UUID => uuid::Uuid::parse_str(s)?.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
                _ => s.as_str().to_sql(ty, out),
            },
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(ts).to_sql(ty, out),
                Type::DATE => ts.date().to_sql(ty, out),
                Type::TIME => ts.time().to_sql(ty, out),
                _ => ts.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

// ─── Row decoding ───────────────────────────────────────────────────────────

/// NUMERIC decoded to its exact decimal text.
struct NumericText(String);

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        if raw.len() < 8 {
            return Err("numeric: insufficient data for header".into());
        }
        let read = |pos: usize| u16::from_be_bytes([raw[pos], raw[pos + 1]]);
        let ndigits = read(0) as usize;
        let weight = read(2) as i16 as i32;
        let sign = read(4);
        let dscale = read(6) as usize;
        if raw.len() < 8 + ndigits * 2 {
            return Err("numeric: insufficient data for digits".into());
        }
        match sign {
            NUMERIC_NAN => return Ok(NumericText("NaN".to_string())),
            NUMERIC_PINF => return Ok(NumericText("Infinity".to_string())),
            NUMERIC_NINF => return Ok(NumericText("-Infinity".to_string())),
            _ => {}
        }
        let digit = |i: i32| -> u16 {
            if i < 0 || i as usize >= ndigits {
                0
            } else {
                read(8 + i as usize * 2)
            }
        };

        let mut out = String::new();
        if sign == NUMERIC_NEG {
            out.push('-');
        }
        if weight < 0 {
            out.push('0');
        } else {
            out.push_str(&digit(0).to_string());
            for i in 1..=weight {
                out.push_str(&format!("{:04}", digit(i)));
            }
        }
        if dscale > 0 {
            let mut frac = String::with_capacity(dscale + 4);
            let mut i = weight + 1;
            while frac.len() < dscale {
                frac.push_str(&format!("{:04}", digit(i)));
                i += 1;
            }
            frac.truncate(dscale);
            out.push('.');
            out.push_str(&frac);
        }
        Ok(NumericText(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Fallback for types without a dedicated mapping (enums, domains, ...).
struct RawCell(Vec<u8>);

impl<'a> FromSql<'a> for RawCell {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawCell(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn decode_cell(row: &Row, idx: usize, ty: &Type) -> Result<Value, tokio_postgres::Error> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::CHAR => row.try_get::<_, Option<i8>>(idx)?.map(Value::from),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.map(Value::from),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(Value::from),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        Type::NUMERIC => row
            .try_get::<_, Option<NumericText>>(idx)?
            .map(|n| Value::Text(n.0)),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(Value::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(Value::from),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx)?.map(Value::from),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map(|t| Value::Text(t.format("%H:%M:%S%.f").to_string())),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(idx)?
            .map(Value::from),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(Value::from),
        _ if <String as FromSql>::accepts(ty) => {
            row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
        }
        _ => row
            .try_get::<_, Option<RawCell>>(idx)?
            .map(|raw| match String::from_utf8(raw.0) {
                Ok(s) => Value::Text(s),
                Err(e) => Value::Bytes(e.into_bytes()),
            }),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode_rows(rows: &[Row]) -> OrmResult<ResultSet> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            cells.push(decode_cell(row, idx, column.type_())?);
        }
        out.push(cells);
    }
    Ok(ResultSet::new(columns, out))
}

// ─── Executor impls ─────────────────────────────────────────────────────────

macro_rules! impl_executor {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Executor for $ty {
                async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
                    let sql = renumber_placeholders(sql);
                    let rows_affected = <$ty>::execute(self, sql.as_str(), &bind(params)).await?;
                    Ok(ExecResult {
                        rows_affected,
                        last_insert_id: None,
                    })
                }

                async fn query_rows(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
                    let sql = renumber_placeholders(sql);
                    let rows = <$ty>::query(self, sql.as_str(), &bind(params)).await?;
                    decode_rows(&rows)
                }
            }
        )*
    };
}

impl_executor!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::ClientWrapper {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        // Delegate to the deref target (tokio_postgres::Client).
        Executor::execute(&**self, sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
        Executor::query_rows(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        Executor::execute(&**self, sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> OrmResult<ResultSet> {
        Executor::query_rows(&**self, sql, params).await
    }
}
