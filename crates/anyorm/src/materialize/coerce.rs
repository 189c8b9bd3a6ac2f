//! Conversions from [`Value`] into Rust field types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::CoerceError;
use crate::value::Value;

/// A Rust type that a result cell can be coerced into.
pub trait FromValue: Sized {
    /// Human readable destination type, used in diagnostics and [`FieldMeta`](super::FieldMeta).
    const KIND: &'static str;
    /// `true` only for `Option<_>`.
    const NULLABLE: bool = false;

    fn from_value(value: Value) -> Result<Self, CoerceError>;
}

fn mismatch<T: FromValue>(value: &Value) -> CoerceError {
    CoerceError::new(value.kind_name(), T::KIND, "unsupported conversion")
}

/// Reads `Bytes` as UTF-8 text. Other values pass through.
fn bytes_to_text(value: Value, to: &'static str) -> Result<Value, CoerceError> {
    match value {
        Value::Bytes(b) => String::from_utf8(b)
            .map(Value::Text)
            .map_err(|e| CoerceError::new("binary", to, e.to_string())),
        other => Ok(other),
    }
}

// ─── Integers ───────────────────────────────────────────────────────────────

fn float_to_i128(f: f64) -> Option<i128> {
    let t = f.trunc();
    (t.is_finite() && t >= i128::MIN as f64 && t < i128::MAX as f64).then_some(t as i128)
}

fn text_to_i128(s: &str) -> Option<i128> {
    let s = s.trim();
    s.parse::<i128>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(float_to_i128))
}

macro_rules! from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const KIND: &'static str = stringify!($t);

                fn from_value(value: Value) -> Result<Self, CoerceError> {
                    let value = bytes_to_text(value, Self::KIND)?;
                    let wide: i128 = match &value {
                        Value::Int(i) => i128::from(*i),
                        Value::Bool(b) => i128::from(*b),
                        Value::Float(f) => float_to_i128(*f).ok_or_else(|| {
                            CoerceError::new("float", Self::KIND, format!("{} is not finite", f))
                        })?,
                        Value::Text(s) => text_to_i128(s).ok_or_else(|| {
                            CoerceError::new("text", Self::KIND, format!("'{}' is not a number", s))
                        })?,
                        Value::Timestamp(ts) => i128::from(ts.and_utc().timestamp()),
                        _ => return Err(mismatch::<Self>(&value)),
                    };
                    <$t>::try_from(wide).map_err(|_| {
                        CoerceError::new(value.kind_name(), Self::KIND, format!("{} is out of range", wide))
                    })
                }
            }
        )*
    };
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

// ─── Floats ─────────────────────────────────────────────────────────────────

impl FromValue for f64 {
    const KIND: &'static str = "f64";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match bytes_to_text(value, Self::KIND)? {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().map_err(|e| {
                CoerceError::new("text", Self::KIND, format!("'{}': {}", s, e))
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for f32 {
    const KIND: &'static str = "f32";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        f64::from_value(value)
            .map(|f| f as f32)
            .map_err(|e| CoerceError { to: Self::KIND, ..e })
    }
}

// ─── Booleans ───────────────────────────────────────────────────────────────

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl FromValue for bool {
    const KIND: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match bytes_to_text(value, Self::KIND)? {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            Value::Float(f) => Ok(f != 0.0),
            Value::Text(s) => parse_bool(&s).ok_or_else(|| {
                CoerceError::new("text", Self::KIND, format!("'{}' is not a boolean token", s))
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// ─── Text & binary ──────────────────────────────────────────────────────────

impl FromValue for String {
    const KIND: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Bytes(b) => String::from_utf8(b)
                .map_err(|e| CoerceError::new("binary", Self::KIND, e.to_string())),
            Value::Timestamp(ts) => Ok(ts.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Null => Err(mismatch::<Self>(&Value::Null)),
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: &'static str = "bytes";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// ─── Temporal ───────────────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp string, normalizing offsets to UTC.
///
/// Accepted, in order: RFC 3339 (with or without fractional seconds),
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (midnight), bare `HH:MM:SS` (on
/// 0000-01-01), then a purely numeric string as Unix seconds.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Some(time) = parse_time(s) {
        return NaiveDate::from_ymd_opt(0, 1, 1).map(|d| d.and_time(time));
    }
    parse_unix(s)
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok()
}

fn parse_unix(s: &str) -> Option<NaiveDateTime> {
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    unix_float(f)
}

fn unix_float(f: f64) -> Option<NaiveDateTime> {
    let secs = f.floor();
    let nanos = ((f - secs) * 1e9).round() as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

impl FromValue for NaiveDateTime {
    const KIND: &'static str = "timestamp";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            Value::Text(s) => parse_datetime(&s).ok_or_else(|| {
                CoerceError::new("text", Self::KIND, format!("'{}' is not a recognized timestamp", s))
            }),
            Value::Int(i) => DateTime::from_timestamp(i, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| CoerceError::new("integer", Self::KIND, format!("{} is out of range", i))),
            Value::Float(f) => unix_float(f)
                .ok_or_else(|| CoerceError::new("float", Self::KIND, format!("{} is out of range", f))),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    const KIND: &'static str = "timestamptz";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        NaiveDateTime::from_value(value)
            .map(|ts| ts.and_utc())
            .map_err(|e| CoerceError { to: Self::KIND, ..e })
    }
}

impl FromValue for NaiveDate {
    const KIND: &'static str = "date";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        NaiveDateTime::from_value(value)
            .map(|ts| ts.date())
            .map_err(|e| CoerceError { to: Self::KIND, ..e })
    }
}

impl FromValue for NaiveTime {
    const KIND: &'static str = "time";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        if let Value::Text(s) = &value {
            if let Some(time) = parse_time(s.trim()) {
                return Ok(time);
            }
        }
        NaiveDateTime::from_value(value)
            .map(|ts| ts.time())
            .map_err(|e| CoerceError { to: Self::KIND, ..e })
    }
}

// ─── Misc ───────────────────────────────────────────────────────────────────

impl FromValue for uuid::Uuid {
    const KIND: &'static str = "uuid";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(s) => uuid::Uuid::parse_str(s.trim())
                .map_err(|e| CoerceError::new("text", Self::KIND, e.to_string())),
            Value::Bytes(b) => uuid::Uuid::from_slice(&b)
                .map_err(|e| CoerceError::new("binary", Self::KIND, e.to_string())),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for serde_json::Value {
    const KIND: &'static str = "json";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Text(s) => serde_json::from_str(&s)
                .map_err(|e| CoerceError::new("text", Self::KIND, e.to_string())),
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Int(i) => Ok(serde_json::Value::from(i)),
            Value::Float(f) => Ok(serde_json::Value::from(f)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Value {
    const KIND: &'static str = "value";

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: &'static str = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
