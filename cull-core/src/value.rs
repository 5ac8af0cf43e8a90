//! Value types staged into the temporary table

use serde::{Deserialize, Serialize};

/// A SQL value staged for an identifier column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// UUID value
    Uuid(uuid::Uuid),
    /// Calendar date value
    Date(chrono::NaiveDate),
    /// UTC timestamp value
    Timestamp(chrono::DateTime<chrono::Utc>),
    /// JSON value
    Json(serde_json::Value),
    /// Arbitrary precision decimal value
    #[cfg(feature = "decimal-support")]
    Decimal(rust_decimal::Decimal),
}

/// PostgreSQL column type of a staged value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Text,
    Bytea,
    Uuid,
    Date,
    TimestampTz,
    Jsonb,
    #[cfg(feature = "decimal-support")]
    Numeric,
}

impl SqlType {
    /// Get the SQL type name used in staging table DDL
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Bytea => "BYTEA",
            SqlType::Uuid => "UUID",
            SqlType::Date => "DATE",
            SqlType::TimestampTz => "TIMESTAMPTZ",
            SqlType::Jsonb => "JSONB",
            #[cfg(feature = "decimal-support")]
            SqlType::Numeric => "NUMERIC",
        }
    }

    /// Whether join comparisons on this type accept a collation override
    pub fn is_text(&self) -> bool {
        matches!(self, SqlType::Text)
    }

    /// Unify two inferred column types, widening numerics where possible
    pub fn unify(self, other: SqlType) -> Option<SqlType> {
        use SqlType::*;

        if self == other {
            return Some(self);
        }

        match (self, other) {
            (Integer, BigInt) | (BigInt, Integer) => Some(BigInt),
            (Real, DoublePrecision) | (DoublePrecision, Real) => Some(DoublePrecision),
            (Integer | BigInt, Real | DoublePrecision) | (Real | DoublePrecision, Integer | BigInt) => {
                Some(DoublePrecision)
            }
            _ => None,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the PostgreSQL column type for this value, if it carries one
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(SqlType::Boolean),
            Value::I32(_) => Some(SqlType::Integer),
            Value::I64(_) => Some(SqlType::BigInt),
            Value::F32(_) => Some(SqlType::Real),
            Value::F64(_) => Some(SqlType::DoublePrecision),
            Value::String(_) => Some(SqlType::Text),
            Value::Bytes(_) => Some(SqlType::Bytea),
            Value::Uuid(_) => Some(SqlType::Uuid),
            Value::Date(_) => Some(SqlType::Date),
            Value::Timestamp(_) => Some(SqlType::TimestampTz),
            Value::Json(_) => Some(SqlType::Jsonb),
            #[cfg(feature = "decimal-support")]
            Value::Decimal(_) => Some(SqlType::Numeric),
        }
    }

    /// Convert a serialized row field into a staged value
    ///
    /// Numbers stage as BIGINT when integral and DOUBLE PRECISION otherwise;
    /// nested arrays and objects stage as JSONB.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }

    /// Append this value to a COPY text-format buffer
    ///
    /// NULL renders as `\N`; tab, newline, carriage return, and backslash
    /// are escaped per the COPY text format rules.
    pub fn encode_copy_text(&self, buf: &mut String) {
        use std::fmt::Write;

        match self {
            Value::Null => buf.push_str("\\N"),
            Value::Bool(b) => buf.push(if *b { 't' } else { 'f' }),
            Value::I32(i) => {
                let _ = write!(buf, "{i}");
            }
            Value::I64(i) => {
                let _ = write!(buf, "{i}");
            }
            Value::F32(f) => {
                let _ = write!(buf, "{f}");
            }
            Value::F64(f) => {
                let _ = write!(buf, "{f}");
            }
            Value::String(s) => push_escaped(buf, s),
            Value::Bytes(bytes) => {
                // bytea hex input needs its leading backslash doubled in COPY text
                buf.push_str("\\\\x");
                for byte in bytes {
                    let _ = write!(buf, "{byte:02x}");
                }
            }
            Value::Uuid(u) => {
                let _ = write!(buf, "{u}");
            }
            Value::Date(d) => {
                let _ = write!(buf, "{}", d.format("%Y-%m-%d"));
            }
            Value::Timestamp(ts) => {
                let _ = write!(buf, "{}", ts.format("%Y-%m-%d %H:%M:%S%.6f+00"));
            }
            Value::Json(j) => {
                let rendered = j.to_string();
                push_escaped(buf, &rendered);
            }
            #[cfg(feature = "decimal-support")]
            Value::Decimal(d) => {
                let _ = write!(buf, "{d}");
            }
        }
    }
}

fn push_escaped(buf: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '\t' => buf.push_str("\\t"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            _ => buf.push(c),
        }
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Self {
        Value::Bytes(val)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(val: uuid::Uuid) -> Self {
        Value::Uuid(val)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(val: chrono::NaiveDate) -> Self {
        Value::Date(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        Value::Timestamp(val)
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Json(val)
    }
}

#[cfg(feature = "decimal-support")]
impl From<rust_decimal::Decimal> for Value {
    fn from(val: rust_decimal::Decimal) -> Self {
        Value::Decimal(val)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_creation() {
        assert_eq!(Value::from(42i32), Value::I32(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(42i64)), Value::I64(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::I32(42).is_null());
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(Value::I64(42).sql_type(), Some(SqlType::BigInt));
        assert_eq!(Value::String("x".to_string()).sql_type(), Some(SqlType::Text));
        assert_eq!(Value::Bool(true).sql_type(), Some(SqlType::Boolean));
        assert_eq!(Value::Null.sql_type(), None);
        assert_eq!(SqlType::DoublePrecision.as_sql(), "DOUBLE PRECISION");
    }

    #[test]
    fn test_unify_widens_numerics() {
        assert_eq!(SqlType::Integer.unify(SqlType::BigInt), Some(SqlType::BigInt));
        assert_eq!(SqlType::BigInt.unify(SqlType::DoublePrecision), Some(SqlType::DoublePrecision));
        assert_eq!(SqlType::Text.unify(SqlType::Text), Some(SqlType::Text));
        assert_eq!(SqlType::Text.unify(SqlType::BigInt), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(serde_json::json!(7)), Value::I64(7));
        assert_eq!(Value::from_json(serde_json::json!(1.5)), Value::F64(1.5));
        assert_eq!(Value::from_json(serde_json::json!("abc")), Value::String("abc".to_string()));
        assert_eq!(
            Value::from_json(serde_json::json!([1, 2])),
            Value::Json(serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn test_copy_text_scalars() {
        let mut buf = String::new();
        Value::I64(42).encode_copy_text(&mut buf);
        buf.push('\t');
        Value::Bool(false).encode_copy_text(&mut buf);
        buf.push('\t');
        Value::Null.encode_copy_text(&mut buf);
        assert_eq!(buf, "42\tf\t\\N");
    }

    #[test]
    fn test_copy_text_escaping() {
        let mut buf = String::new();
        Value::String("a\tb\nc\\d".to_string()).encode_copy_text(&mut buf);
        assert_eq!(buf, "a\\tb\\nc\\\\d");
    }

    #[test]
    fn test_copy_text_bytes() {
        let mut buf = String::new();
        Value::Bytes(vec![0xde, 0xad]).encode_copy_text(&mut buf);
        assert_eq!(buf, "\\\\xdead");
    }

    #[test]
    fn test_copy_text_uuid_and_timestamp() {
        let id = uuid::Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let mut buf = String::new();
        Value::Uuid(id).encode_copy_text(&mut buf);
        assert_eq!(buf, "67e55044-10b1-426f-9247-bb680e5fe0c8");

        let ts = chrono::DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let mut buf = String::new();
        Value::Timestamp(ts).encode_copy_text(&mut buf);
        assert_eq!(buf, "2024-01-15 10:30:00.000000+00");
    }
}
