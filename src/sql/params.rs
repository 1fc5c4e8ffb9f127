//! Bind values for dynamically assembled statements.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query.
#[derive(Clone, Debug)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl PgBindValue {
    /// Convert a decoded cursor order value into a bind value of the order
    /// column's type. A value that does not fit the column type was minted
    /// under a different order and is rejected as a stale cursor, not passed
    /// through to fail a backend cast.
    pub fn from_order_value(v: &Value, pg_type: &str) -> Result<Self, Error> {
        let bound = match (pg_type, v) {
            ("text", Value::String(s)) => Some(PgBindValue::String(s.clone())),
            ("int4", Value::Number(n)) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(PgBindValue::I32),
            ("int8", Value::Number(n)) => n.as_i64().map(PgBindValue::I64),
            ("bool", Value::Bool(b)) => Some(PgBindValue::Bool(*b)),
            ("timestamptz", Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| PgBindValue::Timestamp(t.with_timezone(&Utc))),
            ("uuid", Value::String(s)) => uuid::Uuid::parse_str(s).ok().map(PgBindValue::Uuid),
            _ => None,
        };
        bound.ok_or_else(|| {
            Error::validation(
                "cursor",
                format!("cursor does not match order type '{pg_type}'"),
            )
        })
    }
}

impl From<String> for PgBindValue {
    fn from(v: String) -> Self {
        PgBindValue::String(v)
    }
}

impl From<&str> for PgBindValue {
    fn from(v: &str) -> Self {
        PgBindValue::String(v.to_string())
    }
}

impl From<i32> for PgBindValue {
    fn from(v: i32) -> Self {
        PgBindValue::I32(v)
    }
}

impl From<i64> for PgBindValue {
    fn from(v: i64) -> Self {
        PgBindValue::I64(v)
    }
}

impl From<f64> for PgBindValue {
    fn from(v: f64) -> Self {
        PgBindValue::F64(v)
    }
}

impl From<bool> for PgBindValue {
    fn from(v: bool) -> Self {
        PgBindValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for PgBindValue {
    fn from(v: DateTime<Utc>) -> Self {
        PgBindValue::Timestamp(v)
    }
}

impl From<uuid::Uuid> for PgBindValue {
    fn from(v: uuid::Uuid) -> Self {
        PgBindValue::Uuid(v)
    }
}

impl From<Value> for PgBindValue {
    fn from(v: Value) -> Self {
        PgBindValue::Json(v)
    }
}

impl<T: Into<PgBindValue>> From<Option<T>> for PgBindValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => PgBindValue::Null,
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I32(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            PgBindValue::Timestamp(t) => {
                <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf)?
            }
            PgBindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null => PgTypeInfo::with_name("TEXT"),
            PgBindValue::Bool(_) => PgTypeInfo::with_name("BOOL"),
            PgBindValue::I32(_) => PgTypeInfo::with_name("INT4"),
            PgBindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBindValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            PgBindValue::String(_) => PgTypeInfo::with_name("TEXT"),
            PgBindValue::Uuid(_) => PgTypeInfo::with_name("UUID"),
            PgBindValue::Timestamp(_) => PgTypeInfo::with_name("TIMESTAMPTZ"),
            PgBindValue::Json(_) => PgTypeInfo::with_name("JSONB"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
