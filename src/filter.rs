//! Filter-parameter parsing: each optional parameter converts independently
//! from text to a typed value. A failed conversion fails the whole filter
//! request, naming the field and the raw value. Values are never coerced
//! and never silently dropped.

use crate::error::Error;
use chrono::{DateTime, Utc};

pub fn string(_field: &str, raw: Option<&str>) -> Option<String> {
    raw.map(String::from)
}

pub fn integer(field: &str, raw: Option<&str>) -> Result<Option<i64>, Error> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::validation(field, format!("invalid integer '{s}'"))),
    }
}

pub fn boolean(field: &str, raw: Option<&str>) -> Result<Option<bool>, Error> {
    match raw {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(s) => Err(Error::validation(field, format!("invalid boolean '{s}'"))),
    }
}

/// RFC 3339 timestamps only.
pub fn timestamp(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, Error> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| Error::validation(field, format!("invalid timestamp '{s}'"))),
    }
}

pub fn uuid(field: &str, raw: Option<&str>) -> Result<Option<uuid::Uuid>, Error> {
    match raw {
        None => Ok(None),
        Some(s) => uuid::Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| Error::validation(field, format!("invalid uuid '{s}'"))),
    }
}
