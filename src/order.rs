//! Order-by translation: client-facing field names to validated backend
//! order expressions. The resolved expression always carries the primary key
//! as a final tie-break so the scan order is total.

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(Error::validation(
                "order",
                format!("unknown direction '{s}'"),
            )),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// Row-value comparator resuming a scan in this direction.
    pub fn comparator(self) -> &'static str {
        match self {
            Direction::Asc => ">",
            Direction::Desc => "<",
        }
    }
}

/// One orderable field: client name, storage column, and the column's
/// PostgreSQL type (cursor parameters are cast to it when binding).
#[derive(Clone, Copy, Debug)]
pub struct OrderField {
    pub name: &'static str,
    pub column: &'static str,
    pub pg_type: &'static str,
}

/// Static per-entity order map, emitted by the generator.
#[derive(Clone, Copy, Debug)]
pub struct OrderMap {
    pub fields: &'static [OrderField],
    /// Client name used when no order input is supplied. Must appear in
    /// `fields`.
    pub default_field: &'static str,
    pub default_direction: Direction,
    pub pk_column: &'static str,
    pub pk_pg_type: &'static str,
}

/// A validated order expression. Pure data; SQL rendering happens in the
/// statement builders.
#[derive(Clone, Copy, Debug)]
pub struct OrderExpr {
    pub column: &'static str,
    pub pg_type: &'static str,
    pub direction: Direction,
    pub pk_column: &'static str,
    pub pk_pg_type: &'static str,
}

impl OrderMap {
    /// Resolve raw order input of the form `{field},{direction}`. Direction
    /// defaults to ascending. An unrecognized field or direction is rejected,
    /// never silently defaulted.
    pub fn resolve(&self, input: Option<&str>) -> Result<OrderExpr, Error> {
        let (name, direction) = match input {
            None => (self.default_field, self.default_direction),
            Some(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    (self.default_field, self.default_direction)
                } else {
                    match raw.split_once(',') {
                        Some((field, dir)) => (field.trim(), Direction::parse(dir.trim())?),
                        None => (raw, Direction::Asc),
                    }
                }
            }
        };
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::validation("order", format!("unknown order field '{name}'")))?;
        Ok(OrderExpr {
            column: field.column,
            pg_type: field.pg_type,
            direction,
            pk_column: self.pk_column,
            pk_pg_type: self.pk_pg_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: OrderMap = OrderMap {
        fields: &[
            OrderField {
                name: "id",
                column: "id",
                pg_type: "text",
            },
            OrderField {
                name: "created_at",
                column: "created_at",
                pg_type: "timestamptz",
            },
        ],
        default_field: "id",
        default_direction: Direction::Asc,
        pk_column: "id",
        pk_pg_type: "text",
    };

    #[test]
    fn default_order_carries_pk_tie_break() {
        let expr = MAP.resolve(None).unwrap();
        assert_eq!(expr.column, "id");
        assert_eq!(expr.pk_column, "id");
        assert_eq!(expr.direction, Direction::Asc);
    }

    #[test]
    fn field_and_direction_parse() {
        let expr = MAP.resolve(Some("created_at,desc")).unwrap();
        assert_eq!(expr.column, "created_at");
        assert_eq!(expr.direction, Direction::Desc);
    }

    #[test]
    fn omitted_direction_defaults_ascending() {
        let expr = MAP.resolve(Some("created_at")).unwrap();
        assert_eq!(expr.direction, Direction::Asc);
    }

    #[test]
    fn unknown_field_is_rejected_by_name() {
        let err = MAP.resolve(Some("priority")).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn unknown_direction_is_rejected() {
        assert!(MAP.resolve(Some("id,sideways")).is_err());
    }
}
