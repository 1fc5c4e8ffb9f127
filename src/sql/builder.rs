//! Builds parameterized CRUD SQL from generated table metadata.
//! Identifiers come from generated metadata only; values always bind as
//! parameters.

use crate::order::OrderExpr;

/// Static table metadata emitted once per entity.
#[derive(Clone, Copy, Debug)]
pub struct TableMeta {
    pub entity: &'static str,
    pub schema: &'static str,
    pub table: &'static str,
    pub pk_column: &'static str,
    pub entity_columns: &'static [&'static str],
    pub updated_at_column: &'static str,
    pub archived_at_column: &'static str,
}

/// Quote identifier for PostgreSQL (safe: only from generated metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

impl TableMeta {
    pub fn qualified(&self) -> String {
        format!("{}.{}", quoted(self.schema), quoted(self.table))
    }

    fn select_list(&self) -> String {
        self.entity_columns
            .iter()
            .map(|c| quoted(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// SELECT by primary key over all entity columns, with optional extra
/// equality filters. Params: id as $1, then filter values in order.
pub fn select_by_id(meta: &TableMeta, filter_columns: &[&str]) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        meta.select_list(),
        meta.qualified(),
        quoted(meta.pk_column)
    );
    for (i, col) in filter_columns.iter().enumerate() {
        sql.push_str(&format!(" AND {} = ${}", quoted(col), i + 2));
    }
    sql
}

/// INSERT over the given columns, returning the full inserted row.
pub fn insert(meta: &TableMeta, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quoted(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${n}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        meta.qualified(),
        cols.join(", "),
        placeholders.join(", "),
        meta.select_list()
    )
}

/// UPDATE by primary key: SET exactly the given columns, in order. Params:
/// set values as $1..$k, id as the last parameter. Returns the updated row.
pub fn update(meta: &TableMeta, set_columns: &[&str]) -> String {
    let sets: Vec<String> = set_columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", quoted(c), i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        meta.qualified(),
        sets.join(", "),
        quoted(meta.pk_column),
        set_columns.len() + 1,
        meta.select_list()
    )
}

/// Hard delete by primary key.
pub fn delete(meta: &TableMeta) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        meta.qualified(),
        quoted(meta.pk_column)
    )
}

/// Soft delete: stamp the archived-at column.
pub fn archive(meta: &TableMeta) -> String {
    format!(
        "UPDATE {} SET {} = NOW() WHERE {} = $1",
        meta.qualified(),
        quoted(meta.archived_at_column),
        quoted(meta.pk_column)
    )
}

/// Keyset page query. Params in order: filter values, then (when resuming)
/// the cursor's order value and key, then the limit. The resume predicate is
/// a row-value comparison so rows equal on the order value continue past the
/// remembered primary key.
pub fn select_page(
    meta: &TableMeta,
    order: &OrderExpr,
    filter_columns: &[&str],
    with_cursor: bool,
) -> String {
    let mut n = 0u32;
    let mut where_parts: Vec<String> = Vec::new();
    for col in filter_columns {
        n += 1;
        where_parts.push(format!("{} = ${}", quoted(col), n));
    }
    if with_cursor {
        let (v1, v2) = (n + 1, n + 2);
        n += 2;
        where_parts.push(format!(
            "({}, {}) {} (${}::{}, ${}::{})",
            quoted(order.column),
            quoted(order.pk_column),
            order.direction.comparator(),
            v1,
            order.pg_type,
            v2,
            order.pk_pg_type
        ));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    format!(
        "SELECT {} FROM {}{} ORDER BY {} {}, {} {} LIMIT ${}",
        meta.select_list(),
        meta.qualified(),
        where_clause,
        quoted(order.column),
        order.direction.keyword(),
        quoted(order.pk_column),
        order.direction.keyword(),
        n + 1
    )
}
