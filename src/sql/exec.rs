//! Statement execution shared by generated stores: one pooled acquisition
//! per statement, the operation deadline honored, and zero affected rows
//! mapped to NotFound.

use crate::error::Error;
use crate::order::OrderExpr;
use crate::repo::OpContext;
use crate::sql::builder::{self, TableMeta};
use crate::sql::PgBindValue;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

type Clauses = Vec<(&'static str, PgBindValue)>;

fn columns(clauses: &Clauses) -> Vec<&'static str> {
    clauses.iter().map(|(c, _)| *c).collect()
}

/// Single-row fetch by primary key; zero rows is NotFound, never a generic
/// error.
pub async fn fetch_by_id<E>(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    id: PgBindValue,
    filters: Clauses,
) -> Result<E, Error>
where
    E: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = builder::select_by_id(meta, &columns(&filters));
    tracing::debug!(sql = %sql, entity = meta.entity, "get");
    let mut query = sqlx::query_as::<_, E>(&sql).bind(id);
    for (_, v) in filters {
        query = query.bind(v);
    }
    let row = ctx.run("get", query.fetch_optional(pool)).await?;
    row.ok_or_else(|| Error::NotFound(meta.entity.to_string()))
}

pub async fn insert_returning<E>(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    values: Clauses,
) -> Result<E, Error>
where
    E: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = builder::insert(meta, &columns(&values));
    tracing::debug!(sql = %sql, entity = meta.entity, "create");
    let mut query = sqlx::query_as::<_, E>(&sql);
    for (_, v) in values {
        query = query.bind(v);
    }
    ctx.run("create", query.fetch_one(pool)).await
}

/// Partial update: SET exactly the payload-present columns. The updated-at
/// column is always stamped with the caller's value if supplied, else now. An
/// empty payload is rejected before any backend call.
pub async fn update_returning<E>(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    id: PgBindValue,
    mut sets: Clauses,
    updated_at: Option<DateTime<Utc>>,
) -> Result<E, Error>
where
    E: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    if sets.is_empty() && updated_at.is_none() {
        return Err(Error::validation("payload", "no fields to update"));
    }
    let stamp = updated_at.unwrap_or_else(Utc::now);
    sets.push((meta.updated_at_column, PgBindValue::from(stamp)));
    let sql = builder::update(meta, &columns(&sets));
    tracing::debug!(sql = %sql, entity = meta.entity, "update");
    let mut query = sqlx::query_as::<_, E>(&sql);
    for (_, v) in sets {
        query = query.bind(v);
    }
    query = query.bind(id);
    let row = ctx.run("update", query.fetch_optional(pool)).await?;
    row.ok_or_else(|| Error::NotFound(meta.entity.to_string()))
}

pub async fn delete_by_id(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    id: PgBindValue,
) -> Result<(), Error> {
    let sql = builder::delete(meta);
    tracing::debug!(sql = %sql, entity = meta.entity, "delete");
    let done = ctx
        .run("delete", sqlx::query(&sql).bind(id).execute(pool))
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound(meta.entity.to_string()));
    }
    Ok(())
}

pub async fn archive_by_id(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    id: PgBindValue,
) -> Result<(), Error> {
    let sql = builder::archive(meta);
    tracing::debug!(sql = %sql, entity = meta.entity, "archive");
    let done = ctx
        .run("archive", sqlx::query(&sql).bind(id).execute(pool))
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound(meta.entity.to_string()));
    }
    Ok(())
}

/// Fetch one page plus a probe row: the caller trims the extra row and uses
/// it as the exact has-next signal.
pub async fn fetch_page<E>(
    ctx: &OpContext,
    pool: &PgPool,
    meta: &TableMeta,
    order: &OrderExpr,
    filters: Clauses,
    cursor: Option<(PgBindValue, PgBindValue)>,
    limit: u32,
) -> Result<Vec<E>, Error>
where
    E: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = builder::select_page(meta, order, &columns(&filters), cursor.is_some());
    tracing::debug!(sql = %sql, entity = meta.entity, "list");
    let mut query = sqlx::query_as::<_, E>(&sql);
    for (_, v) in filters {
        query = query.bind(v);
    }
    if let Some((order_value, key)) = cursor {
        query = query.bind(order_value).bind(key);
    }
    query = query.bind(i64::from(limit) + 1);
    ctx.run("list", query.fetch_all(pool)).await
}
