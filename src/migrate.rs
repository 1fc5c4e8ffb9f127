//! Versioned schema migrations with a tracking table.
//!
//! Each migration is applied at most once; the tracker records version, name
//! and a content checksum. A checksum mismatch against an already-applied
//! version aborts the run before any pending migration executes.

use crate::error::Error;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::fmt::Write;

const TRACKER_DDL: &str = "\
CREATE TABLE IF NOT EXISTS _repogen_migrations (
    version BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

#[derive(Clone, Copy, Debug)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// SHA-256 of the migration text, lowercase hex.
pub fn checksum(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Partition migrations into already-applied (checksum-verified) and pending.
/// Versions must be strictly ascending; an applied version whose stored
/// checksum no longer matches the source text aborts the whole run.
fn pending<'m>(
    applied: &HashMap<i64, String>,
    migrations: &'m [Migration],
) -> Result<Vec<&'m Migration>, Error> {
    let mut last = i64::MIN;
    let mut todo = Vec::new();
    for m in migrations {
        if m.version <= last {
            return Err(Error::Internal(format!(
                "migration versions must be strictly ascending, got {} after {}",
                m.version, last
            )));
        }
        last = m.version;
        match applied.get(&m.version) {
            Some(stored) if *stored == checksum(m.sql) => {}
            Some(_) => {
                return Err(Error::Internal(format!(
                    "migration {} '{}' was modified after being applied",
                    m.version, m.name
                )));
            }
            None => todo.push(m),
        }
    }
    Ok(todo)
}

/// Apply all pending migrations in order. Each migration and its tracking
/// row commit in one transaction. Returns the number applied.
pub async fn apply(pool: &PgPool, migrations: &[Migration]) -> Result<u32, Error> {
    sqlx::raw_sql(TRACKER_DDL).execute(pool).await?;

    let rows = sqlx::query("SELECT version, checksum FROM _repogen_migrations")
        .fetch_all(pool)
        .await?;
    let mut applied = HashMap::with_capacity(rows.len());
    for row in rows {
        applied.insert(row.try_get::<i64, _>("version")?, row.try_get("checksum")?);
    }

    let todo = pending(&applied, migrations)?;
    let count = todo.len() as u32;
    for m in todo {
        tracing::info!(version = m.version, name = m.name, "applying migration");
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(m.sql).execute(&mut *tx).await?;
        sqlx::query(
            "INSERT INTO _repogen_migrations (version, name, checksum) VALUES ($1, $2, $3)",
        )
        .bind(m.version)
        .bind(m.name)
        .bind(checksum(m.sql))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const M1: Migration = Migration {
        version: 1,
        name: "create_tasks",
        sql: "CREATE TABLE tasks (id TEXT PRIMARY KEY)",
    };
    const M2: Migration = Migration {
        version: 2,
        name: "add_title",
        sql: "ALTER TABLE tasks ADD COLUMN title TEXT",
    };

    #[test]
    fn checksum_is_stable_lowercase_hex() {
        let a = checksum(M1.sql);
        assert_eq!(a, checksum(M1.sql));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, checksum(M2.sql));
    }

    #[test]
    fn applied_versions_are_skipped() {
        let mut applied = HashMap::new();
        applied.insert(1, checksum(M1.sql));
        let todo = pending(&applied, &[M1, M2]).unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].version, 2);
    }

    #[test]
    fn modified_applied_migration_aborts() {
        let mut applied = HashMap::new();
        applied.insert(1, checksum("something else"));
        let err = pending(&applied, &[M1, M2]).unwrap_err();
        assert!(err.to_string().contains("modified"));
    }

    #[test]
    fn out_of_order_versions_abort() {
        assert!(pending(&HashMap::new(), &[M2, M1]).is_err());
        assert!(pending(&HashMap::new(), &[M1, M1]).is_err());
    }
}
