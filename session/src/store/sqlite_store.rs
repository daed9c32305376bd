//! SQLiteKeyValueStore
//! --------------------
//! SQLite-backed implementation of [`KeyValueStore`]. The session layer keeps
//! its four keys in a single `session_kv` table so that:
//!
//!  - the session survives process restarts
//!  - a login writes every key in one transaction
//!  - a logout removes exactly its own keys and nothing else in the file
use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::KeyValueStore;

/// SQLite persistence backend for the session namespace.
///
/// Provides:
///
///   - schema creation on startup (`new` / `migrate`)
///   - multi-key reads (`get_many`)
///   - transactional upserts (`set_many`)
///   - transactional deletes (`remove_many`)
pub struct SQLiteKeyValueStore {
    pool: SqlitePool,
}

impl SQLiteKeyValueStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, creating the database file if needed, and ensure the
    /// schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SQLiteKeyValueStore {
    async fn get_many(&self, keys: &[&str]) -> anyhow::Result<HashMap<String, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT key, value FROM session_kv WHERE key IN (");
        let mut sep = qb.separated(", ");
        for k in keys {
            sep.push_bind(*k);
        }
        sep.push_unseparated(")");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut out = HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            out.insert(key, value);
        }

        Ok(out)
    }

    /// Upsert every entry inside one transaction.
    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO session_kv (key, value)
                VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value;
            "#,
            )
            .bind(*key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete exactly `keys` inside one transaction. Missing keys are not an
    /// error.
    async fn remove_many(&self, keys: &[&str]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for key in keys {
            sqlx::query("DELETE FROM session_kv WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
