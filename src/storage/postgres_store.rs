//! PostgreSQL implementation of TodoStore

use crate::storage::config::DatabaseConfig;
use crate::storage::{StorageBackend, StoreResult, TodoItem, TodoStore};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Connection;
use std::time::Duration;

/// Todo list stored in a single `todos (item text)` table
#[derive(Clone)]
pub struct PostgresTodoStore {
    pool: PgPool,
}

impl PostgresTodoStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool for `config` without opening any connection yet.
    ///
    /// Fails only when the assembled connection string cannot be parsed;
    /// reachability is checked later by `init` and `healthcheck`.
    pub fn connect_lazy(config: &DatabaseConfig) -> StoreResult<Self> {
        info!(
            "Creating PostgreSQL pool for {} (max {} connections)",
            config.redacted_connection_string(),
            config.pool_size
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.connection_string())?;
        Ok(Self::new(pool))
    }

    /// Close every pooled connection. Later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TodoStore for PostgresTodoStore {
    async fn init(&self) -> StoreResult<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS todos (item text)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_items(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<Option<String>> = sqlx::query_scalar("SELECT item FROM todos")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().flatten().collect())
    }

    async fn create_item(&self, item: &TodoItem) -> StoreResult<()> {
        sqlx::query("INSERT INTO todos (item) VALUES ($1)")
            .bind(item.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_item(&self, item: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE LOWER(item) = LOWER($1)")
            .bind(item)
            .execute(&self.pool)
            .await?;
        debug!("Deleted {} rows matching {:?}", result.rows_affected(), item);
        Ok(result.rows_affected())
    }

    async fn healthcheck(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }
}
