use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::gateway::{ItemStore, StoreError};
use super::models::{Item, ItemChanges};
use crate::config::{is_valid_table_name, StorageConfig};
use crate::types;

const COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

/// PostgreSQL-backed item store. Conditional writes are single
/// `UPDATE`/`DELETE ... WHERE id = $1 AND user_id = $2` statements.
pub struct PgItemStore {
    pool: PgPool,
    table: String,
}

impl PgItemStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(StoreError::Unavailable(format!("invalid table name: {}", table)));
        }
        Ok(Self { pool, table })
    }

    /// Open a pool from configuration and make sure the table exists
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for table: {}", config.table_name);

        let store = Self::new(pool, config.table_name.clone())?;
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the table and owner index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let table = self.quoted_table();
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL
            )
            "#
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (user_id, created_at)",
            quote_identifier(&format!("{}_user_index", self.table)),
            table
        );
        sqlx::query(&create_index).execute(&self.pool).await?;
        Ok(())
    }

    fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", self.quoted_table());
        let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn put(&self, item: &Item) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            "#,
            self.quoted_table()
        );
        sqlx::query(&sql)
            .bind(&item.id)
            .bind(&item.user_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.quoted_table());
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn query_by_owner(&self, user_id: &str) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
            self.quoted_table()
        );
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn conditional_update(
        &self,
        id: &str,
        changes: &ItemChanges,
        expected_user_id: &str,
    ) -> Result<Item, StoreError> {
        // GREATEST keeps updated_at strictly increasing when the clock has not moved
        let sql = format!(
            r#"
            UPDATE {}
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = GREATEST($5, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#,
            self.quoted_table()
        );
        let updated = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(expected_user_id)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(types::now())
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(item) => Ok(item),
            None => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: self.exists(id).await?,
            }),
        }
    }

    async fn conditional_delete(&self, id: &str, expected_user_id: &str) -> Result<Item, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}",
            self.quoted_table()
        );
        let deleted = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(expected_user_id)
            .fetch_optional(&self.pool)
            .await?;

        match deleted {
            Some(item) => Ok(item),
            // The existence probe runs after the failed delete; a concurrent
            // delete in between can only turn "foreign" into "missing".
            None => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: self.exists(id).await?,
            }),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
