use super::store::{storage_key, Namespace, Store};
use crate::error::AppResult;
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Store backed by the `kv_entries` table
pub struct PostgresStore {
    pool: Arc<DbPool>,
}

impl PostgresStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get(&self, namespace: Namespace, user_id: Uuid) -> AppResult<Option<String>> {
        let pool = self.pool.as_ref();
        let key = storage_key(namespace, user_id);

        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM kv_entries
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, namespace: Namespace, user_id: Uuid, value: String) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let key = storage_key(namespace, user_id);

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        check_connection(self.pool.as_ref()).await?;
        Ok(())
    }
}
