/// Task status model and database operations
///
/// A status ("New", "In review", ...) is required on every task. A status
/// that is still referenced by a task cannot be deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_statuses (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(1000) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

/// Task status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub id: i64,

    /// Unique display name
    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl TaskStatus {
    /// Inserts a status
    ///
    /// # Errors
    ///
    /// A duplicate name fails with the `task_statuses_name_key` unique violation.
    pub async fn create<'e, E>(executor: E, name: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskStatus>(
            r#"
            INSERT INTO task_statuses (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, created_at FROM task_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Loads every status whose ID is in `ids`
    pub async fn find_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, created_at FROM task_statuses WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskStatus>("SELECT id, name, created_at FROM task_statuses ORDER BY id")
            .fetch_all(executor)
            .await
    }

    /// Renames a status; `None` if it does not exist
    pub async fn update<'e, E>(executor: E, id: i64, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskStatus>(
            r#"
            UPDATE task_statuses
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a status, returning false if it didn't exist
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM task_statuses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts statuses with this name
    pub async fn count_by_name<'e, E>(executor: E, name: &str) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_statuses WHERE name = $1")
            .bind(name)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}
