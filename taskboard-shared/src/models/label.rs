/// Label model and database operations
///
/// Labels are attached to tasks through the `task_labels` join table. A label
/// attached to any task cannot be deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,

    /// Unique display name
    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Label {
    pub async fn create<'e, E>(executor: E, name: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Label>(
            "INSERT INTO labels (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Loads every label whose ID is in `ids`
    ///
    /// Callers compare the result against `ids` to detect unknown labels.
    pub async fn find_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at FROM labels WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels ORDER BY id")
            .fetch_all(executor)
            .await
    }

    /// Renames a label; `None` if it does not exist
    pub async fn update<'e, E>(executor: E, id: i64, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts labels with this name
    pub async fn count_by_name<'e, E>(executor: E, name: &str) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM labels WHERE name = $1")
            .bind(name)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }
}
