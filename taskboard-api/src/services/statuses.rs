/// Task status service
///
/// Any authenticated user may manage statuses. A status that any task is
/// in cannot be deleted.

use crate::error::{ApiError, ApiResult};
use crate::services::NameRequest;
use sqlx::PgPool;
use taskboard_shared::models::{task::Task, task_status::TaskStatus};
use tracing::debug;

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Task status {id} not found"))
}

pub async fn get_status(pool: &PgPool, id: i64) -> ApiResult<TaskStatus> {
    TaskStatus::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn list_statuses(pool: &PgPool) -> ApiResult<Vec<TaskStatus>> {
    Ok(TaskStatus::list(pool).await?)
}

pub async fn create_status(pool: &PgPool, req: NameRequest) -> ApiResult<TaskStatus> {
    let mut tx = pool.begin().await?;
    let status = TaskStatus::create(&mut *tx, &req.name).await?;
    tx.commit().await?;

    debug!(status_id = status.id, name = %status.name, "Task status created");
    Ok(status)
}

pub async fn update_status(pool: &PgPool, id: i64, req: NameRequest) -> ApiResult<TaskStatus> {
    let mut tx = pool.begin().await?;
    let status = TaskStatus::update(&mut *tx, id, &req.name)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    debug!(status_id = id, name = %status.name, "Task status renamed");
    Ok(status)
}

/// Deletes a status nobody uses
///
/// 404 if it doesn't exist, 422 if a task is in it.
pub async fn delete_status(pool: &PgPool, id: i64) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    if TaskStatus::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(not_found(id));
    }

    if Task::is_status_in_use(&mut *tx, id).await? {
        return Err(ApiError::in_use("Task status", id));
    }

    TaskStatus::delete(&mut *tx, id).await?;
    tx.commit().await?;

    debug!(status_id = id, "Task status deleted");
    Ok(())
}
