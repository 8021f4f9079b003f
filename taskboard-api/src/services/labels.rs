/// Label service
///
/// Any authenticated user may manage labels. A label attached to any task
/// cannot be deleted.

use crate::error::{ApiError, ApiResult};
use crate::services::NameRequest;
use sqlx::PgPool;
use taskboard_shared::models::{label::Label, task::Task};
use tracing::debug;

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Label {id} not found"))
}

pub async fn get_label(pool: &PgPool, id: i64) -> ApiResult<Label> {
    Label::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn list_labels(pool: &PgPool) -> ApiResult<Vec<Label>> {
    Ok(Label::list(pool).await?)
}

pub async fn create_label(pool: &PgPool, req: NameRequest) -> ApiResult<Label> {
    let mut tx = pool.begin().await?;
    let label = Label::create(&mut *tx, &req.name).await?;
    tx.commit().await?;

    debug!(label_id = label.id, name = %label.name, "Label created");
    Ok(label)
}

pub async fn update_label(pool: &PgPool, id: i64, req: NameRequest) -> ApiResult<Label> {
    let mut tx = pool.begin().await?;
    let label = Label::update(&mut *tx, id, &req.name)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    debug!(label_id = id, name = %label.name, "Label renamed");
    Ok(label)
}

/// Deletes a label no task carries
///
/// 404 if it doesn't exist, 422 if a task carries it.
pub async fn delete_label(pool: &PgPool, id: i64) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    if Label::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(not_found(id));
    }

    if Task::is_label_in_use(&mut *tx, id).await? {
        return Err(ApiError::in_use("Label", id));
    }

    Label::delete(&mut *tx, id).await?;
    tx.commit().await?;

    debug!(label_id = id, "Label deleted");
    Ok(())
}
