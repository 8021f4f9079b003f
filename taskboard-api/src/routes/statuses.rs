/// Task status endpoints
///
/// # Endpoints
///
/// - `GET /api/statuses` - List statuses
/// - `POST /api/statuses` - Create a status
/// - `GET /api/statuses/:id` - Get one status
/// - `PUT /api/statuses/:id` - Rename a status
/// - `DELETE /api/statuses/:id` - Delete an unused status
///
/// Request body for create and rename:
///
/// ```json
/// { "name": "In review" }
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    services::{statuses, NameRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskboard_shared::models::task_status::TaskStatus;
use validator::Validate;

pub async fn list_statuses(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskStatus>>> {
    Ok(Json(statuses::list_statuses(&state.db).await?))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskStatus>> {
    Ok(Json(statuses::get_status(&state.db, id).await?))
}

pub async fn create_status(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<TaskStatus>)> {
    req.validate()?;

    let status = statuses::create_status(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<Json<TaskStatus>> {
    req.validate()?;

    Ok(Json(statuses::update_status(&state.db, id, req).await?))
}

pub async fn delete_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    statuses::delete_status(&state.db, id).await?;
    Ok(StatusCode::OK)
}
