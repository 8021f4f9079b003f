/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks` - List tasks, optionally filtered
/// - `POST /api/tasks` - Create a task authored by the caller
/// - `GET /api/tasks/:id` - Get one task
/// - `PUT /api/tasks/:id` - Replace a task (author only)
/// - `DELETE /api/tasks/:id` - Delete a task (author only)
///
/// # Filters
///
/// ```text
/// GET /api/tasks?taskStatus=1&executorId=2&authorId=3&labels=[4,5]&isMyTasks=true
/// ```
///
/// Every parameter is optional; see `taskboard_shared::filter` for the exact
/// rules. A malformed value is a 400.
///
/// # Request body
///
/// ```json
/// {
///   "name": "Write release notes",
///   "description": "For 1.2",
///   "taskStatusId": 1,
///   "executorId": 2,
///   "labelIds": [3, 4]
/// }
/// ```
///
/// Responses embed the status, author, executor, and labels.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    services::tasks::{self, TaskRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::collections::HashMap;
use taskboard_shared::{
    auth::middleware::AuthContext,
    filter::TaskFilter,
    models::task::TaskDetails,
};
use validator::Validate;

/// List tasks
///
/// The filter is parsed before the database is touched.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let filter = TaskFilter::from_params(&params)?;

    Ok(Json(tasks::list_tasks(&state.db, &auth, &filter).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskDetails>> {
    Ok(Json(tasks::get_task(&state.db, id).await?))
}

/// Create a task
///
/// # Errors
///
/// - `401 Unauthorized`: The caller's account no longer exists
/// - `422 Unprocessable Entity`: Validation failed, duplicate name, or an
///   unknown status, executor, or label
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetails>)> {
    req.validate()?;

    let task = tasks::create_task(&state.db, &auth, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Replace a task
///
/// Labels are only replaced when `labelIds` is present.
///
/// # Errors
///
/// - `403 Forbidden`: The caller isn't the author
/// - `404 Not Found`: No such task
/// - `422 Unprocessable Entity`: Same as create
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<Json<TaskDetails>> {
    req.validate()?;

    Ok(Json(tasks::update_task(&state.db, &auth, id, req).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    tasks::delete_task(&state.db, &auth, id).await?;
    Ok(StatusCode::OK)
}
