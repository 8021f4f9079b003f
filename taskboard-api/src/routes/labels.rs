/// Label endpoints
///
/// - `GET /api/labels`, `POST /api/labels`
/// - `GET /api/labels/:id`, `PUT /api/labels/:id`, `DELETE /api/labels/:id`
///
/// Same shape as the status endpoints. A label attached to a task can't be
/// deleted (422).

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    services::{labels, NameRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskboard_shared::models::label::Label;
use validator::Validate;

pub async fn list_labels(State(state): State<AppState>) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(labels::list_labels(&state.db).await?))
}

pub async fn get_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Label>> {
    Ok(Json(labels::get_label(&state.db, id).await?))
}

pub async fn create_label(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    req.validate()?;

    let label = labels::create_label(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

pub async fn update_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<Json<Label>> {
    req.validate()?;

    Ok(Json(labels::update_label(&state.db, id, req).await?))
}

pub async fn delete_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    labels::delete_label(&state.db, id).await?;
    Ok(StatusCode::OK)
}
