/// User endpoints
///
/// # Endpoints
///
/// - `POST /api/users` - Register (public)
/// - `GET /api/users` - List users (public)
/// - `GET /api/users/:id` - Get one user
/// - `PUT /api/users/:id` - Replace your own account
/// - `DELETE /api/users/:id` - Delete your own account
///
/// Password hashes are never part of a response.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    services::users::{self, UserRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{auth::middleware::AuthContext, models::user::User};
use validator::Validate;

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = users::create_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(&state.db).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(users::get_user(&state.db, id).await?))
}

/// Replace a user
///
/// # Errors
///
/// - `403 Forbidden`: Not your account
/// - `404 Not Found`: No such user
/// - `422 Unprocessable Entity`: Validation failed or email taken
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    Ok(Json(users::update_user(&state.db, &auth, id, req).await?))
}

/// Delete a user
///
/// # Errors
///
/// - `403 Forbidden`: Not your account
/// - `404 Not Found`: No such user
/// - `422 Unprocessable Entity`: The user authors or executes a task
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    users::delete_user(&state.db, &auth, id).await?;
    Ok(StatusCode::OK)
}
