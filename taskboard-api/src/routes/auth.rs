/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/login` - Exchange email and password for an access token
/// - `GET /api/welcome` - Plain-text greeting, handy as a smoke test
///
/// Registration is `POST /api/users`, see `routes::users`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password},
    models::user::User,
};
use validator::Validate;

/// Same message for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[serde(alias = "username")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token for the `Authorization: Bearer` header
    pub token: String,
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// `username` is accepted in place of `email`.
///
/// # Response
///
/// ```json
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let claims = jwt::Claims::new(
        user.email.clone(),
        Duration::hours(state.config.jwt.expiration_hours),
    );
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, name = %user.full_name(), "User logged in");

    Ok(Json(LoginResponse { token }))
}

/// Welcome page
pub async fn welcome() -> &'static str {
    "Welcome to Taskboard"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_username_alias() {
        let req: LoginRequest = serde_json::from_value(serde_json::json!({
            "username": "a@x.com",
            "password": "secret"
        }))
        .unwrap();

        assert_eq!(req.email, "a@x.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[tokio::test]
    async fn test_welcome() {
        assert_eq!(welcome().await, "Welcome to Taskboard");
    }
}
