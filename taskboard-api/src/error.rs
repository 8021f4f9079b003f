/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; the `From` impls below let
/// them use `?` on database, validation, filter, and auth errors directly.
///
/// # Status mapping
///
/// - 400: malformed filter parameter or unparseable JSON body
/// - 401: missing, malformed, or expired token; failed login
/// - 403: caller doesn't own the resource
/// - 404: target of the request doesn't exist
/// - 422: invalid or mistyped body field, duplicate name or email, unknown referenced ID,
///   or deleting something a task still references
/// - 500: everything else, logged and never echoed
///
/// # Example
///
/// ```no_run
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("Task 42 not found".to_string()))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::{
    auth::{
        authorization::AuthzError,
        jwt::JwtError,
        middleware::AuthError,
        password::PasswordError,
    },
    filter::FilterError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - duplicates, unknown references, protected deletes
    UnprocessableEntity(String),

    /// Unprocessable entity (422) - field validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation, as named in the JSON body
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// 422 for a referenced ID that doesn't resolve
    pub fn unknown_reference(field: &str, id: impl fmt::Display) -> Self {
        ApiError::UnprocessableEntity(format!("{field}: no record with id {id}"))
    }

    /// 422 for deleting a row that a task still references
    pub fn in_use(what: &str, id: i64) -> Self {
        ApiError::UnprocessableEntity(format!("{what} {id} is used by a task and cannot be deleted"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnprocessableEntity(_) | ApiError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::UnprocessableEntity(msg) => write!(f, "Unprocessable entity: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::UnprocessableEntity(msg) => ("unprocessable_entity", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Constraint violations are client errors: the request named a duplicate or
/// a missing row, or tried to delete one a task still points at.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();

                if db_err.is_unique_violation() {
                    return ApiError::UnprocessableEntity(duplicate_message(&constraint));
                }

                if db_err.is_foreign_key_violation() {
                    return ApiError::UnprocessableEntity(format!(
                        "Referenced record is missing or still in use ({constraint})"
                    ));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

fn duplicate_message(constraint: &str) -> String {
    match constraint {
        "users_email_key" => "A user with this email already exists".to_string(),
        "task_statuses_name_key" => "A task status with this name already exists".to_string(),
        "labels_name_key" => "A label with this name already exists".to_string(),
        "tasks_name_key" => "A task with this name already exists".to_string(),
        other => format!("Duplicate value violates {other}"),
    }
}

/// Convert field validation errors, one detail per failing rule
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: camel_case(field),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // field_errors() is a HashMap
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert JSON body rejections
///
/// Unparseable JSON is a 400. Well-formed JSON of the wrong shape (a missing
/// field, a string where an ID belongs) is a 422 naming the field.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let message = err.body_text();
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: rejected_field(&message),
                    message,
                }])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Picks the field out of a serde error such as
/// ``missing field `taskStatusId` at line 1 column 20`` or
/// `executorId: invalid type: string "x", expected i64`
fn rejected_field(message: &str) -> String {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);

    if let Some((_, rest)) = detail.split_once("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return field.to_string();
        }
    }

    match detail.split_once(": ") {
        Some((path, _)) if !path.is_empty() && !path.contains(' ') => path.to_string(),
        _ => "body".to_string(),
    }
}

/// Convert filter parsing errors
impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::IdentityRequired => ApiError::Unauthorized(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

/// Convert bearer authentication errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert authorization errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::ValidationError(msg) => ApiError::Unauthorized(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        first_name: String,

        #[validate(email(message = "bad email"))]
        email: String,
    }

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::in_use("Label", 1).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ValidationError(Vec::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_validation_errors_use_json_field_names() {
        let sample = Sample {
            first_name: "A".to_string(),
            email: "nope".to_string(),
        };

        let err: ApiError = sample.validate().unwrap_err().into();

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(
                    details,
                    vec![
                        ValidationErrorDetail {
                            field: "email".to_string(),
                            message: "bad email".to_string(),
                        },
                        ValidationErrorDetail {
                            field: "firstName".to_string(),
                            message: "too short".to_string(),
                        },
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_filter_errors() {
        let err: ApiError = FilterError::InvalidLabels("x".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = FilterError::IdentityRequired.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_errors() {
        let err: ApiError = AuthError::MissingCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthzError::NotOwner.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err: ApiError = JwtError::Expired.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = JwtError::CreateError("boom".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_is_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_messages() {
        assert!(duplicate_message("users_email_key").contains("email"));
        assert!(duplicate_message("labels_name_key").contains("label"));
        assert!(duplicate_message("whatever").contains("whatever"));
    }

    #[test]
    fn test_rejected_field() {
        let prefix = "Failed to deserialize the JSON body into the target type: ";

        assert_eq!(
            rejected_field(&format!("{prefix}missing field `taskStatusId` at line 1 column 20")),
            "taskStatusId"
        );
        assert_eq!(
            rejected_field(&format!(
                "{prefix}executorId: invalid type: string \"x\", expected i64 at line 1 column 9"
            )),
            "executorId"
        );
        assert_eq!(
            rejected_field(&format!("{prefix}invalid type: sequence, expected a map")),
            "body"
        );
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let (status, body) = body_json(ApiError::Forbidden("nope".to_string())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
        assert_eq!(body["message"], "nope");
        assert!(body.get("details").is_none());

        let (status, body) = body_json(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "name".to_string(),
            message: "required".to_string(),
        }]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "name");
    }

    #[tokio::test]
    async fn test_internal_error_is_not_echoed() {
        let (status, body) =
            body_json(ApiError::InternalError("password=hunter2".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("hunter2"));
    }
}
