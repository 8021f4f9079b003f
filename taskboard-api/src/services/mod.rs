/// Mutation and query services
///
/// Handlers parse and validate the request, then call into this module. Each
/// service function takes the pool, the caller's [`AuthContext`] when the
/// operation depends on who is asking, and an already validated request. All
/// reads and writes of one operation share a single transaction, so a failed
/// reference check or constraint violation leaves nothing behind.
///
/// - `tasks`: task CRUD with reference resolution and author stamping
/// - `users`: user CRUD, self-service only for updates and deletes
/// - `statuses`: task status CRUD with delete protection
/// - `labels`: label CRUD with delete protection

pub mod labels;
pub mod statuses;
pub mod tasks;
pub mod users;

use crate::error::{ApiError, ApiResult};
use serde::Deserialize;
use sqlx::PgConnection;
use taskboard_shared::{auth::middleware::AuthContext, models::user::User};
use validator::{Validate, ValidationError};

/// Request body for creating or renaming a status or label
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(
        custom(function = "not_blank", message = "Name must not be blank"),
        length(min = 3, max = 1000, message = "Name must be 3 to 1000 characters")
    )]
    pub name: String,
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Loads the user behind the caller's token
///
/// A token can outlive its user, so a missing row is a 401 rather than a 404.
pub(crate) async fn acting_user(conn: &mut PgConnection, auth: &AuthContext) -> ApiResult<User> {
    User::find_by_email(conn, &auth.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Authenticated user no longer exists".to_string()))
}
