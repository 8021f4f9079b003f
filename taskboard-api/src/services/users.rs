/// User service
///
/// Anyone may register and list users. A user may only update or delete
/// their own account, and an account that authors or executes any task
/// cannot be deleted.

use crate::error::{ApiError, ApiResult};
use crate::services::not_blank;
use serde::Deserialize;
use sqlx::PgPool;
use taskboard_shared::{
    auth::{authorization::require_ownership, middleware::AuthContext, password::hash_password},
    models::{
        task::Task,
        user::{CreateUser, UpdateUser, User},
    },
};
use tracing::debug;
use validator::Validate;

/// Request body for registering or replacing a user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "not_blank", message = "First name must not be blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank", message = "Last name must not be blank"))]
    pub last_name: String,

    #[validate(length(min = 3, max = 1000, message = "Password must be 3 to 1000 characters"))]
    pub password: String,
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("User {id} not found"))
}

pub async fn get_user(pool: &PgPool, id: i64) -> ApiResult<User> {
    User::find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn list_users(pool: &PgPool) -> ApiResult<Vec<User>> {
    Ok(User::list(pool).await?)
}

pub async fn create_user(pool: &PgPool, req: UserRequest) -> ApiResult<User> {
    let password_hash = hash_password(&req.password)?;

    let mut tx = pool.begin().await?;
    let user = User::create(
        &mut *tx,
        CreateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?;
    tx.commit().await?;

    debug!(user_id = user.id, email = %user.email, "User registered");
    Ok(user)
}

/// Replaces every field of the caller's own account
///
/// The email may change; tokens issued for the old email stop resolving.
pub async fn update_user(
    pool: &PgPool,
    auth: &AuthContext,
    id: i64,
    req: UserRequest,
) -> ApiResult<User> {
    let mut tx = pool.begin().await?;

    let current = User::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_ownership(auth, &current.email)?;

    let password_hash = hash_password(&req.password)?;

    let user = User::update(
        &mut *tx,
        id,
        UpdateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    debug!(user_id = id, "User updated");
    Ok(user)
}

pub async fn delete_user(pool: &PgPool, auth: &AuthContext, id: i64) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    let user = User::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_ownership(auth, &user.email)?;

    if Task::is_user_in_use(&mut *tx, id).await? {
        return Err(ApiError::in_use("User", id));
    }

    User::delete(&mut *tx, id).await?;
    tx.commit().await?;

    debug!(user_id = id, "User deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, first: &str, last: &str, password: &str) -> UserRequest {
        UserRequest {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("a@x.com", "Ada", "Lovelace", "qwe").validate().is_ok());
    }

    #[test]
    fn test_invalid_fields_are_all_reported() {
        let errors = request("not-an-email", " ", "", "12").validate().unwrap_err();
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();

        assert_eq!(fields, vec!["email", "first_name", "last_name", "password"]);
    }

    #[test]
    fn test_request_uses_camel_case() {
        let req: UserRequest = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "secret"
        }))
        .unwrap();

        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.last_name, "Lovelace");
    }
}
