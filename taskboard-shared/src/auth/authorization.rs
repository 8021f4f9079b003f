/// Ownership checks for mutations
///
/// Any authenticated user may read everything and manage statuses and
/// labels. Two kinds of mutation are restricted:
///
/// - updating or deleting a task: only its author
/// - updating or deleting a user: only that user
///
/// Both come down to comparing the caller's email with the owner's email,
/// which is what [`require_ownership`] does. Handlers call it after loading
/// the target, so a missing target is a 404 before it can be a 403.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{require_ownership, AuthzError};
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// let auth = AuthContext::new("a@x.com");
///
/// assert!(require_ownership(&auth, "a@x.com").is_ok());
/// assert!(matches!(require_ownership(&auth, "b@x.com"), Err(AuthzError::NotOwner)));
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller doesn't own the resource
    #[error("Not authorized to modify this resource")]
    NotOwner,
}

/// Checks that the caller owns a resource
///
/// Emails are compared exactly.
///
/// # Errors
///
/// `AuthzError::NotOwner` if `owner_email` is not the caller's email
pub fn require_ownership(auth: &AuthContext, owner_email: &str) -> Result<(), AuthzError> {
    if auth.email != owner_email {
        tracing::warn!(
            caller = %auth.email,
            owner = %owner_email,
            "Ownership check failed"
        );
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}
