/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: registration, login, token refresh
/// - `users`: the authenticated account
/// - `projects`: project CRUD, stats, child collections
/// - `lists`: list CRUD and board position
/// - `tasks`: task CRUD and drag-and-drop position

pub mod auth;
pub mod health;
pub mod lists;
pub mod projects;
pub mod tasks;
pub mod users;

use uuid::Uuid;
use validator::ValidationError;

use crate::error::ApiError;
use taskdeck_shared::auth::middleware::AuthContext;

/// Rejects titles that are empty or whitespace-only
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Resource ownership guard
///
/// Every entity carries its owner's user id; a request authenticated as
/// anyone else is Forbidden.
pub(crate) fn ensure_owner(owner: Uuid, auth: &AuthContext) -> Result<(), ApiError> {
    if owner != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this resource".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("title").is_ok());
        assert!(not_blank("  x  ").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_ensure_owner() {
        let owner = Uuid::new_v4();
        let auth = AuthContext::from_jwt(owner);
        assert!(ensure_owner(owner, &auth).is_ok());
        assert!(ensure_owner(Uuid::new_v4(), &auth).is_err());
    }
}
