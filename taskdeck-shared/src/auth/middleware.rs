/// Authentication context and errors
///
/// The API server's JWT layer validates the bearer token and inserts an
/// `AuthContext` into request extensions; handlers extract it to learn the
/// acting user. Token parsing itself lives in `auth::jwt`; the Axum
/// middleware function lives in the API crate's router module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions
///
/// # Example
///
/// ```ignore
/// use axum::Extension;
/// use taskdeck_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Errors raised while authenticating a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials supplied
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials supplied in an unexpected shape
    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
