/// Account endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/me` - The authenticated account
/// - `PUT /v1/users/me` - Update account fields
/// - `DELETE /v1/users/me` - Delete the account and everything it owns

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{auth::UserResponse, not_blank},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, password},
    models::user::UpdateUser,
};
use validator::Validate;

/// Account update request
///
/// All fields optional; only supplied fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(
        length(min = 1, max = 20, message = "Username must be 1-20 characters"),
        custom(function = "not_blank")
    )]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password (validated for strength)
    pub password: Option<String>,

    #[validate(
        length(min = 1, max = 20, message = "First name must be 1-20 characters"),
        custom(function = "not_blank")
    )]
    pub firstname: Option<String>,

    #[validate(
        length(min = 1, max = 20, message = "Last name must be 1-20 characters"),
        custom(function = "not_blank")
    )]
    pub lastname: Option<String>,
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Returns the authenticated account
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.boards.user(auth.user_id).await?;
    Ok(Json(user.into()))
}

/// Updates the authenticated account
///
/// # Errors
///
/// - `409 Conflict`: the new username or email is already taken
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = match req.password {
        Some(ref plaintext) => {
            password::validate_password_strength(plaintext).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(plaintext)?)
        }
        None => None,
    };

    let user = state
        .boards
        .update_user(
            auth.user_id,
            UpdateUser {
                username: req.username,
                email: req.email,
                password_hash,
                firstname: req.firstname,
                lastname: req.lastname,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// Deletes the account and cascades through everything it owns
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DeletedResponse>> {
    state.boards.delete_account(auth.user_id).await?;

    Ok(Json(DeletedResponse {
        message: "Account deleted".to_string(),
    }))
}
