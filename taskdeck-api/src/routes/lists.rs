/// List endpoints
///
/// # Endpoints
///
/// - `POST /v1/projects/:id/lists` - Create a list at the end of the board
/// - `GET /v1/projects/:id/lists` - Lists of a project in board order
/// - `GET /v1/lists/:id` - One list
/// - `PUT /v1/lists/:id` - Rename a list
/// - `DELETE /v1/lists/:id` - Delete a list and its tasks
/// - `PUT /v1/lists/:id/position` - Move a list on its board

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{ensure_owner, not_blank},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{auth::middleware::AuthContext, models::list::List};
use uuid::Uuid;
use validator::Validate;

/// Create / rename list request
#[derive(Debug, Deserialize, Validate)]
pub struct ListTitleRequest {
    /// Column title
    #[validate(
        length(min = 1, max = 20, message = "Title must be 1-20 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
}

/// Board position request
#[derive(Debug, Deserialize)]
pub struct MoveListRequest {
    /// Target position on the board (clamped to the end)
    pub index: usize,
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Creates a list inside a project
pub async fn create_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ListTitleRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    req.validate()?;

    let project = state.boards.project(project_id).await?;
    ensure_owner(project.user_id, &auth)?;

    let list = state
        .boards
        .create_list(auth.user_id, project_id, req.title)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// Lists of a project in board order
pub async fn get_project_lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<List>>> {
    let project = state.boards.project(project_id).await?;
    ensure_owner(project.user_id, &auth)?;

    let lists = state.boards.lists_in_project(project_id).await?;
    Ok(Json(lists))
}

/// One list by id
pub async fn get_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<List>> {
    let list = state.boards.list(id).await?;
    ensure_owner(list.user_id, &auth)?;
    Ok(Json(list))
}

/// Renames a list
pub async fn update_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ListTitleRequest>,
) -> ApiResult<Json<List>> {
    req.validate()?;

    let list = state.boards.list(id).await?;
    ensure_owner(list.user_id, &auth)?;

    let renamed = state.boards.rename_list(id, &req.title).await?;
    Ok(Json(renamed))
}

/// Deletes a list, its tasks, and its board membership
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let list = state.boards.list(id).await?;
    ensure_owner(list.user_id, &auth)?;

    state.boards.delete_list(id).await?;
    Ok(Json(DeletedResponse {
        message: format!("Deleted list '{}'", list.title),
    }))
}

/// Moves a list to a new position on its board
///
/// # Errors
///
/// - `409 Conflict`: the board changed under the client
pub async fn move_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveListRequest>,
) -> ApiResult<Json<List>> {
    let list = state.boards.list(id).await?;
    ensure_owner(list.user_id, &auth)?;

    let moved = state.boards.move_list(id, req.index).await?;
    Ok(Json(moved))
}
