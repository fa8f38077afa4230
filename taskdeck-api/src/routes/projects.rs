/// Project endpoints
///
/// # Endpoints
///
/// - `POST /v1/projects` - Create a project
/// - `GET /v1/projects` - All projects of the authenticated user
/// - `GET /v1/projects/:id` - One project
/// - `PUT /v1/projects/:id` - Rename a project
/// - `DELETE /v1/projects/:id` - Delete a project and all its lists/tasks
/// - `GET /v1/projects/:id/stats` - Task counts for the project

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
use taskdeck_shared::{
    auth::middleware::AuthContext, models::project::Project, stats::ProjectStats,
};
use uuid::Uuid;
use validator::Validate;

/// Create / rename project request
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectTitleRequest {
    /// Board title
    #[validate(
        length(min = 1, max = 20, message = "Title must be 1-20 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Creates a project for the authenticated user
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ProjectTitleRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = state.boards.create_project(auth.user_id, req.title).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// All projects of the authenticated user
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.boards.projects_of(auth.user_id).await?;
    Ok(Json(projects))
}

/// One project by id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = state.boards.project(id).await?;
    ensure_owner(project.user_id, &auth)?;
    Ok(Json(project))
}

/// Renames a project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProjectTitleRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = state.boards.project(id).await?;
    ensure_owner(project.user_id, &auth)?;

    let renamed = state.boards.rename_project(id, &req.title).await?;
    Ok(Json(renamed))
}

/// Deletes a project and everything under it
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let project = state.boards.project(id).await?;
    ensure_owner(project.user_id, &auth)?;

    state.boards.delete_project(id).await?;
    Ok(Json(DeletedResponse {
        message: format!("Deleted project '{}'", project.title),
    }))
}

/// Task counts for a project, computed fresh per call
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectStats>> {
    let project = state.boards.project(id).await?;
    ensure_owner(project.user_id, &auth)?;

    let stats = state.boards.project_stats(id).await?;
    Ok(Json(stats))
}
