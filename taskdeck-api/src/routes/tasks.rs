/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/lists/:id/tasks` - Create a task at the end of a list
/// - `GET /v1/lists/:id/tasks` - Tasks of a list in display order
/// - `GET /v1/projects/:id/tasks` - All tasks of a project
/// - `GET /v1/tasks/:id` - One task
/// - `PUT /v1/tasks/:id` - Update task fields (including the done flag)
/// - `DELETE /v1/tasks/:id` - Delete a task
/// - `PUT /v1/tasks/:id/position` - Move a task within or across lists

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{ensure_owner, not_blank},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    hierarchy::NewTask,
    models::task::{Task, UpdateTask, Urgency},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(
        length(min = 1, max = 40, message = "Title must be 1-40 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    /// Optional description
    #[validate(length(max = 300, message = "Description must be at most 300 characters"))]
    pub description: Option<String>,

    /// Urgency level (defaults to "not urgent")
    #[serde(default)]
    pub urgency: Urgency,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request
///
/// `description` and `due_date` distinguish "leave unchanged" (absent) from
/// "clear" (null).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(
        length(min = 1, max = 40, message = "Title must be 1-40 characters"),
        custom(function = "not_blank")
    )]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<Option<String>>,

    pub urgency: Option<Urgency>,

    #[serde(default)]
    pub due_date: Option<Option<DateTime<Utc>>>,

    pub done: Option<bool>,
}

/// Drag-and-drop position request
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    /// Destination list; the current list for a within-list reorder
    pub list_id: Uuid,

    /// Target position in the destination sequence (clamped to the end)
    pub index: usize,
}

/// Deletion confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Creates a task inside a list
///
/// The task's project is derived from the list, and the task id is appended
/// to the list's sequence.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let list = state.boards.list(list_id).await?;
    ensure_owner(list.user_id, &auth)?;

    let task = state
        .boards
        .create_task(
            auth.user_id,
            list_id,
            NewTask {
                title: req.title,
                description: req.description,
                urgency: req.urgency,
                due_date: req.due_date,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Tasks of a list, in the list's display order
pub async fn get_list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let list = state.boards.list(list_id).await?;
    ensure_owner(list.user_id, &auth)?;

    let tasks = state.boards.tasks_in_list(list_id).await?;
    Ok(Json(tasks))
}

/// All tasks of a project, any list
pub async fn get_project_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let project = state.boards.project(project_id).await?;
    ensure_owner(project.user_id, &auth)?;

    let tasks = state.boards.tasks_in_project(project_id).await?;
    Ok(Json(tasks))
}

/// One task by id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.boards.task(id).await?;
    ensure_owner(task.user_id, &auth)?;
    Ok(Json(task))
}

/// Updates task fields
///
/// Covers title, description, urgency, due date and the done flag.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    if let Some(Some(ref description)) = req.description {
        if description.len() > 300 {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "description".to_string(),
                message: "Description must be at most 300 characters".to_string(),
            }]));
        }
    }

    let task = state.boards.task(id).await?;
    ensure_owner(task.user_id, &auth)?;

    let updated = state
        .boards
        .update_task(
            id,
            UpdateTask {
                title: req.title,
                description: req.description,
                urgency: req.urgency,
                due_date: req.due_date,
                done: req.done,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// Deletes a task and removes it from its list's sequence
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    let task = state.boards.task(id).await?;
    ensure_owner(task.user_id, &auth)?;

    state.boards.delete_task(id).await?;
    Ok(Json(DeletedResponse {
        message: "Successfully deleted a task".to_string(),
    }))
}

/// Moves a task within its list or into another list
///
/// # Errors
///
/// - `409 Conflict`: the sequences changed under the client (stale drag)
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.boards.task(id).await?;
    ensure_owner(task.user_id, &auth)?;

    // The destination must exist and belong to the same user.
    let dest = state.boards.list(req.list_id).await?;
    ensure_owner(dest.user_id, &auth)?;

    let moved = state.boards.move_task(id, req.list_id, req.index).await?;
    Ok(Json(moved))
}
