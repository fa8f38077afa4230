/// Board hierarchy operations
///
/// `BoardService` owns every operation that touches more than one entity:
/// creating children (insert + parent-sequence append), cascade deletes,
/// and drag-and-drop moves. It is the only caller of the store's sequence
/// compare-and-swap methods, and it routes every sequence mutation through
/// `IdSequence`, so the containment invariants are enforced in one place:
///
/// - a list id appears in its project's `lists` exactly once, and the list's
///   `project_id` points back at that project
/// - a task id appears in exactly one list's `tasks`, and the task's
///   `list_id`/`project_id` match the owning list
/// - deletes are transitive and leave no dangling references
///
/// # Failure policy
///
/// Errors are surfaced to the caller unchanged; no retries here. A failure
/// in the middle of a multi-step operation logs the entity kind, id and step
/// so an operator can replay the remaining steps; partial success is never
/// reported as success.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{BoardError, EntityKind};
use crate::models::list::{CreateList, List};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, UpdateTask, Urgency};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::ordering::{IdSequence, SequenceError};
use crate::stats::{self, ProjectStats};
use crate::store::BoardStore;

/// Fields for a new task, before the hierarchy fills in its parents
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub urgency: Urgency,
    pub due_date: Option<chrono::DateTime<Utc>>,
}

/// Hierarchy manager over a `BoardStore`
#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
}

/// Maps a sequence mutation failure onto the caller-facing error kinds:
/// a missing member means the caller's view is stale, a duplicate member
/// means the request itself is malformed.
fn sequence_error(err: SequenceError) -> BoardError {
    match err {
        SequenceError::NotAMember(id) => BoardError::conflict(format!(
            "id {id} is not in the source sequence (stale client state)"
        )),
        SequenceError::AlreadyAMember(id) => {
            BoardError::invalid(format!("id {id} is already in the destination sequence"))
        }
    }
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    /// Store connectivity probe, for the health endpoint
    pub async fn store_health(&self) -> Result<(), BoardError> {
        self.store.health().await
    }

    // --- users ---

    /// Creates a user account
    ///
    /// Uniqueness of username and email is the store's job; a duplicate
    /// surfaces as `Conflict`.
    pub async fn register_user(&self, data: CreateUser) -> Result<User, BoardError> {
        let user = self.store.insert_user(data).await?;
        info!(user_id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    pub async fn user(&self, id: Uuid) -> Result<User, BoardError> {
        self.store
            .user(id)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::User, id))
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, BoardError> {
        self.store.user_by_username(username).await
    }

    pub async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<User, BoardError> {
        self.store
            .update_user(id, data)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::User, id))
    }

    /// Deletes an account and everything it owns
    ///
    /// Bulk removal by owner predicate: the owned projects, lists and tasks
    /// are removed in their entirety, so no per-entity sequence fix-up is
    /// needed.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), BoardError> {
        // Existence check up front so an unknown id is NotFound, not a no-op.
        self.user(user_id).await?;

        let tasks = self
            .store
            .delete_tasks_by_owner(user_id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::User, user_id, "delete tasks", err))?;
        let lists = self
            .store
            .delete_lists_by_owner(user_id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::User, user_id, "delete lists", err))?;
        let projects = self
            .store
            .delete_projects_by_owner(user_id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::User, user_id, "delete projects", err))?;
        self.store
            .delete_user(user_id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::User, user_id, "delete record", err))?;

        info!(user_id = %user_id, tasks, lists, projects, "deleted account");
        Ok(())
    }

    // --- projects ---

    pub async fn create_project(&self, user_id: Uuid, title: String) -> Result<Project, BoardError> {
        let project = self
            .store
            .insert_project(CreateProject { user_id, title })
            .await?;
        info!(project_id = %project.id, user_id = %user_id, "created project");
        Ok(project)
    }

    pub async fn project(&self, id: Uuid) -> Result<Project, BoardError> {
        self.store
            .project(id)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::Project, id))
    }

    pub async fn projects_of(&self, user_id: Uuid) -> Result<Vec<Project>, BoardError> {
        self.store.projects_by_owner(user_id).await
    }

    pub async fn rename_project(&self, id: Uuid, title: &str) -> Result<Project, BoardError> {
        self.store
            .rename_project(id, title)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::Project, id))
    }

    /// Deletes a project and all of its lists and tasks
    pub async fn delete_project(&self, id: Uuid) -> Result<(), BoardError> {
        self.project(id).await?;

        let lists = self
            .store
            .delete_lists_by_project(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Project, id, "delete lists", err))?;
        let tasks = self
            .store
            .delete_tasks_by_project(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Project, id, "delete tasks", err))?;
        self.store
            .delete_project(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Project, id, "delete record", err))?;

        info!(project_id = %id, lists, tasks, "deleted project");
        Ok(())
    }

    /// Task counts for a project, computed fresh from its task set
    pub async fn project_stats(&self, id: Uuid) -> Result<ProjectStats, BoardError> {
        self.project(id).await?;
        let tasks = self.store.tasks_by_project(id).await?;
        Ok(stats::compute(&tasks, Utc::now()))
    }

    /// All tasks of a project, any list, creation order
    pub async fn tasks_in_project(&self, id: Uuid) -> Result<Vec<Task>, BoardError> {
        self.project(id).await?;
        self.store.tasks_by_project(id).await
    }

    // --- lists ---

    /// Creates a list at the end of the project's board
    pub async fn create_list(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        title: String,
    ) -> Result<List, BoardError> {
        let project = self.project(project_id).await?;

        let list = self
            .store
            .insert_list(CreateList {
                project_id,
                user_id,
                title,
            })
            .await?;

        let mut seq = IdSequence::new(project.lists);
        seq.push(list.id).map_err(sequence_error)?;

        match self
            .store
            .update_project_lists(project.id, seq.as_slice(), project.revision)
            .await
        {
            Ok(_) => {
                info!(list_id = %list.id, project_id = %project_id, "created list");
                Ok(list)
            }
            Err(err) => {
                // The record exists but never became a member; take it back
                // out before surfacing the error.
                if let Err(cleanup) = self.store.delete_list(list.id).await {
                    error!(
                        list_id = %list.id,
                        project_id = %project_id,
                        error = %cleanup,
                        "failed to remove unlinked list after sequence write failure"
                    );
                }
                Err(err)
            }
        }
    }

    pub async fn list(&self, id: Uuid) -> Result<List, BoardError> {
        self.store
            .list(id)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::List, id))
    }

    pub async fn rename_list(&self, id: Uuid, title: &str) -> Result<List, BoardError> {
        self.store
            .rename_list(id, title)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::List, id))
    }

    /// Lists of a project in board order
    pub async fn lists_in_project(&self, project_id: Uuid) -> Result<Vec<List>, BoardError> {
        let project = self.project(project_id).await?;
        let mut lists = self.store.lists_by_project(project_id).await?;

        let order: HashMap<Uuid, usize> = project
            .lists
            .iter()
            .enumerate()
            .map(|(pos, id)| (*id, pos))
            .collect();
        lists.sort_by_key(|l| order.get(&l.id).copied().unwrap_or(usize::MAX));
        Ok(lists)
    }

    /// Deletes a list, its tasks, and its membership in the project
    ///
    /// Order matters: unlink from the project first, then remove the child
    /// tasks, then the record itself. A failure part-way is surfaced with the
    /// failing step logged.
    pub async fn delete_list(&self, id: Uuid) -> Result<(), BoardError> {
        let list = self.list(id).await?;

        match self.store.project(list.project_id).await? {
            Some(project) => {
                let mut seq = IdSequence::new(project.lists);
                match seq.remove(id) {
                    Ok(_) => {
                        self.store
                            .update_project_lists(project.id, seq.as_slice(), project.revision)
                            .await
                            .map_err(|err| {
                                cascade_step_failed(EntityKind::List, id, "unlink from project", err)
                            })?;
                    }
                    Err(SequenceError::NotAMember(_)) => {
                        warn!(
                            list_id = %id,
                            project_id = %list.project_id,
                            "list already missing from its project sequence"
                        );
                    }
                    Err(err) => return Err(sequence_error(err)),
                }
            }
            None => {
                warn!(
                    list_id = %id,
                    project_id = %list.project_id,
                    "owning project gone before list delete"
                );
            }
        }

        let tasks = self
            .store
            .delete_tasks_by_list(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::List, id, "delete tasks", err))?;
        self.store
            .delete_list(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::List, id, "delete record", err))?;

        info!(list_id = %id, tasks, "deleted list");
        Ok(())
    }

    /// Moves a list to a new position on its project's board
    pub async fn move_list(&self, id: Uuid, index: usize) -> Result<List, BoardError> {
        let list = self.list(id).await?;
        let project = self.project(list.project_id).await?;

        let mut seq = IdSequence::new(project.lists);
        seq.move_to(id, index).map_err(sequence_error)?;
        self.store
            .update_project_lists(project.id, seq.as_slice(), project.revision)
            .await?;

        info!(list_id = %id, project_id = %project.id, index, "moved list");
        Ok(list)
    }

    // --- tasks ---

    /// Creates a task at the end of a list
    ///
    /// The task's project is taken from the owning list, never from the
    /// caller.
    pub async fn create_task(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        fields: NewTask,
    ) -> Result<Task, BoardError> {
        let list = self.list(list_id).await?;

        let task = self
            .store
            .insert_task(CreateTask {
                list_id,
                project_id: list.project_id,
                user_id,
                title: fields.title,
                description: fields.description,
                urgency: fields.urgency,
                due_date: fields.due_date,
            })
            .await?;

        let mut seq = IdSequence::new(list.tasks);
        seq.push(task.id).map_err(sequence_error)?;

        match self
            .store
            .update_list_tasks(list.id, seq.as_slice(), list.revision)
            .await
        {
            Ok(_) => {
                info!(task_id = %task.id, list_id = %list_id, "created task");
                Ok(task)
            }
            Err(err) => {
                if let Err(cleanup) = self.store.delete_task(task.id).await {
                    error!(
                        task_id = %task.id,
                        list_id = %list_id,
                        error = %cleanup,
                        "failed to remove unlinked task after sequence write failure"
                    );
                }
                Err(err)
            }
        }
    }

    pub async fn task(&self, id: Uuid) -> Result<Task, BoardError> {
        self.store
            .task(id)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::Task, id))
    }

    pub async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Task, BoardError> {
        self.store
            .update_task(id, data)
            .await?
            .ok_or_else(|| BoardError::not_found(EntityKind::Task, id))
    }

    /// Tasks of a list in display order
    pub async fn tasks_in_list(&self, list_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let list = self.list(list_id).await?;
        let mut tasks = self.store.tasks_by_list(list_id).await?;

        let order: HashMap<Uuid, usize> = list
            .tasks
            .iter()
            .enumerate()
            .map(|(pos, id)| (*id, pos))
            .collect();
        tasks.sort_by_key(|t| order.get(&t.id).copied().unwrap_or(usize::MAX));
        Ok(tasks)
    }

    /// Deletes a task and unlinks it from its list
    pub async fn delete_task(&self, id: Uuid) -> Result<(), BoardError> {
        let task = self.task(id).await?;

        match self.store.list(task.list_id).await? {
            Some(list) => {
                let mut seq = IdSequence::new(list.tasks);
                match seq.remove(id) {
                    Ok(_) => {
                        self.store
                            .update_list_tasks(list.id, seq.as_slice(), list.revision)
                            .await
                            .map_err(|err| {
                                cascade_step_failed(EntityKind::Task, id, "unlink from list", err)
                            })?;
                    }
                    Err(SequenceError::NotAMember(_)) => {
                        warn!(
                            task_id = %id,
                            list_id = %task.list_id,
                            "task already missing from its list sequence"
                        );
                    }
                    Err(err) => return Err(sequence_error(err)),
                }
            }
            None => {
                warn!(
                    task_id = %id,
                    list_id = %task.list_id,
                    "owning list gone before task delete"
                );
            }
        }

        self.store
            .delete_task(id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Task, id, "delete record", err))?;

        info!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Moves a task, within its list or across lists
    ///
    /// Within-list: reorder only, membership and parent references untouched.
    /// Cross-list: remove from the source sequence first, insert into the
    /// destination, then rewrite the task's list and denormalized project.
    /// A task id missing from its claimed source sequence is a `Conflict`
    /// (stale client state), never a silent success.
    pub async fn move_task(
        &self,
        id: Uuid,
        dest_list_id: Uuid,
        index: usize,
    ) -> Result<Task, BoardError> {
        let task = self.task(id).await?;
        let source = self.list(task.list_id).await?;

        if source.id == dest_list_id {
            let mut seq = IdSequence::new(source.tasks);
            seq.move_to(id, index).map_err(sequence_error)?;
            self.store
                .update_list_tasks(source.id, seq.as_slice(), source.revision)
                .await?;

            info!(task_id = %id, list_id = %source.id, index, "reordered task");
            return Ok(task);
        }

        let dest = self.list(dest_list_id).await?;

        let mut source_seq = IdSequence::new(source.tasks);
        source_seq.remove(id).map_err(sequence_error)?;
        let mut dest_seq = IdSequence::new(dest.tasks);
        dest_seq.insert_at(index, id).map_err(sequence_error)?;

        // Remove before insert, so the id is never a member of two sequences.
        self.store
            .update_list_tasks(source.id, source_seq.as_slice(), source.revision)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Task, id, "unlink from source", err))?;
        self.store
            .update_list_tasks(dest.id, dest_seq.as_slice(), dest.revision)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Task, id, "link to destination", err))?;

        let updated = self
            .store
            .reparent_task(id, dest.id, dest.project_id)
            .await
            .map_err(|err| cascade_step_failed(EntityKind::Task, id, "reparent", err))?
            .ok_or_else(|| {
                error!(task_id = %id, step = "reparent", "task vanished mid-move");
                BoardError::unavailable(format!("task {id} vanished mid-move"))
            })?;

        info!(
            task_id = %id,
            from = %source.id,
            to = %dest.id,
            index,
            "moved task across lists"
        );
        Ok(updated)
    }
}

/// Logs a failed step of a multi-entity operation and passes the error on
fn cascade_step_failed(
    kind: EntityKind,
    id: Uuid,
    step: &'static str,
    err: BoardError,
) -> BoardError {
    error!(
        entity = kind.as_str(),
        id = %id,
        step,
        error = %err,
        "multi-step operation failed part-way"
    );
    err
}
