/// Entity store
///
/// `BoardStore` is the persistence seam of the system: the hierarchy module
/// talks to this trait and nothing else touches storage. Implementations
/// guarantee atomicity at single-entity granularity only; multi-entity
/// consistency (cascades, sequence fix-up) is the hierarchy module's job.
///
/// Two implementations ship:
///
/// - `MemoryStore`: HashMap-backed, used by the test suites and as a
///   storeless development backend
/// - `PgStore`: PostgreSQL via sqlx, the production backend
///
/// # Sequence writes
///
/// `update_project_lists` / `update_list_tasks` are compare-and-swap: the
/// caller passes the revision it read, the store writes only if it still
/// matches, and a mismatch surfaces as `Conflict`. That is the system's whole
/// answer to concurrent reorders: detection, not locking.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BoardError;
use crate::models::list::{CreateList, List};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Persistence contract for the board hierarchy
#[async_trait]
pub trait BoardStore: Send + Sync {
    // --- users ---

    /// Creates a user; username and email must be unique (`Conflict` otherwise)
    async fn insert_user(&self, data: CreateUser) -> Result<User, BoardError>;

    async fn user(&self, id: Uuid) -> Result<Option<User>, BoardError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, BoardError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, BoardError>;

    /// Patches a user; returns None if the user does not exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, BoardError>;

    /// Deletes a user record; true if a row was removed
    async fn delete_user(&self, id: Uuid) -> Result<bool, BoardError>;

    // --- projects ---

    async fn insert_project(&self, data: CreateProject) -> Result<Project, BoardError>;

    async fn project(&self, id: Uuid) -> Result<Option<Project>, BoardError>;

    async fn projects_by_owner(&self, user_id: Uuid) -> Result<Vec<Project>, BoardError>;

    async fn rename_project(&self, id: Uuid, title: &str) -> Result<Option<Project>, BoardError>;

    /// Compare-and-swap write of the project's list sequence
    ///
    /// Fails with `NotFound` if the project is gone, `Conflict` if its
    /// revision no longer equals `expected_revision`.
    async fn update_project_lists(
        &self,
        id: Uuid,
        lists: &[Uuid],
        expected_revision: i64,
    ) -> Result<Project, BoardError>;

    async fn delete_project(&self, id: Uuid) -> Result<bool, BoardError>;

    async fn delete_projects_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError>;

    // --- lists ---

    async fn insert_list(&self, data: CreateList) -> Result<List, BoardError>;

    async fn list(&self, id: Uuid) -> Result<Option<List>, BoardError>;

    async fn lists_by_project(&self, project_id: Uuid) -> Result<Vec<List>, BoardError>;

    async fn rename_list(&self, id: Uuid, title: &str) -> Result<Option<List>, BoardError>;

    /// Compare-and-swap write of the list's task sequence
    async fn update_list_tasks(
        &self,
        id: Uuid,
        tasks: &[Uuid],
        expected_revision: i64,
    ) -> Result<List, BoardError>;

    async fn delete_list(&self, id: Uuid) -> Result<bool, BoardError>;

    async fn delete_lists_by_project(&self, project_id: Uuid) -> Result<u64, BoardError>;

    async fn delete_lists_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError>;

    // --- tasks ---

    async fn insert_task(&self, data: CreateTask) -> Result<Task, BoardError>;

    async fn task(&self, id: Uuid) -> Result<Option<Task>, BoardError>;

    async fn tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, BoardError>;

    async fn tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>, BoardError>;

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, BoardError>;

    /// Rewrites a task's owning list and denormalized project after a
    /// cross-list move
    async fn reparent_task(
        &self,
        id: Uuid,
        list_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Task>, BoardError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError>;

    async fn delete_tasks_by_list(&self, list_id: Uuid) -> Result<u64, BoardError>;

    async fn delete_tasks_by_project(&self, project_id: Uuid) -> Result<u64, BoardError>;

    async fn delete_tasks_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError>;

    // --- health ---

    /// Cheap connectivity probe for the health endpoint
    async fn health(&self) -> Result<(), BoardError>;
}
