/// PostgreSQL store
///
/// sqlx-backed `BoardStore` implementation. Ordered child references are
/// `UUID[]` columns; the per-parent `revision` column makes sequence writes
/// compare-and-swap (`WHERE revision = $n` + `revision = revision + 1`), so
/// a lost race is a zero-row update, never a corrupted sequence.
///
/// Unique-constraint violations surface as `Conflict`; everything else the
/// database refuses becomes `StoreUnavailable`. Timeouts are bounded by the
/// pool's acquire timeout (see `db::pool`).

use sqlx::PgPool;
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::{BoardError, EntityKind};
use crate::models::list::{CreateList, List};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::BoardStore;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, firstname, lastname, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, user_id, title, lists, revision, created_at, updated_at";
const LIST_COLUMNS: &str = "id, project_id, user_id, title, tasks, revision, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, list_id, project_id, user_id, title, description, urgency, due_date, done, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for shutdown handling
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps database failures onto the shared error kinds
fn map_sqlx(err: sqlx::Error) -> BoardError {
    match err {
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("username") {
                    return BoardError::conflict("username already exists");
                }
                if constraint.contains("email") {
                    return BoardError::conflict("email already exists");
                }
                return BoardError::conflict(format!("constraint violation: {constraint}"));
            }
            BoardError::unavailable(format!("database error: {db_err}"))
        }
        other => BoardError::unavailable(format!("database error: {other}")),
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, BoardError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, firstname, lastname)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.firstname)
            .bind(data.lastname)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, BoardError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, BoardError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, BoardError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, BoardError> {
        if data.is_empty() {
            return self.user(id).await;
        }

        // Build the UPDATE dynamically from the fields that are present.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${bind_count}"));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${bind_count}"));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${bind_count}"));
        }
        if data.firstname.is_some() {
            bind_count += 1;
            query.push_str(&format!(", firstname = ${bind_count}"));
        }
        if data.lastname.is_some() {
            bind_count += 1;
            query.push_str(&format!(", lastname = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(firstname) = data.firstname {
            q = q.bind(firstname);
        }
        if let Some(lastname) = data.lastname {
            q = q.bind(lastname);
        }

        q.fetch_optional(&self.pool).await.map_err(map_sqlx)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, BoardError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_project(&self, data: CreateProject) -> Result<Project, BoardError> {
        let query = format!(
            "INSERT INTO projects (user_id, title)
             VALUES ($1, $2)
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn project(&self, id: Uuid) -> Result<Option<Project>, BoardError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn projects_by_owner(&self, user_id: Uuid) -> Result<Vec<Project>, BoardError> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn rename_project(&self, id: Uuid, title: &str) -> Result<Option<Project>, BoardError> {
        let query = format!(
            "UPDATE projects SET title = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn update_project_lists(
        &self,
        id: Uuid,
        lists: &[Uuid],
        expected_revision: i64,
    ) -> Result<Project, BoardError> {
        let query = format!(
            "UPDATE projects
             SET lists = $2, revision = revision + 1, updated_at = NOW()
             WHERE id = $1 AND revision = $3
             RETURNING {PROJECT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(lists)
            .bind(expected_revision)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        match updated {
            Some(project) => Ok(project),
            // Zero rows: either the project is gone or the revision moved.
            None => match self.project(id).await? {
                Some(current) => Err(BoardError::conflict(format!(
                    "project {} list sequence changed (expected revision {}, found {})",
                    id, expected_revision, current.revision
                ))),
                None => Err(BoardError::not_found(EntityKind::Project, id)),
            },
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, BoardError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_projects_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM projects WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn insert_list(&self, data: CreateList) -> Result<List, BoardError> {
        let query = format!(
            "INSERT INTO lists (project_id, user_id, title)
             VALUES ($1, $2, $3)
             RETURNING {LIST_COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(data.project_id)
            .bind(data.user_id)
            .bind(data.title)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn list(&self, id: Uuid) -> Result<Option<List>, BoardError> {
        let query = format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn lists_by_project(&self, project_id: Uuid) -> Result<Vec<List>, BoardError> {
        let query = format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE project_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn rename_list(&self, id: Uuid, title: &str) -> Result<Option<List>, BoardError> {
        let query = format!(
            "UPDATE lists SET title = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {LIST_COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn update_list_tasks(
        &self,
        id: Uuid,
        tasks: &[Uuid],
        expected_revision: i64,
    ) -> Result<List, BoardError> {
        let query = format!(
            "UPDATE lists
             SET tasks = $2, revision = revision + 1, updated_at = NOW()
             WHERE id = $1 AND revision = $3
             RETURNING {LIST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(tasks)
            .bind(expected_revision)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        match updated {
            Some(list) => Ok(list),
            None => match self.list(id).await? {
                Some(current) => Err(BoardError::conflict(format!(
                    "list {} task sequence changed (expected revision {}, found {})",
                    id, expected_revision, current.revision
                ))),
                None => Err(BoardError::not_found(EntityKind::List, id)),
            },
        }
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, BoardError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_lists_by_project(&self, project_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM lists WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn delete_lists_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM lists WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, BoardError> {
        let query = format!(
            "INSERT INTO tasks (list_id, project_id, user_id, title, description, urgency, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(data.list_id)
            .bind(data.project_id)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.urgency)
            .bind(data.due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn task(&self, id: Uuid) -> Result<Option<Task>, BoardError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let query =
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE list_id = $1 ORDER BY created_at ASC");
        sqlx::query_as::<_, Task>(&query)
            .bind(list_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, BoardError> {
        if data.is_empty() {
            return self.task(id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${bind_count}"));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }
        if data.urgency.is_some() {
            bind_count += 1;
            query.push_str(&format!(", urgency = ${bind_count}"));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${bind_count}"));
        }
        if data.done.is_some() {
            bind_count += 1;
            query.push_str(&format!(", done = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(urgency) = data.urgency {
            q = q.bind(urgency);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(done) = data.done {
            q = q.bind(done);
        }

        q.fetch_optional(&self.pool).await.map_err(map_sqlx)
    }

    async fn reparent_task(
        &self,
        id: Uuid,
        list_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Task>, BoardError> {
        let query = format!(
            "UPDATE tasks SET list_id = $2, project_id = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(list_id)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_tasks_by_list(&self, list_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM tasks WHERE list_id = $1")
            .bind(list_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn delete_tasks_by_project(&self, project_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn delete_tasks_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn health(&self) -> Result<(), BoardError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
