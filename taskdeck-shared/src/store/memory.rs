/// In-memory store
///
/// HashMap-backed `BoardStore` implementation. All state lives behind a
/// single `RwLock`; operations clone entities in and out, so callers never
/// observe partially-written records. Used by the test suites and as a
/// development backend when no database is around.
///
/// Uniqueness (username, email) and revision compare-and-swap are enforced
/// here with the same outcomes as the PostgreSQL implementation, so tests
/// against this store exercise the real conflict paths.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{BoardError, EntityKind};
use crate::models::list::{CreateList, List};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::BoardStore;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    lists: HashMap<Uuid, List>,
    tasks: HashMap<Uuid, Task>,
}

/// HashMap-backed store for tests and development
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, BoardError> {
        self.inner
            .read()
            .map_err(|_| BoardError::unavailable("memory store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, BoardError> {
        self.inner
            .write()
            .map_err(|_| BoardError::unavailable("memory store lock poisoned"))
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, BoardError> {
        let mut inner = self.write()?;

        if inner.users.values().any(|u| u.username == data.username) {
            return Err(BoardError::conflict("username already exists"));
        }
        if inner.users.values().any(|u| u.email == data.email) {
            return Err(BoardError::conflict("email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            firstname: data.firstname,
            lastname: data.lastname,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, BoardError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, BoardError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, BoardError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, BoardError> {
        let mut inner = self.write()?;

        if let Some(ref username) = data.username {
            if inner
                .users
                .values()
                .any(|u| u.username == *username && u.id != id)
            {
                return Err(BoardError::conflict("username already exists"));
            }
        }
        if let Some(ref email) = data.email {
            if inner.users.values().any(|u| u.email == *email && u.id != id) {
                return Err(BoardError::conflict("email already exists"));
            }
        }

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = data.username {
            user.username = username;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(password_hash) = data.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(firstname) = data.firstname {
            user.firstname = firstname;
        }
        if let Some(lastname) = data.lastname {
            user.lastname = lastname;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, BoardError> {
        Ok(self.write()?.users.remove(&id).is_some())
    }

    async fn insert_project(&self, data: CreateProject) -> Result<Project, BoardError> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            lists: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn project(&self, id: Uuid) -> Result<Option<Project>, BoardError> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn projects_by_owner(&self, user_id: Uuid) -> Result<Vec<Project>, BoardError> {
        let mut projects: Vec<Project> = self
            .read()?
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    async fn rename_project(&self, id: Uuid, title: &str) -> Result<Option<Project>, BoardError> {
        let mut inner = self.write()?;
        let Some(project) = inner.projects.get_mut(&id) else {
            return Ok(None);
        };
        project.title = title.to_string();
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn update_project_lists(
        &self,
        id: Uuid,
        lists: &[Uuid],
        expected_revision: i64,
    ) -> Result<Project, BoardError> {
        let mut inner = self.write()?;
        let Some(project) = inner.projects.get_mut(&id) else {
            return Err(BoardError::not_found(EntityKind::Project, id));
        };
        if project.revision != expected_revision {
            return Err(BoardError::conflict(format!(
                "project {} list sequence changed (expected revision {}, found {})",
                id, expected_revision, project.revision
            )));
        }
        project.lists = lists.to_vec();
        project.revision += 1;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, BoardError> {
        Ok(self.write()?.projects.remove(&id).is_some())
    }

    async fn delete_projects_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.projects.len();
        inner.projects.retain(|_, p| p.user_id != user_id);
        Ok((before - inner.projects.len()) as u64)
    }

    async fn insert_list(&self, data: CreateList) -> Result<List, BoardError> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let list = List {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            user_id: data.user_id,
            title: data.title,
            tasks: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        inner.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn list(&self, id: Uuid) -> Result<Option<List>, BoardError> {
        Ok(self.read()?.lists.get(&id).cloned())
    }

    async fn lists_by_project(&self, project_id: Uuid) -> Result<Vec<List>, BoardError> {
        let mut lists: Vec<List> = self
            .read()?
            .lists
            .values()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect();
        lists.sort_by_key(|l| l.created_at);
        Ok(lists)
    }

    async fn rename_list(&self, id: Uuid, title: &str) -> Result<Option<List>, BoardError> {
        let mut inner = self.write()?;
        let Some(list) = inner.lists.get_mut(&id) else {
            return Ok(None);
        };
        list.title = title.to_string();
        list.updated_at = Utc::now();
        Ok(Some(list.clone()))
    }

    async fn update_list_tasks(
        &self,
        id: Uuid,
        tasks: &[Uuid],
        expected_revision: i64,
    ) -> Result<List, BoardError> {
        let mut inner = self.write()?;
        let Some(list) = inner.lists.get_mut(&id) else {
            return Err(BoardError::not_found(EntityKind::List, id));
        };
        if list.revision != expected_revision {
            return Err(BoardError::conflict(format!(
                "list {} task sequence changed (expected revision {}, found {})",
                id, expected_revision, list.revision
            )));
        }
        list.tasks = tasks.to_vec();
        list.revision += 1;
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, BoardError> {
        Ok(self.write()?.lists.remove(&id).is_some())
    }

    async fn delete_lists_by_project(&self, project_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.lists.len();
        inner.lists.retain(|_, l| l.project_id != project_id);
        Ok((before - inner.lists.len()) as u64)
    }

    async fn delete_lists_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.lists.len();
        inner.lists.retain(|_, l| l.user_id != user_id);
        Ok((before - inner.lists.len()) as u64)
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, BoardError> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            list_id: data.list_id,
            project_id: data.project_id,
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            urgency: data.urgency,
            due_date: data.due_date,
            done: false,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn task(&self, id: Uuid) -> Result<Option<Task>, BoardError> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>, BoardError> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> Result<Option<Task>, BoardError> {
        let mut inner = self.write()?;
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(urgency) = data.urgency {
            task.urgency = urgency;
        }
        if let Some(due_date) = data.due_date {
            task.due_date = due_date;
        }
        if let Some(done) = data.done {
            task.done = done;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn reparent_task(
        &self,
        id: Uuid,
        list_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Task>, BoardError> {
        let mut inner = self.write()?;
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.list_id = list_id;
        task.project_id = project_id;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, BoardError> {
        Ok(self.write()?.tasks.remove(&id).is_some())
    }

    async fn delete_tasks_by_list(&self, list_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.tasks.len();
        inner.tasks.retain(|_, t| t.list_id != list_id);
        Ok((before - inner.tasks.len()) as u64)
    }

    async fn delete_tasks_by_project(&self, project_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.tasks.len();
        inner.tasks.retain(|_, t| t.project_id != project_id);
        Ok((before - inner.tasks.len()) as u64)
    }

    async fn delete_tasks_by_owner(&self, user_id: Uuid) -> Result<u64, BoardError> {
        let mut inner = self.write()?;
        let before = inner.tasks.len();
        inner.tasks.retain(|_, t| t.user_id != user_id);
        Ok((before - inner.tasks.len()) as u64)
    }

    async fn health(&self) -> Result<(), BoardError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_user(n: u32) -> CreateUser {
        CreateUser {
            username: format!("user{n}"),
            email: format!("user{n}@example.com"),
            password_hash: "$argon2id$test".to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let store = MemoryStore::new();
        store.insert_user(create_user(1)).await.unwrap();

        let dup = store.insert_user(create_user(1)).await;
        assert!(matches!(dup, Err(BoardError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_user_lookup_by_username_and_email() {
        let store = MemoryStore::new();
        let user = store.insert_user(create_user(2)).await.unwrap();

        let by_name = store.user_by_username("user2").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_email = store
            .user_by_email("user2@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(store.user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_project_lists_cas() {
        let store = MemoryStore::new();
        let project = store
            .insert_project(CreateProject {
                user_id: Uuid::new_v4(),
                title: "Board".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(project.revision, 0);

        let list_id = Uuid::new_v4();
        let updated = store
            .update_project_lists(project.id, &[list_id], 0)
            .await
            .unwrap();
        assert_eq!(updated.lists, vec![list_id]);
        assert_eq!(updated.revision, 1);

        // Stale revision must not write.
        let stale = store.update_project_lists(project.id, &[], 0).await;
        assert!(matches!(stale, Err(BoardError::Conflict(_))));
        let current = store.project(project.id).await.unwrap().unwrap();
        assert_eq!(current.lists, vec![list_id]);
    }

    #[tokio::test]
    async fn test_cas_on_missing_list_is_not_found() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();
        let result = store.update_list_tasks(missing, &[], 0).await;
        assert!(matches!(result, Err(BoardError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_bulk_delete_by_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        for user_id in [owner, owner, other] {
            store
                .insert_project(CreateProject {
                    user_id,
                    title: "p".to_string(),
                })
                .await
                .unwrap();
        }

        let removed = store.delete_projects_by_owner(owner).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.projects_by_owner(other).await.unwrap().len(), 1);
    }
}
