/// List model
///
/// A list belongs to exactly one project and holds an ordered sequence of
/// task ids in its `tasks` column. The invariant mirrors the project side:
/// a list id appears in its project's `lists` sequence exactly once, and
/// every task id in `tasks` names a task whose `list_id` points back here.
/// `revision` plays the same compare-and-swap role as on projects.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(20) NOT NULL,
///     tasks UUID[] NOT NULL DEFAULT '{}',
///     revision BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// List inside a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    /// Unique list ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Column title
    pub title: String,

    /// Ordered task ids; index in this sequence is display position
    pub tasks: Vec<Uuid>,

    /// Sequence revision, bumped on every write to `tasks`
    pub revision: i64,

    /// When the list was created
    pub created_at: DateTime<Utc>,

    /// When the list was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new list
///
/// New lists start with an empty `tasks` sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateList {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
}
