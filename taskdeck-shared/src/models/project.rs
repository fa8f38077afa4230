/// Project model
///
/// A project is the top level of the board hierarchy. Its `lists` column is
/// an ordered sequence of list ids; the position of an id in that sequence is
/// the list's position on the board. The `revision` counter guards the
/// sequence against concurrent writers: every sequence write compares against
/// the revision the caller read and bumps it on success.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(20) NOT NULL,
///     lists UUID[] NOT NULL DEFAULT '{}',
///     revision BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Board title
    pub title: String,

    /// Ordered list ids; index in this sequence is board position
    pub lists: Vec<Uuid>,

    /// Sequence revision, bumped on every write to `lists`
    pub revision: i64,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
///
/// New projects start with an empty `lists` sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub title: String,
}
