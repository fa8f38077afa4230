/// Task model
///
/// Tasks are the leaves of the board hierarchy. A task lives in exactly one
/// list; its position is its index in the owning list's `tasks` sequence, not
/// a column on the task itself. `project_id` is denormalized from the owning
/// list so project-level queries (stats, "all tasks of project") never walk
/// the hierarchy; the hierarchy module keeps it in sync on cross-list moves.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_urgency AS ENUM (
///     'not urgent', 'slightly urgent', 'urgent', 'very urgent'
/// );
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(40) NOT NULL,
///     description VARCHAR(300),
///     urgency task_urgency NOT NULL DEFAULT 'not urgent',
///     due_date TIMESTAMPTZ,
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task urgency levels
///
/// The wire labels carry spaces ("not urgent"), matching what clients send
/// and what the database enum stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_urgency")]
pub enum Urgency {
    #[serde(rename = "not urgent")]
    #[sqlx(rename = "not urgent")]
    NotUrgent,

    #[serde(rename = "slightly urgent")]
    #[sqlx(rename = "slightly urgent")]
    SlightlyUrgent,

    #[serde(rename = "urgent")]
    #[sqlx(rename = "urgent")]
    Urgent,

    #[serde(rename = "very urgent")]
    #[sqlx(rename = "very urgent")]
    VeryUrgent,
}

impl Urgency {
    /// Wire/database label for the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::NotUrgent => "not urgent",
            Urgency::SlightlyUrgent => "slightly urgent",
            Urgency::Urgent => "urgent",
            Urgency::VeryUrgent => "very urgent",
        }
    }

    /// All accepted labels, in escalation order
    pub fn all() -> [Urgency; 4] {
        [
            Urgency::NotUrgent,
            Urgency::SlightlyUrgent,
            Urgency::Urgent,
            Urgency::VeryUrgent,
        ]
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::NotUrgent
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not urgent" => Ok(Urgency::NotUrgent),
            "slightly urgent" => Ok(Urgency::SlightlyUrgent),
            "urgent" => Ok(Urgency::Urgent),
            "very urgent" => Ok(Urgency::VeryUrgent),
            other => Err(format!("unknown urgency: {other}")),
        }
    }
}

/// Task inside a list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning list
    pub list_id: Uuid,

    /// Owning project, always equal to the owning list's project
    pub project_id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Urgency level
    pub urgency: Urgency,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Completion flag
    pub done: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True when the task is open and its due date has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.due_date.map_or(false, |due| due <= now)
    }
}

/// Input for creating a new task
///
/// `project_id` is intentionally absent: the hierarchy module derives it
/// from the owning list when the task is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub list_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating a task
///
/// All fields optional; `description` and `due_date` use the double-Option
/// pattern so `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub urgency: Option<Urgency>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub done: Option<bool>,
}

impl UpdateTask {
    /// True when the patch would write nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.urgency.is_none()
            && self.due_date.is_none()
            && self.done.is_none()
    }
}
