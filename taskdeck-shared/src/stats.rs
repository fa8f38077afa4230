/// Project statistics
///
/// Counts are derived fresh from the project's task set on every call; there
/// are no cached counters to invalidate. A task is overdue when it is open
/// and its due date is at or before the reference instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::Task;

/// Aggregated task counts for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// All tasks of the project
    pub total: u64,

    /// Tasks with the done flag set
    pub completed: u64,

    /// total - completed
    pub open: u64,

    /// Open tasks whose due date is at or before `now`
    pub overdue: u64,
}

/// Computes stats over a project's task set
///
/// `now` is passed in rather than read from the clock so callers (and tests)
/// control the overdue cutoff.
pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> ProjectStats {
    let total = tasks.len() as u64;
    let completed = tasks.iter().filter(|t| t.done).count() as u64;
    let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count() as u64;

    ProjectStats {
        total,
        completed,
        open: total - completed,
        overdue,
    }
}
