/// Shared error type for the board engine
///
/// Every store and hierarchy operation returns `Result<T, BoardError>`.
/// The four variants map one-to-one onto what callers need to distinguish:
/// a missing entity, a stale sequence write, a structurally invalid request,
/// and a persistence failure. The HTTP layer converts these into status
/// codes; nothing below it retries.

use uuid::Uuid;

/// Entity kinds, used in error messages and cascade logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Project,
    List,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::List => "list",
            EntityKind::Task => "task",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for store and hierarchy operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Referenced entity does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// Sequence or revision mismatch (stale client or concurrent writer)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Structural violation, e.g. inserting an id that is already a member
    #[error("invalid operation: {0}")]
    Invalid(String),

    /// Underlying persistence call failed or timed out
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BoardError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        BoardError::NotFound { kind, id }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        BoardError::Conflict(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        BoardError::Invalid(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        BoardError::StoreUnavailable(msg.into())
    }

    /// True for errors a client can fix by refreshing its view
    pub fn is_conflict(&self) -> bool {
        matches!(self, BoardError::Conflict(_))
    }
}
