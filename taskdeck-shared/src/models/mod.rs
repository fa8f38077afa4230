/// Data models for the board hierarchy
///
/// Entity structs plus the `CreateX`/`UpdateX` input structs the store
/// consumes. Every entity is addressed by an opaque UUID; ordered child
/// references live on the parent as a `Vec<Uuid>` whose index carries the
/// display position (see the `ordering` module for the mutation rules).
///
/// # Models
///
/// - `user`: account identity, owns everything below it
/// - `project`: top-level board, ordered sequence of list ids
/// - `list`: board column, ordered sequence of task ids
/// - `task`: leaf entity with urgency, due date and done flag

pub mod list;
pub mod project;
pub mod task;
pub mod user;
