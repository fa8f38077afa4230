/// Integration tests for the board hierarchy
///
/// These run the hierarchy manager against the in-memory store and check the
/// containment invariants after every kind of mutation: membership arrays
/// and parent references stay in sync, moves preserve exclusive membership,
/// cascades leave no orphans, and stale sequence state is detected as a
/// conflict instead of corrupting anything.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use taskdeck_shared::error::BoardError;
use taskdeck_shared::hierarchy::{BoardService, NewTask};
use taskdeck_shared::models::task::{UpdateTask, Urgency};
use taskdeck_shared::models::user::CreateUser;
use taskdeck_shared::store::{BoardStore, MemoryStore};

/// Service plus direct store access for invariant checks
struct Harness {
    boards: BoardService,
    store: Arc<MemoryStore>,
    user_id: Uuid,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let boards = BoardService::new(store.clone());

        let user = boards
            .register_user(CreateUser {
                username: "franz".to_string(),
                email: "franz@example.com".to_string(),
                password_hash: "$argon2id$test".to_string(),
                firstname: "Franz".to_string(),
                lastname: "Kafka".to_string(),
            })
            .await
            .expect("user should be created");

        Self {
            boards,
            store,
            user_id: user.id,
        }
    }

    async fn new_task(&self, list_id: Uuid, title: &str) -> Uuid {
        self.boards
            .create_task(
                self.user_id,
                list_id,
                NewTask {
                    title: title.to_string(),
                    description: None,
                    urgency: Urgency::NotUrgent,
                    due_date: None,
                },
            )
            .await
            .expect("task should be created")
            .id
    }

    /// Checks membership invariants for one list
    async fn assert_list_consistent(&self, list_id: Uuid) {
        let list = self.boards.list(list_id).await.unwrap();
        let project = self.boards.project(list.project_id).await.unwrap();

        // List is a member of its project exactly once.
        let occurrences = project.lists.iter().filter(|id| **id == list.id).count();
        assert_eq!(occurrences, 1, "list must appear exactly once in project.lists");

        // Every sequenced task points back at the list and its project.
        for task_id in &list.tasks {
            let task = self.boards.task(*task_id).await.unwrap();
            assert_eq!(task.list_id, list.id, "task.list_id must match its sequence");
            assert_eq!(
                task.project_id, list.project_id,
                "task.project_id must match its list's project"
            );
        }
    }
}

#[tokio::test]
async fn test_create_list_appends_to_project() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();

    let l1 = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, project.id, "Doing".into()).await.unwrap();

    let project = h.boards.project(project.id).await.unwrap();
    assert_eq!(project.lists, vec![l1.id, l2.id]);

    h.assert_list_consistent(l1.id).await;
    h.assert_list_consistent(l2.id).await;
}

#[tokio::test]
async fn test_create_list_in_unknown_project_is_not_found() {
    let h = Harness::new().await;
    let result = h
        .boards
        .create_list(h.user_id, Uuid::new_v4(), "Orphan".into())
        .await;
    assert!(matches!(result, Err(BoardError::NotFound { .. })));
}

#[tokio::test]
async fn test_create_task_appends_and_denormalizes_project() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();

    let t1 = h.new_task(list.id, "first").await;
    let t2 = h.new_task(list.id, "second").await;

    let list = h.boards.list(list.id).await.unwrap();
    assert_eq!(list.tasks, vec![t1, t2]);

    let task = h.boards.task(t2).await.unwrap();
    assert_eq!(task.project_id, project.id);
    assert!(!task.done);

    h.assert_list_consistent(list.id).await;
}

#[tokio::test]
async fn test_create_task_in_unknown_list_is_not_found() {
    let h = Harness::new().await;
    let result = h
        .boards
        .create_task(
            h.user_id,
            Uuid::new_v4(),
            NewTask {
                title: "nowhere".into(),
                description: None,
                urgency: Urgency::Urgent,
                due_date: None,
            },
        )
        .await;
    assert!(matches!(result, Err(BoardError::NotFound { .. })));
}

#[tokio::test]
async fn test_reorder_within_list() {
    // L1 = [T1, T2, T3]; move T3 to index 0 -> [T3, T1, T2]
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();

    let t1 = h.new_task(list.id, "T1").await;
    let t2 = h.new_task(list.id, "T2").await;
    let t3 = h.new_task(list.id, "T3").await;

    h.boards.move_task(t3, list.id, 0).await.unwrap();

    let after = h.boards.list(list.id).await.unwrap();
    assert_eq!(after.tasks, vec![t3, t1, t2]);

    // Reorder preserves membership and parent references.
    let task = h.boards.task(t3).await.unwrap();
    assert_eq!(task.list_id, list.id);
    assert_eq!(task.project_id, project.id);
    h.assert_list_consistent(list.id).await;
}

#[tokio::test]
async fn test_move_across_lists() {
    // L1 = [T3, T1, T2] after reorder; move T1 to empty L2 at index 0.
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let l1 = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, project.id, "Done".into()).await.unwrap();

    let t1 = h.new_task(l1.id, "T1").await;
    let t2 = h.new_task(l1.id, "T2").await;
    let t3 = h.new_task(l1.id, "T3").await;
    h.boards.move_task(t3, l1.id, 0).await.unwrap();

    let moved = h.boards.move_task(t1, l2.id, 0).await.unwrap();

    let l1_after = h.boards.list(l1.id).await.unwrap();
    let l2_after = h.boards.list(l2.id).await.unwrap();
    assert_eq!(l1_after.tasks, vec![t3, t2]);
    assert_eq!(l2_after.tasks, vec![t1]);
    assert_eq!(moved.list_id, l2.id);
    assert_eq!(moved.project_id, project.id);

    h.assert_list_consistent(l1.id).await;
    h.assert_list_consistent(l2.id).await;
}

#[tokio::test]
async fn test_move_across_projects_updates_denormalized_project() {
    let h = Harness::new().await;
    let p1 = h.boards.create_project(h.user_id, "One".into()).await.unwrap();
    let p2 = h.boards.create_project(h.user_id, "Two".into()).await.unwrap();
    let l1 = h.boards.create_list(h.user_id, p1.id, "A".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, p2.id, "B".into()).await.unwrap();

    let task_id = h.new_task(l1.id, "wandering").await;
    let moved = h.boards.move_task(task_id, l2.id, 0).await.unwrap();

    assert_eq!(moved.list_id, l2.id);
    assert_eq!(moved.project_id, p2.id);

    let l1_after = h.boards.list(l1.id).await.unwrap();
    assert!(l1_after.tasks.is_empty());
    h.assert_list_consistent(l2.id).await;
}

#[tokio::test]
async fn test_move_to_oversized_index_appends() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();

    let t1 = h.new_task(list.id, "T1").await;
    let t2 = h.new_task(list.id, "T2").await;

    h.boards.move_task(t1, list.id, 99).await.unwrap();

    let after = h.boards.list(list.id).await.unwrap();
    assert_eq!(after.tasks, vec![t2, t1]);
}

#[tokio::test]
async fn test_move_with_stale_source_sequence_is_conflict() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let task_id = h.new_task(list.id, "drifter").await;

    // Another writer empties the sequence; task.list_id still points here.
    let current = h.boards.list(list.id).await.unwrap();
    h.store
        .update_list_tasks(list.id, &[], current.revision)
        .await
        .unwrap();

    let result = h.boards.move_task(task_id, list.id, 0).await;
    assert!(matches!(result, Err(BoardError::Conflict(_))));
}

#[tokio::test]
async fn test_cas_revision_conflict_on_concurrent_reorder() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let t1 = h.new_task(list.id, "T1").await;
    let t2 = h.new_task(list.id, "T2").await;

    // Two clients read the same snapshot; the second write must lose.
    let snapshot = h.boards.list(list.id).await.unwrap();
    h.store
        .update_list_tasks(list.id, &[t2, t1], snapshot.revision)
        .await
        .unwrap();
    let stale = h
        .store
        .update_list_tasks(list.id, &[t1], snapshot.revision)
        .await;
    assert!(matches!(stale, Err(BoardError::Conflict(_))));

    // The winning write is intact.
    let after = h.boards.list(list.id).await.unwrap();
    assert_eq!(after.tasks, vec![t2, t1]);
}

#[tokio::test]
async fn test_move_list_within_project() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let l1 = h.boards.create_list(h.user_id, project.id, "A".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, project.id, "B".into()).await.unwrap();
    let l3 = h.boards.create_list(h.user_id, project.id, "C".into()).await.unwrap();

    h.boards.move_list(l3.id, 0).await.unwrap();

    let project = h.boards.project(project.id).await.unwrap();
    assert_eq!(project.lists, vec![l3.id, l1.id, l2.id]);
}

#[tokio::test]
async fn test_delete_task_unlinks_sequence() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let t1 = h.new_task(list.id, "T1").await;
    let t2 = h.new_task(list.id, "T2").await;

    h.boards.delete_task(t1).await.unwrap();

    let after = h.boards.list(list.id).await.unwrap();
    assert_eq!(after.tasks, vec![t2]);
    assert!(matches!(
        h.boards.task(t1).await,
        Err(BoardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_list_cascades_tasks() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let keep = h.boards.create_list(h.user_id, project.id, "Keep".into()).await.unwrap();

    for n in 0..3 {
        h.new_task(list.id, &format!("T{n}")).await;
    }
    let survivor = h.new_task(keep.id, "survivor").await;

    h.boards.delete_list(list.id).await.unwrap();

    // No task may still reference the deleted list.
    assert!(h.store.tasks_by_list(list.id).await.unwrap().is_empty());
    assert!(matches!(
        h.boards.list(list.id).await,
        Err(BoardError::NotFound { .. })
    ));

    let project = h.boards.project(project.id).await.unwrap();
    assert_eq!(project.lists, vec![keep.id]);
    assert!(h.boards.task(survivor).await.is_ok());
}

#[tokio::test]
async fn test_delete_project_cascades_everything() {
    // 2 lists with 3 and 2 tasks -> nothing referencing the project survives.
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let l1 = h.boards.create_list(h.user_id, project.id, "A".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, project.id, "B".into()).await.unwrap();

    for n in 0..3 {
        h.new_task(l1.id, &format!("A{n}")).await;
    }
    for n in 0..2 {
        h.new_task(l2.id, &format!("B{n}")).await;
    }

    h.boards.delete_project(project.id).await.unwrap();

    assert!(h.store.lists_by_project(project.id).await.unwrap().is_empty());
    assert!(h.store.tasks_by_project(project.id).await.unwrap().is_empty());
    assert!(matches!(
        h.boards.project(project.id).await,
        Err(BoardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_account_removes_all_owned_entities() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    h.new_task(list.id, "T1").await;

    h.boards.delete_account(h.user_id).await.unwrap();

    assert!(h.boards.projects_of(h.user_id).await.unwrap().is_empty());
    assert!(h.store.tasks_by_project(project.id).await.unwrap().is_empty());
    assert!(matches!(
        h.boards.user(h.user_id).await,
        Err(BoardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_unknown_entities_is_not_found() {
    let h = Harness::new().await;
    assert!(matches!(
        h.boards.delete_task(Uuid::new_v4()).await,
        Err(BoardError::NotFound { .. })
    ));
    assert!(matches!(
        h.boards.delete_list(Uuid::new_v4()).await,
        Err(BoardError::NotFound { .. })
    ));
    assert!(matches!(
        h.boards.delete_project(Uuid::new_v4()).await,
        Err(BoardError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_ordered_reads_follow_sequences() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let l1 = h.boards.create_list(h.user_id, project.id, "A".into()).await.unwrap();
    let l2 = h.boards.create_list(h.user_id, project.id, "B".into()).await.unwrap();
    let t1 = h.new_task(l1.id, "T1").await;
    let t2 = h.new_task(l1.id, "T2").await;

    h.boards.move_list(l2.id, 0).await.unwrap();
    h.boards.move_task(t2, l1.id, 0).await.unwrap();

    let lists = h.boards.lists_in_project(project.id).await.unwrap();
    let ids: Vec<Uuid> = lists.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![l2.id, l1.id]);

    let tasks = h.boards.tasks_in_list(l1.id).await.unwrap();
    let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![t2, t1]);
}

#[tokio::test]
async fn test_project_stats() {
    // {done: true} x2, {done: false, due: yesterday} x1,
    // {done: false, due: tomorrow} x1 -> {4, 2, 2, 1}
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();

    let now = Utc::now();
    let done1 = h.new_task(list.id, "done1").await;
    let done2 = h.new_task(list.id, "done2").await;
    for id in [done1, done2] {
        h.boards
            .update_task(
                id,
                UpdateTask {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let overdue = h.new_task(list.id, "overdue").await;
    h.boards
        .update_task(
            overdue,
            UpdateTask {
                due_date: Some(Some(now - Duration::days(1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let upcoming = h.new_task(list.id, "upcoming").await;
    h.boards
        .update_task(
            upcoming,
            UpdateTask {
                due_date: Some(Some(now + Duration::days(1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stats = h.boards.project_stats(project.id).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.open, 2);
    assert_eq!(stats.overdue, 1);
}

#[tokio::test]
async fn test_update_task_fields() {
    let h = Harness::new().await;
    let project = h.boards.create_project(h.user_id, "Board".into()).await.unwrap();
    let list = h.boards.create_list(h.user_id, project.id, "Todo".into()).await.unwrap();
    let task_id = h.new_task(list.id, "original").await;

    let updated = h
        .boards
        .update_task(
            task_id,
            UpdateTask {
                title: Some("renamed".into()),
                description: Some(Some("details".into())),
                urgency: Some(Urgency::VeryUrgent),
                done: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.description.as_deref(), Some("details"));
    assert_eq!(updated.urgency, Urgency::VeryUrgent);
    assert!(updated.done);

    // Clearing a field via the double-Option pattern.
    let cleared = h
        .boards
        .update_task(
            task_id,
            UpdateTask {
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.description.is_none());
}
