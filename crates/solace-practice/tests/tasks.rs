mod common;

use serde_json::json;
use uuid::Uuid;

use solace_core::models::task::{TaskChange, TaskPriority, TaskStatus};
use solace_core::validate::tasks::{NewTask, TaskPatch, TaskQuery};
use solace_practice::error::PracticeError;
use solace_practice::tasks::{TaskBoard, TaskService};

fn new_task(title: &str, priority: TaskPriority, due: Option<jiff::civil::Date>) -> NewTask {
    NewTask {
        patient_id: None,
        title: title.to_string(),
        description: None,
        priority,
        due_date: due,
        metadata: serde_json::Map::new(),
    }
}

fn pending(limit: u32) -> TaskQuery {
    TaskQuery {
        status: TaskStatus::Pending,
        patient_id: None,
        limit,
    }
}

#[tokio::test]
async fn list_orders_by_due_date_then_priority() {
    let service = TaskService::new(common::store());
    let d1 = jiff::civil::date(2026, 11, 1);
    let d2 = jiff::civil::date(2026, 11, 5);

    service.create(new_task("later", TaskPriority::Urgent, Some(d2))).await.unwrap();
    service.create(new_task("undated", TaskPriority::Urgent, None)).await.unwrap();
    service.create(new_task("soon-low", TaskPriority::Low, Some(d1))).await.unwrap();
    service.create(new_task("soon-high", TaskPriority::High, Some(d1))).await.unwrap();

    let titles: Vec<String> = service
        .list(&pending(50))
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["soon-high", "soon-low", "later", "undated"]);

    assert_eq!(service.list(&pending(2)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn any_status_transition_is_accepted() {
    let service = TaskService::new(common::store());
    let task = service
        .create(new_task("call back", TaskPriority::Medium, None))
        .await
        .unwrap();

    let dismissed = service
        .update(
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Dismissed),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(dismissed.status, TaskStatus::Dismissed);

    // Back to pending: no workflow engine stands in the way.
    let reopened = service
        .update(
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Pending),
                metadata: Some(json!({ "reopened": true }).as_object().cloned().unwrap()),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reopened.status, TaskStatus::Pending);
    assert_eq!(reopened.metadata["reopened"], true);
    assert!(reopened.updated_at >= dismissed.updated_at);
}

#[tokio::test]
async fn description_can_be_set_and_cleared() {
    let service = TaskService::new(common::store());
    let task = service
        .create(new_task("intake packet", TaskPriority::High, None))
        .await
        .unwrap();

    let described = service
        .update(
            task.id,
            TaskPatch {
                description: Some(Some("Mail the consent forms".to_string())),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(described.description.as_deref(), Some("Mail the consent forms"));
    assert_eq!(described.status, TaskStatus::Pending);

    let cleared = service
        .update(
            task.id,
            TaskPatch {
                description: Some(None),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(service.get(task.id).await.unwrap().description, None);
}

#[tokio::test]
async fn patient_filter_and_missing_task() {
    let service = TaskService::new(common::store());
    let patient_id = Uuid::new_v4();
    let mut task = new_task("send worksheet", TaskPriority::Low, None);
    task.patient_id = Some(patient_id);
    service.create(task).await.unwrap();
    service.create(new_task("admin", TaskPriority::Low, None)).await.unwrap();

    let mut query = pending(50);
    query.patient_id = Some(patient_id);
    assert_eq!(service.list(&query).await.unwrap().len(), 1);

    let err = service
        .update(Uuid::new_v4(), TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PracticeError::TaskNotFound(_)));
}

#[tokio::test]
async fn overdue_pending_tasks_expire() {
    let service = TaskService::new(common::store());
    let today = jiff::civil::date(2026, 10, 18);
    service
        .create(new_task("overdue", TaskPriority::High, Some(jiff::civil::date(2026, 10, 17))))
        .await
        .unwrap();
    service
        .create(new_task("due today", TaskPriority::High, Some(today)))
        .await
        .unwrap();

    assert_eq!(service.expire_overdue(today).await.unwrap(), 1);
    assert_eq!(service.expire_overdue(today).await.unwrap(), 0);

    let expired = service
        .list(&TaskQuery {
            status: TaskStatus::Expired,
            patient_id: None,
            limit: 50,
        })
        .await
        .unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].title, "overdue");
}

#[tokio::test]
async fn feed_publishes_every_mutation() {
    let service = TaskService::new(common::store());
    let mut feed = service.subscribe();

    let task = service
        .create(new_task("intake review", TaskPriority::Medium, None))
        .await
        .unwrap();
    service
        .update(
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .await
        .unwrap();
    service.delete(task.id).await.unwrap();

    assert!(matches!(feed.recv().await.unwrap(), TaskChange::Insert { .. }));
    match feed.recv().await.unwrap() {
        TaskChange::Update { task } => assert_eq!(task.status, TaskStatus::Completed),
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(feed.recv().await.unwrap(), TaskChange::Delete { id: task.id });
}

#[tokio::test]
async fn board_merges_changes_last_write_wins() {
    let service = TaskService::new(common::store());
    let a = service
        .create(new_task("a", TaskPriority::Low, None))
        .await
        .unwrap();
    let b = service
        .create(new_task("b", TaskPriority::Low, None))
        .await
        .unwrap();

    let mut board = TaskBoard::new(vec![a.clone()]);

    board.apply(TaskChange::Insert { task: b.clone() });
    assert_eq!(board.tasks().len(), 2);

    let mut first_edit = a.clone();
    first_edit.title = "first".to_string();
    let mut second_edit = a.clone();
    second_edit.title = "second".to_string();
    board.apply(TaskChange::Update { task: first_edit });
    board.apply(TaskChange::Update { task: second_edit });
    assert_eq!(board.tasks()[0].title, "second");
    assert_eq!(board.tasks().len(), 2);

    // An update for a task the board never saw is treated as an insert.
    let mut stray = b.clone();
    stray.id = Uuid::new_v4();
    board.apply(TaskChange::Update { task: stray });
    assert_eq!(board.tasks().len(), 3);

    board.apply(TaskChange::Delete { id: b.id });
    assert!(board.tasks().iter().all(|t| t.id != b.id));
}
