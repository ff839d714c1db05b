//! Substrate tasks and their change feed.
//!
//! Every mutation is published on a broadcast channel so subscribers (the
//! dashboard's task widget) can merge changes into their local list with
//! [`TaskBoard`]. There is no conflict resolution: the last write wins.

use std::cmp::Reverse;

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use solace_core::keys;
use solace_core::models::task::{SubstrateTask, TaskChange, TaskStatus};
use solace_core::validate::tasks::{NewTask, TaskPatch, TaskQuery};
use solace_storage::error::StorageError;
use solace_storage::{SharedStore, json};

use crate::error::PracticeError;

const FEED_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct TaskService {
    store: SharedStore,
    feed: broadcast::Sender<TaskChange>,
}

impl TaskService {
    pub fn new(store: SharedStore) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self { store, feed }
    }

    /// Subscribe to insert/update/delete notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskChange> {
        self.feed.subscribe()
    }

    /// Tasks with the requested status, soonest due first, then by priority.
    pub async fn list(&self, query: &TaskQuery) -> Result<Vec<SubstrateTask>, PracticeError> {
        let mut tasks: Vec<SubstrateTask> =
            json::load_all(self.store.as_ref(), keys::TASKS_PREFIX).await?;

        tasks.retain(|t| t.status == query.status);
        if let Some(patient_id) = query.patient_id {
            tasks.retain(|t| t.patient_id == Some(patient_id));
        }

        tasks.sort_by_key(|t| {
            (
                t.due_date.is_none(),
                t.due_date,
                Reverse(t.priority),
                t.created_at,
            )
        });
        tasks.truncate(query.limit as usize);
        Ok(tasks)
    }

    pub async fn get(&self, id: Uuid) -> Result<SubstrateTask, PracticeError> {
        match json::load(self.store.as_ref(), &keys::task(id)).await {
            Ok(task) => Ok(task),
            Err(StorageError::NotFound { .. }) => Err(PracticeError::TaskNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, new: NewTask) -> Result<SubstrateTask, PracticeError> {
        let now = jiff::Timestamp::now();
        let task = SubstrateTask {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            status: TaskStatus::Pending,
            due_date: new.due_date,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        };
        self.save(&task).await?;
        info!(task_id = %task.id, priority = task.priority.as_str(), "task created");
        self.publish(TaskChange::Insert { task: task.clone() });
        Ok(task)
    }

    /// Apply a partial update. Any status may be set, from any status.
    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<SubstrateTask, PracticeError> {
        let mut task = self.get(id).await?;

        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(metadata) = patch.metadata {
            task.metadata.extend(metadata);
        }
        task.updated_at = jiff::Timestamp::now();

        self.save(&task).await?;
        self.publish(TaskChange::Update { task: task.clone() });
        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PracticeError> {
        self.get(id).await?;
        self.store.delete(&keys::task(id)).await?;
        self.publish(TaskChange::Delete { id });
        Ok(())
    }

    /// Mark pending tasks whose due date is before `today` as expired.
    /// Returns how many were expired.
    pub async fn expire_overdue(&self, today: jiff::civil::Date) -> Result<usize, PracticeError> {
        let tasks: Vec<SubstrateTask> =
            json::load_all(self.store.as_ref(), keys::TASKS_PREFIX).await?;

        let mut expired = 0;
        for mut task in tasks {
            let overdue = task.due_date.is_some_and(|due| due < today);
            if task.status != TaskStatus::Pending || !overdue {
                continue;
            }
            task.status = TaskStatus::Expired;
            task.updated_at = jiff::Timestamp::now();
            self.save(&task).await?;
            self.publish(TaskChange::Update { task });
            expired += 1;
        }

        if expired > 0 {
            info!(expired, %today, "expired overdue tasks");
        }
        Ok(expired)
    }

    async fn save(&self, task: &SubstrateTask) -> Result<(), PracticeError> {
        json::save(self.store.as_ref(), &keys::task(task.id), task).await?;
        Ok(())
    }

    fn publish(&self, change: TaskChange) {
        // No subscribers is normal; the change is simply not observed.
        if self.feed.send(change).is_err() {
            debug!("task change published with no subscribers");
        }
    }
}

/// A subscriber's local copy of a task list.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<SubstrateTask>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<SubstrateTask>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[SubstrateTask] {
        &self.tasks
    }

    /// Merge one change. Inserts and updates replace any task with the same
    /// id, or append if unseen; deletes remove it.
    pub fn apply(&mut self, change: TaskChange) {
        match change {
            TaskChange::Insert { task } | TaskChange::Update { task } => {
                match self.tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(existing) => *existing = task,
                    None => self.tasks.push(task),
                }
            }
            TaskChange::Delete { id } => self.tasks.retain(|t| t.id != id),
        }
    }
}
